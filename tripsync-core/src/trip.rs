//! Backend-owned trip records.
//!
//! These types mirror what the backend reports for a trip. The client never
//! assigns destination identifiers; it only reads them and refers to them in
//! delete and reschedule requests.

use std::fmt;

use jiff::civil::DateTime;
use serde::{Deserialize, Serialize};

use crate::slot::{Slot, SlotError};

/// Backend-assigned destination identifier.
pub type DestinationId = u64;

/// Opaque trip identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripId(String);

impl TripId {
    /// Wrap an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TripId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TripId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A place within a trip, as the backend records it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    /// Backend identifier.
    pub id: DestinationId,
    /// Free-text name, used as the search key for enrichment.
    pub name: String,
    /// ISO-8601 visit time; `None` when unscheduled.
    pub visit_time: Option<String>,
}

impl Destination {
    /// Construct a destination. Blank visit times are treated as unscheduled.
    pub fn new(id: DestinationId, name: impl Into<String>, visit_time: Option<String>) -> Self {
        Self {
            id,
            name: name.into(),
            visit_time: visit_time.filter(|v| !v.trim().is_empty()),
        }
    }

    /// Whether the backend has a visit time for this destination.
    #[must_use]
    pub const fn is_scheduled(&self) -> bool {
        self.visit_time.is_some()
    }

    /// The normalised slot for this destination, if scheduled.
    pub fn slot(&self) -> Result<Option<Slot>, SlotError> {
        self.visit_time
            .as_deref()
            .map_or(Ok(None), Slot::from_visit_time)
    }
}

/// Descriptive trip fields from the backend's `basicInfo` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripSummary {
    /// Trip display name.
    pub name: String,
    /// Trip start, if set.
    pub start: Option<DateTime>,
}

/// A trip and its destinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
    /// Trip identifier.
    pub id: TripId,
    /// Descriptive fields.
    pub summary: TripSummary,
    /// Destinations in backend order.
    pub destinations: Vec<Destination>,
}

impl Trip {
    /// Destinations with a visit time, in backend order.
    pub fn scheduled(&self) -> impl Iterator<Item = &Destination> {
        self.destinations.iter().filter(|d| d.is_scheduled())
    }

    /// Destinations without a visit time, in backend order.
    pub fn unscheduled(&self) -> impl Iterator<Item = &Destination> {
        self.destinations.iter().filter(|d| !d.is_scheduled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn trip() -> Trip {
        Trip {
            id: TripId::from("7"),
            summary: TripSummary::default(),
            destinations: vec![
                Destination::new(1, "Met Museum", Some("2024-05-01T10:00:00".into())),
                Destination::new(2, "High Line", Some(String::new())),
                Destination::new(3, "Central Park", None),
            ],
        }
    }

    #[rstest]
    fn blank_visit_time_means_unscheduled(trip: Trip) {
        let scheduled: Vec<_> = trip.scheduled().map(|d| d.id).collect();
        let unscheduled: Vec<_> = trip.unscheduled().map(|d| d.id).collect();
        assert_eq!(scheduled, vec![1]);
        assert_eq!(unscheduled, vec![2, 3]);
    }

    #[rstest]
    fn scheduled_destination_has_slot(trip: Trip) {
        let first = trip.destinations.first().expect("destination");
        let slot = first.slot().expect("valid").expect("scheduled");
        assert_eq!(slot.to_string(), "10:00");
    }

    #[rstest]
    fn unscheduled_destination_has_no_slot(trip: Trip) {
        let last = trip.destinations.last().expect("destination");
        assert_eq!(last.slot(), Ok(None));
    }
}
