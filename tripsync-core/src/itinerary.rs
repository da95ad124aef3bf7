//! The derived, slot-ordered projection of a trip.
//!
//! An [`Itinerary`] is rebuilt from scratch on every reconciliation pass. It
//! holds the enriched entries in slot order, plus the slots of scheduled
//! destinations whose enrichment failed. Those still occupy capacity at the
//! backend even though they are not displayed.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::place::Place;
use crate::slot::Slot;
use crate::trip::{DestinationId, TripSummary};

/// Maximum number of stops in a directions link.
const MAX_DIRECTION_STOPS: usize = 10;
const DIRECTIONS_BASE: &str = "https://www.google.com/maps/dir/";
const SEARCH_BASE: &str = "https://www.google.com/maps/search/";

/// An enriched place scheduled into a slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Backend destination that produced this entry.
    pub destination_id: DestinationId,
    /// Normalised time slot.
    pub slot: Slot,
    /// Enriched place.
    pub place: Place,
}

/// A slot-ordered itinerary for one trip.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use tripsync_core::{Entry, Itinerary, Place, Slot, TripSummary};
///
/// let ten: Slot = "10:00".parse()?;
/// let nine: Slot = "09:00".parse()?;
/// let entries = vec![
///     Entry { destination_id: 1, slot: ten, place: Place::new("a", "A", Coord { x: 1.0, y: 1.0 }) },
///     Entry { destination_id: 2, slot: nine, place: Place::new("b", "B", Coord { x: 2.0, y: 2.0 }) },
/// ];
/// let itinerary = Itinerary::new(TripSummary::default(), entries, Vec::new());
/// let ids: Vec<_> = itinerary.entries().iter().map(|e| e.destination_id).collect();
/// assert_eq!(ids, vec![2, 1]);
/// # Ok::<(), tripsync_core::SlotError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    summary: TripSummary,
    entries: Vec<Entry>,
    unresolved: Vec<(DestinationId, Slot)>,
    #[serde(default)]
    occupancy: Vec<(DestinationId, Slot)>,
}

impl Itinerary {
    /// Build an itinerary, ordering entries by slot.
    ///
    /// Entries sharing a slot keep their input order. Repeated `(place, slot)`
    /// pairs collapse to the first occurrence for display, but every
    /// destination passed in, collapsed or unresolved, still counts towards
    /// [`Itinerary::occupied_slots`].
    #[must_use]
    pub fn new(
        summary: TripSummary,
        entries: Vec<Entry>,
        unresolved: Vec<(DestinationId, Slot)>,
    ) -> Self {
        let occupancy = entries
            .iter()
            .map(|entry| (entry.destination_id, entry.slot))
            .chain(unresolved.iter().copied())
            .collect();
        let mut seen = HashSet::new();
        let mut entries: Vec<Entry> = entries
            .into_iter()
            .filter(|entry| seen.insert((entry.place.id.clone(), entry.slot)))
            .collect();
        entries.sort_by_key(|entry| entry.slot);
        Self {
            summary,
            entries,
            unresolved,
            occupancy,
        }
    }

    /// Trip name and start.
    #[must_use]
    pub const fn summary(&self) -> &TripSummary {
        &self.summary
    }

    /// Entries in slot order.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Scheduled destinations whose enrichment failed.
    #[must_use]
    pub fn unresolved(&self) -> &[(DestinationId, Slot)] {
        &self.unresolved
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Slots held at the backend, one per scheduled destination.
    pub fn occupied_slots(&self) -> impl Iterator<Item = &Slot> {
        self.occupancy.iter().map(|(_, slot)| slot)
    }

    /// The slot currently held by a destination, if it is scheduled.
    #[must_use]
    pub fn slot_of(&self, destination_id: DestinationId) -> Option<Slot> {
        self.occupancy
            .iter()
            .find(|(id, _)| *id == destination_id)
            .map(|(_, slot)| *slot)
    }

    /// Entries grouped by slot, in slot order. Empty slots are omitted.
    #[must_use]
    pub fn by_slot(&self) -> Vec<(Slot, Vec<&Entry>)> {
        let mut groups: Vec<(Slot, Vec<&Entry>)> = Vec::new();
        for entry in &self.entries {
            match groups.last_mut() {
                Some((slot, members)) if *slot == entry.slot => members.push(entry),
                _ => groups.push((entry.slot, vec![entry])),
            }
        }
        groups
    }

    /// A walking-directions link visiting located entries in slot order.
    ///
    /// One located entry yields a search link; two or more yield a directions
    /// link with the first as origin, the last as destination and the rest as
    /// waypoints. At most ten stops are included. Returns `None` when no entry
    /// has a location.
    #[must_use]
    pub fn directions_url(&self) -> Option<Url> {
        let stops: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.place.has_location())
            .take(MAX_DIRECTION_STOPS)
            .map(|entry| format!("{},{}", entry.place.lat(), entry.place.lng()))
            .collect();

        match stops.as_slice() {
            [] => None,
            [only] => {
                let mut url = Url::parse(SEARCH_BASE).ok()?;
                url.query_pairs_mut()
                    .append_pair("api", "1")
                    .append_pair("query", only);
                Some(url)
            }
            [origin, waypoints @ .., destination] => {
                let mut url = Url::parse(DIRECTIONS_BASE).ok()?;
                {
                    let mut query = url.query_pairs_mut();
                    query
                        .append_pair("api", "1")
                        .append_pair("origin", origin)
                        .append_pair("destination", destination);
                    if !waypoints.is_empty() {
                        query.append_pair("waypoints", &waypoints.join("|"));
                    }
                    query.append_pair("travelmode", "walking");
                }
                Some(url)
            }
        }
    }
}
