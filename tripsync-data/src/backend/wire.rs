//! JSON schemas for the trip backend.
//!
//! Responses are validated here so the rest of the workspace only sees
//! [`Trip`] values. Fields the backend may omit carry serde defaults.

use jiff::civil::{Date, DateTime};
use jiff::{Timestamp, tz::TimeZone};
use serde::{Deserialize, Serialize};
use tripsync_core::{Destination, DestinationId, Trip, TripId, TripSummary};

/// An identifier the backend may send as a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    /// Numeric form.
    Number(u64),
    /// Textual form.
    Text(String),
}

impl WireId {
    /// The numeric value, accepting digit-only strings.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl From<&TripId> for WireId {
    fn from(value: &TripId) -> Self {
        value
            .as_str()
            .parse()
            .map_or_else(|_| Self::Text(value.as_str().to_owned()), Self::Number)
    }
}

/// `GET /trips/{tripId}` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripResponse {
    /// Echoed trip id.
    #[serde(default)]
    pub trip_id: Option<WireId>,
    /// Destinations in backend order.
    #[serde(default)]
    pub destinations: Vec<DestinationRecord>,
    /// Descriptive fields.
    #[serde(default)]
    pub basic_info: Option<BasicInfo>,
}

/// One destination as the backend reports it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationRecord {
    /// Backend identifier.
    pub destination_id: WireId,
    /// Search key.
    #[serde(default)]
    pub destination_name: String,
    /// ISO-8601 timestamp, or null/empty when unscheduled.
    #[serde(default)]
    pub visit_time: Option<String>,
}

/// The `basicInfo` block.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    /// Display name.
    #[serde(default)]
    pub trip_name: String,
    /// Trip start, ISO-8601.
    #[serde(default)]
    pub start_date_time: Option<String>,
}

impl TripResponse {
    /// Validate the response into a [`Trip`].
    ///
    /// The requested id is kept when the backend does not echo one.
    ///
    /// # Errors
    ///
    /// Returns a description of the first destination whose id is not a
    /// non-negative integer.
    pub fn into_trip(self, requested: &TripId) -> Result<Trip, String> {
        let id = match self.trip_id {
            Some(WireId::Number(n)) => TripId::from(n.to_string()),
            Some(WireId::Text(text)) if !text.is_empty() => TripId::from(text),
            _ => requested.clone(),
        };
        let destinations = self
            .destinations
            .into_iter()
            .map(DestinationRecord::into_destination)
            .collect::<Result<Vec<_>, _>>()?;
        let info = self.basic_info.unwrap_or_default();
        Ok(Trip {
            id,
            summary: TripSummary {
                name: info.trip_name,
                start: info.start_date_time.as_deref().and_then(parse_start),
            },
            destinations,
        })
    }
}

impl DestinationRecord {
    fn into_destination(self) -> Result<Destination, String> {
        let id: DestinationId = self
            .destination_id
            .as_u64()
            .ok_or_else(|| format!("destination id {:?} is not an integer", self.destination_id))?;
        Ok(Destination::new(id, self.destination_name, self.visit_time))
    }
}

/// Interpret a trip start as a civil datetime.
///
/// Accepts a civil datetime, an instant with an offset (converted to UTC) or
/// a bare date (midnight).
fn parse_start(raw: &str) -> Option<DateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(datetime) = raw.parse::<DateTime>() {
        return Some(datetime);
    }
    if let Ok(instant) = raw.parse::<Timestamp>() {
        return Some(instant.to_zoned(TimeZone::UTC).datetime());
    }
    if let Ok(date) = raw.parse::<Date>() {
        return Some(date.at(0, 0, 0, 0));
    }
    log::debug!("ignoring unparseable trip start {raw:?}");
    None
}

/// `POST /trips/{tripId}/destinations` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDestinationBody<'a> {
    /// Owning trip.
    pub trip_id: WireId,
    /// Search key stored by the backend.
    pub destination_name: &'a str,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Visit time, `null` for saved places.
    pub visit_time: Option<String>,
}

/// `PUT /trips/{tripId}/destinations` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleBody {
    /// Destination to move.
    pub destination_id: DestinationId,
    /// New visit time, `null` to unschedule.
    pub visit_time: Option<String>,
}
