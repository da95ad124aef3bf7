//! Enriched places as shown to the traveller.
//!
//! ```
//! use tripsync_core::place::{PLACEHOLDER_IMAGE, Place};
//!
//! let place = Place::new("p-1", "Frick", geo::Coord { x: -73.9671, y: 40.7712 });
//! assert_eq!(place.image_url, PLACEHOLDER_IMAGE);
//! ```

use geo::Coord;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Image shown when the provider returned no usable photo.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.jpg";

/// Travel estimates to a place, in whole minutes.
///
/// Unknown legs are reported as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelTimes {
    /// Minutes on foot.
    pub walk: u32,
    /// Minutes by car.
    pub drive: u32,
    /// Minutes by public transit.
    pub transit: u32,
}

/// A fully enriched place ready for display.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`, matching
/// `geo`'s convention. A location of `(0, 0)` means the provider gave no
/// geometry; use [`Place::has_location`] instead of comparing coordinates.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use tripsync_core::Place;
///
/// let place = Place::new("p-1", "Met Museum", Coord { x: -73.9632, y: 40.7794 });
/// assert!(place.has_location());
/// assert_eq!(place.lat(), 40.7794);
///
/// let unresolved = Place::new("p-2", "Nowhere", Coord { x: 0.0, y: 0.0 });
/// assert!(!unresolved.has_location());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    /// Provider identifier, or `dest-{id}` when only the backend knew it.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Formatted street address, possibly empty.
    #[serde(default)]
    pub address: String,
    /// Geographic position.
    #[serde(with = "lat_lng")]
    pub location: Coord<f64>,
    /// Photo URL or [`PLACEHOLDER_IMAGE`].
    pub image_url: String,
    /// Provider rating in `0.0..=5.0`.
    #[serde(default)]
    pub rating: f32,
    /// Typical busy time, free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crowd_time: Option<String>,
    /// Scheduled visit time as reported by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_time: Option<String>,
    /// Travel estimates.
    #[serde(default)]
    pub travel: TravelTimes,
}

impl Place {
    /// Construct a place with default presentation fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>, location: Coord<f64>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: String::new(),
            location,
            image_url: PLACEHOLDER_IMAGE.to_owned(),
            rating: 0.0,
            crowd_time: None,
            visit_time: None,
            travel: TravelTimes::default(),
        }
    }

    /// Set the address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Set the rating, clamped to `0.0..=5.0`. Non-finite ratings become zero.
    #[must_use]
    pub fn with_rating(mut self, rating: f32) -> Self {
        self.rating = if rating.is_finite() {
            rating.clamp(0.0, 5.0)
        } else {
            0.0
        };
        self
    }

    /// Set the image URL.
    #[must_use]
    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }

    /// Set the scheduled visit time.
    #[must_use]
    pub fn with_visit_time(mut self, visit_time: Option<String>) -> Self {
        self.visit_time = visit_time.filter(|v| !v.trim().is_empty());
        self
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.location.y
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn lng(&self) -> f64 {
        self.location.x
    }

    /// Whether the place has a real location rather than the `(0, 0)` default.
    #[must_use]
    pub fn has_location(&self) -> bool {
        self.location != Coord { x: 0.0, y: 0.0 }
    }
}

mod lat_lng {
    use super::{Coord, Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct LatLng {
        lat: f64,
        lng: f64,
    }

    pub(super) fn serialize<S: Serializer>(
        coord: &Coord<f64>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        LatLng {
            lat: coord.y,
            lng: coord.x,
        }
        .serialize(serializer)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Coord<f64>, D::Error> {
        let LatLng { lat, lng } = LatLng::deserialize(deserializer)?;
        Ok(Coord { x: lng, y: lat })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(4.5, 4.5)]
    #[case(7.0, 5.0)]
    #[case(-1.0, 0.0)]
    #[case(f32::NAN, 0.0)]
    fn rating_is_clamped(#[case] input: f32, #[case] expected: f32) {
        let place = Place::new("id", "name", Coord { x: 1.0, y: 1.0 }).with_rating(input);
        assert_eq!(place.rating, expected);
    }

    #[rstest]
    fn blank_visit_time_is_dropped() {
        let place =
            Place::new("id", "name", Coord { x: 1.0, y: 1.0 }).with_visit_time(Some(" ".into()));
        assert_eq!(place.visit_time, None);
    }

    #[rstest]
    fn location_serialises_as_lat_lng() {
        let place = Place::new("id", "Park", Coord { x: -73.97, y: 40.78 });
        let value = serde_json::to_value(&place).expect("serialise place");
        assert_eq!(value["location"]["lat"], 40.78);
        assert_eq!(value["location"]["lng"], -73.97);
        assert_eq!(value["imageUrl"], PLACEHOLDER_IMAGE);
        assert_eq!(value["travel"]["walk"], 0);
    }
}
