//! JSON schemas for the places text-search provider.
//!
//! The provider answers either `{"results": [...]}` or a bare array of
//! results shaped like Google Places text-search hits.

use geo::Coord;
use serde::Deserialize;
use tripsync_core::PlaceCandidate;

/// Top-level search payload.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PlacesPayload {
    /// Object wrapping a `results` array.
    Wrapped {
        /// Results, best first.
        #[serde(default)]
        results: Vec<PlaceResult>,
    },
    /// Bare array of results.
    Bare(Vec<PlaceResult>),
}

impl PlacesPayload {
    /// Results in provider order.
    #[must_use]
    pub fn into_results(self) -> Vec<PlaceResult> {
        match self {
            Self::Wrapped { results } | Self::Bare(results) => results,
        }
    }
}

/// One search hit.
#[derive(Debug, Default, Deserialize)]
pub struct PlaceResult {
    /// Provider identifier.
    #[serde(default)]
    pub place_id: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Full formatted address.
    #[serde(default)]
    pub formatted_address: Option<String>,
    /// Short address used by nearby searches.
    #[serde(default)]
    pub vicinity: Option<String>,
    /// Location block.
    #[serde(default)]
    pub geometry: Option<Geometry>,
    /// Average rating.
    #[serde(default)]
    pub rating: Option<f32>,
    /// Photos, first is the cover.
    #[serde(default)]
    pub photos: Vec<Photo>,
}

/// `geometry` block.
#[derive(Debug, Default, Deserialize)]
pub struct Geometry {
    /// Point location.
    #[serde(default)]
    pub location: Option<LatLng>,
}

/// `geometry.location` block.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

/// One entry of `photos`.
#[derive(Debug, Default, Deserialize)]
pub struct Photo {
    /// Opaque reference for the photo endpoint.
    #[serde(default)]
    pub photo_reference: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<PlaceResult> for PlaceCandidate {
    fn from(result: PlaceResult) -> Self {
        let location = result
            .geometry
            .and_then(|g| g.location)
            .map(|LatLng { lat, lng }| Coord { x: lng, y: lat });
        let photo_ref = result
            .photos
            .into_iter()
            .next()
            .and_then(|photo| non_blank(photo.photo_reference));
        Self {
            place_id: non_blank(result.place_id),
            name: result.name,
            address: non_blank(result.formatted_address).or_else(|| non_blank(result.vicinity)),
            location,
            rating: result.rating,
            photo_ref,
        }
    }
}
