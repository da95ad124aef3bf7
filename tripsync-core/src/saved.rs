//! The undated "saved places" projection.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::place::Place;
use crate::trip::DestinationId;

/// An enriched place backed by an unscheduled destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPlace {
    /// Backend destination holding the place.
    pub destination_id: DestinationId,
    /// Enriched place.
    pub place: Place,
}

/// Saved places in backend order, unique by place id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedPlaces {
    places: Vec<SavedPlace>,
}

impl SavedPlaces {
    /// Build the collection, keeping the first occurrence of each place id.
    #[must_use]
    pub fn new(places: Vec<SavedPlace>) -> Self {
        let mut seen = HashSet::new();
        let places = places
            .into_iter()
            .filter(|saved| seen.insert(saved.place.id.clone()))
            .collect();
        Self { places }
    }

    /// Saved places in backend order.
    #[must_use]
    pub fn places(&self) -> &[SavedPlace] {
        &self.places
    }

    /// Number of saved places.
    #[must_use]
    pub fn len(&self) -> usize {
        self.places.len()
    }

    /// Whether nothing is saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Whether a place with this id is saved.
    #[must_use]
    pub fn contains(&self, place_id: &str) -> bool {
        self.find(place_id).is_some()
    }

    /// Look up a saved place by place id.
    #[must_use]
    pub fn find(&self, place_id: &str) -> Option<&SavedPlace> {
        self.places.iter().find(|saved| saved.place.id == place_id)
    }
}
