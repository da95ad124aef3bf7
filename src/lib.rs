//! Facade crate for the tripsync itinerary service.
//!
//! This crate re-exports the core domain types and the reconciliation stores,
//! and exposes the HTTP adapters behind the `http` feature.

#![forbid(unsafe_code)]

pub use tripsync_core::{
    AuthToken, BackendError, CredentialError, CredentialStore, DEFAULT_SLOT_LIMIT, Destination,
    DestinationId, Entry, Itinerary, MemoryCredentials, NewDestination, PLACEHOLDER_IMAGE, Place,
    PlaceCandidate, PlaceSearch, RescheduleDestination, SavedPlace, SavedPlaces, SearchError, Slot,
    SlotCapacity, SlotError, TextQuery, TravelTimes, Trip, TripBackend, TripId, TripSummary,
};

pub use tripsync_reconcile::{
    DEFAULT_ANCHOR, ItineraryStore, LoadOutcome, MissingAuthPolicy, MutationOutcome, PhotoConfig,
    PlaceResolver, Projection, Publication, Remote, ResolverConfig, SavedPlacesStore, Snapshot,
    SyncError,
};

#[cfg(feature = "http")]
pub use tripsync_data::{
    DEFAULT_USER_AGENT, FileCredentials, HttpBackendConfig, HttpPlaceSearch, HttpSearchConfig,
    HttpTripBackend, ProviderBuildError, RetryPolicy,
};

#[cfg(feature = "test-support")]
pub use tripsync_core::test_support;
