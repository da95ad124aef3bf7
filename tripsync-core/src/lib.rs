//! Core domain types for the tripsync itinerary service.
//!
//! This crate holds the values the reconciliation pipeline passes around
//! (places, destinations, slots and the derived itinerary), the slot capacity
//! rule, and the traits at the I/O seams:
//!
//! - [`TripBackend`] for the REST backend that owns a trip's destinations.
//! - [`PlaceSearch`] for the text-search provider used to enrich names.
//! - [`CredentialStore`] for the injected bearer-token storage.
//!
//! Nothing here performs I/O. Adapters live in `tripsync-data` and the
//! stores that orchestrate them live in `tripsync-reconcile`.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod backend;
pub mod capacity;
pub mod credentials;
pub mod itinerary;
pub mod place;
pub mod saved;
pub mod search;
pub mod slot;
pub mod trip;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use backend::{BackendError, NewDestination, RescheduleDestination, TripBackend};
pub use capacity::{DEFAULT_SLOT_LIMIT, SlotCapacity};
pub use credentials::{AuthToken, CredentialError, CredentialStore, MemoryCredentials};
pub use itinerary::{Entry, Itinerary};
pub use place::{PLACEHOLDER_IMAGE, Place, TravelTimes};
pub use saved::{SavedPlace, SavedPlaces};
pub use search::{PlaceCandidate, PlaceSearch, SearchError, TextQuery};
pub use slot::{Slot, SlotError};
pub use trip::{Destination, DestinationId, Trip, TripId, TripSummary};
