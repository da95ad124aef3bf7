//! Reconciliation of a trip's itinerary and saved places with the backend.
//!
//! The backend owns the destination list. The stores here read it, enrich
//! each destination through a [`PlaceResolver`], and publish a derived
//! projection: an [`Itinerary`](tripsync_core::Itinerary) for scheduled
//! destinations and [`SavedPlaces`](tripsync_core::SavedPlaces) for the rest.
//! Mutations go to the backend first and are followed by a full reload; the
//! projection is never patched locally.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use tripsync_core::{MemoryCredentials, Place, Slot, TripBackend, PlaceSearch};
//! use tripsync_reconcile::{ItineraryStore, MissingAuthPolicy, PlaceResolver, Remote};
//!
//! async fn plan<B: TripBackend, S: PlaceSearch>(backend: B, search: S, place: Place)
//!     -> Result<(), Box<dyn std::error::Error>>
//! {
//!     let remote = Remote::new(
//!         Arc::new(backend),
//!         Arc::new(MemoryCredentials::default()),
//!         MissingAuthPolicy::Reject,
//!     );
//!     let store = ItineraryStore::new("42", remote, Arc::new(PlaceResolver::new(search)));
//!     store.load().await?;
//!     let slot: Slot = "14:00".parse()?;
//!     store.add(&place, slot).await?;
//!     for entry in store.itinerary().entries() {
//!         println!("{} {}", entry.slot, entry.place.name);
//!     }
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]

mod error;
mod itinerary_store;
mod projection;
mod remote;
mod resolver;
mod saved_store;

pub use error::{LoadOutcome, MutationOutcome, SyncError};
pub use itinerary_store::ItineraryStore;
pub use projection::{Projection, Publication, Snapshot};
pub use remote::{MissingAuthPolicy, Remote};
pub use resolver::{DEFAULT_ANCHOR, PhotoConfig, PlaceResolver, ResolverConfig};
pub use saved_store::SavedPlacesStore;
