//! I/O adapters for the tripsync workspace.
//!
//! Responsibilities:
//! - Implement [`tripsync_core::TripBackend`] and [`tripsync_core::PlaceSearch`]
//!   over HTTP with `reqwest`.
//! - Validate wire payloads into core types at the boundary.
//! - Persist the bearer token for the command-line front-end.
//!
//! Boundaries:
//! - No reconciliation rules; those live in `tripsync-reconcile`.
//! - No global mutable state.

#![forbid(unsafe_code)]

pub mod backend;
mod client;
mod credentials;
pub mod search;

pub use backend::{HttpBackendConfig, HttpTripBackend};
pub use client::{DEFAULT_USER_AGENT, ProviderBuildError, RetryPolicy};
pub use credentials::FileCredentials;
pub use search::{HttpPlaceSearch, HttpSearchConfig};
