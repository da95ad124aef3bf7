//! HTTP adapter for the trip backend's REST surface.
//!
//! - `GET /trips/{tripId}` reads the trip.
//! - `POST /trips/{tripId}/destinations` creates a destination.
//! - `PUT /trips/{tripId}/destinations` moves a destination to a new time.
//! - `DELETE /trips/{tripId}/destinations/{destinationId}` removes one.
//!
//! The bearer token installed with
//! [`TripBackend::set_auth_token`](tripsync_core::TripBackend::set_auth_token)
//! is attached to every request.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use tripsync_core::{AuthToken, TripBackend, TripId};
//! use tripsync_data::backend::{HttpBackendConfig, HttpTripBackend};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpBackendConfig::new("http://localhost:8080/api")
//!     .with_timeout(Duration::from_secs(10));
//! let backend = HttpTripBackend::with_config(config)?;
//! if let Some(token) = AuthToken::new("secret") {
//!     backend.set_auth_token(&token);
//! }
//! let trip = backend.fetch_trip(&TripId::from("42")).await?;
//! println!("{} destinations", trip.destinations.len());
//! # Ok(())
//! # }
//! ```

mod http;
pub mod wire;

pub use http::{HttpBackendConfig, HttpTripBackend};
