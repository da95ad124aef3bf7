//! The REST backend that owns a trip's destinations.
//!
//! The [`TripBackend`] trait abstracts the four calls the stores make: read
//! a trip, create a destination, reschedule one and delete one. The backend
//! is authoritative; callers re-read the trip after every mutation instead of
//! patching local state.

use async_trait::async_trait;
use geo::Coord;
use jiff::civil::DateTime;
use thiserror::Error;

use crate::credentials::AuthToken;
use crate::trip::{DestinationId, Trip, TripId};

/// Errors from [`TripBackend`] calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The backend answered with a non-success status.
    #[error("request to {url} failed with status {status}: {message}")]
    Http {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error text supplied by the backend.
        message: String,
    },
    /// The request could not be delivered.
    #[error("network error contacting {url}: {message}")]
    Network {
        /// Request URL.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The request did not complete in time.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL.
        url: String,
        /// Configured timeout.
        timeout_secs: u64,
    },
    /// The response body did not match the expected schema.
    #[error("failed to decode response from {url}: {message}")]
    Decode {
        /// Request URL.
        url: String,
        /// Decoder error description.
        message: String,
    },
}

impl BackendError {
    /// Whether retrying the same request may succeed.
    ///
    /// Network failures, timeouts and 5xx responses are transient; client
    /// errors and malformed bodies are not.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } | Self::Timeout { .. } => true,
            Self::Http { status, .. } => *status >= 500,
            Self::Decode { .. } => false,
        }
    }
}

/// Payload for creating a destination.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDestination {
    /// Name the backend stores and later reports back.
    pub name: String,
    /// Coordinates, `x = longitude`.
    pub location: Coord<f64>,
    /// Visit time; `None` saves the place without scheduling it.
    pub visit_time: Option<DateTime>,
}

/// Payload for moving a destination to another time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RescheduleDestination {
    /// Destination to move.
    pub destination_id: DestinationId,
    /// New visit time; `None` unschedules it.
    pub visit_time: Option<DateTime>,
}

/// Operations the stores need from the trip backend.
///
/// Implementations attach the token passed to [`set_auth_token`] to every
/// subsequent request.
///
/// [`set_auth_token`]: TripBackend::set_auth_token
#[async_trait]
pub trait TripBackend: Send + Sync {
    /// Use `token` as the bearer credential for subsequent calls.
    fn set_auth_token(&self, token: &AuthToken);

    /// Read a trip with its destinations.
    async fn fetch_trip(&self, trip: &TripId) -> Result<Trip, BackendError>;

    /// Create a destination within `trip`.
    async fn create_destination(
        &self,
        trip: &TripId,
        destination: &NewDestination,
    ) -> Result<(), BackendError>;

    /// Change a destination's visit time.
    async fn reschedule_destination(
        &self,
        trip: &TripId,
        request: &RescheduleDestination,
    ) -> Result<(), BackendError>;

    /// Delete a destination by id.
    async fn delete_destination(
        &self,
        trip: &TripId,
        destination_id: DestinationId,
    ) -> Result<(), BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(BackendError::Network { url: "u".into(), message: "refused".into() }, true)]
    #[case(BackendError::Timeout { url: "u".into(), timeout_secs: 30 }, true)]
    #[case(BackendError::Http { url: "u".into(), status: 503, message: String::new() }, true)]
    #[case(BackendError::Http { url: "u".into(), status: 404, message: String::new() }, false)]
    #[case(BackendError::Decode { url: "u".into(), message: "eof".into() }, false)]
    fn classifies_transient_errors(#[case] error: BackendError, #[case] transient: bool) {
        assert_eq!(error.is_transient(), transient);
    }
}
