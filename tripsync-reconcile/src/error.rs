//! Store-level errors.

use thiserror::Error;
use tripsync_core::{BackendError, CredentialError, Slot};

/// Errors returned by the itinerary and saved-places stores.
///
/// Whenever one of these is returned the store's published state is exactly
/// what it was before the call.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The target slot is already full; nothing was sent to the backend.
    #[error("slot {slot} already holds {limit} places")]
    CapacityExceeded {
        /// Requested slot.
        slot: Slot,
        /// Configured limit.
        limit: usize,
    },
    /// The backend rejected or failed the request.
    #[error("backend request failed: {0}")]
    Backend(#[from] BackendError),
    /// No token is stored and the store is configured to reject such calls.
    #[error("no access token is available")]
    MissingAuth,
    /// The token could not be read from storage.
    #[error("failed to read credentials: {0}")]
    Credentials(#[from] CredentialError),
    /// The mutation was accepted but the follow-up reload failed.
    #[error("change was applied but the refresh failed: {source}")]
    RefreshAfterMutation {
        /// Reload failure.
        #[source]
        source: Box<SyncError>,
    },
    /// The place is not among the saved places.
    #[error("place {place_id} is not saved")]
    UnknownPlace {
        /// Requested place id.
        place_id: String,
    },
}

/// Outcome of a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A fresh projection is now current.
    Published {
        /// Places shown.
        entries: usize,
        /// Destinations whose enrichment failed.
        unresolved: usize,
    },
    /// A newer load published first; this result was discarded.
    Superseded,
    /// The store was detached; this result was discarded.
    Detached,
    /// No token was available; nothing was fetched.
    Skipped,
}

/// Outcome of a successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The backend accepted the change and the store was reloaded.
    Applied,
    /// The requested state already held; nothing was sent.
    Unchanged,
    /// No token was available; nothing was sent.
    Skipped,
}
