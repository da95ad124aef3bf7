//! Authenticated access to the trip backend.

use std::sync::Arc;

use tripsync_core::{CredentialStore, Trip, TripBackend, TripId};

use crate::error::SyncError;

/// What a store does when no token is stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingAuthPolicy {
    /// Do nothing and report a skipped operation.
    #[default]
    Skip,
    /// Fail with [`SyncError::MissingAuth`].
    Reject,
}

/// A backend paired with the credentials used to call it.
///
/// The token is re-read before every operation so sign-in and sign-out take
/// effect on the next call.
#[derive(Debug)]
pub struct Remote<B, C> {
    backend: Arc<B>,
    credentials: Arc<C>,
    policy: MissingAuthPolicy,
}

impl<B, C> Clone for Remote<B, C> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            credentials: Arc::clone(&self.credentials),
            policy: self.policy,
        }
    }
}

impl<B: TripBackend, C: CredentialStore> Remote<B, C> {
    /// Pair `backend` with `credentials`.
    pub const fn new(backend: Arc<B>, credentials: Arc<C>, policy: MissingAuthPolicy) -> Self {
        Self {
            backend,
            credentials,
            policy,
        }
    }

    /// The backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Install the current token on the backend.
    ///
    /// Returns `Ok(false)` when there is no token and the policy is
    /// [`MissingAuthPolicy::Skip`].
    ///
    /// # Errors
    ///
    /// Fails when credentials cannot be read, or when there is no token and
    /// the policy is [`MissingAuthPolicy::Reject`].
    pub fn authorize(&self) -> Result<bool, SyncError> {
        match self.credentials.token()? {
            Some(token) => {
                self.backend.set_auth_token(&token);
                Ok(true)
            }
            None => match self.policy {
                MissingAuthPolicy::Skip => {
                    log::info!("no access token stored; skipping backend call");
                    Ok(false)
                }
                MissingAuthPolicy::Reject => Err(SyncError::MissingAuth),
            },
        }
    }

    /// Authorize and read `trip`. `Ok(None)` means the call was skipped.
    ///
    /// # Errors
    ///
    /// Propagates [`authorize`](Self::authorize) and backend failures.
    pub async fn fetch(&self, trip: &TripId) -> Result<Option<Trip>, SyncError> {
        if !self.authorize()? {
            return Ok(None);
        }
        Ok(Some(self.backend.fetch_trip(trip).await?))
    }
}
