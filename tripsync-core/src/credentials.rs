//! Bearer-token storage.
//!
//! The token is injected rather than read from ambient global state. Stores
//! ask the [`CredentialStore`] for the current token before every backend
//! call, so a token set or cleared between calls takes effect immediately.

use std::fmt;
use std::io;
use std::sync::{Mutex, PoisonError};

use camino::Utf8PathBuf;
use thiserror::Error;

/// An opaque bearer token.
///
/// The `Debug` output is redacted so tokens do not leak into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a raw token, returning `None` for blank input.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == token.len() {
            Some(Self(token))
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    /// The raw token text.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Errors raised while reading or writing stored credentials.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The credential file could not be read.
    #[error("failed to read credentials from {path}: {source}")]
    Read {
        /// Credential file path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The credential file could not be written or removed.
    #[error("failed to write credentials to {path}: {source}")]
    Write {
        /// Credential file path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The credential file exists but is not valid.
    #[error("credentials at {path} are malformed: {message}")]
    Parse {
        /// Credential file path.
        path: Utf8PathBuf,
        /// Parser error description.
        message: String,
    },
}

/// Source of the bearer token attached to backend calls.
pub trait CredentialStore: Send + Sync {
    /// The current token, or `None` when signed out.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] when the backing storage cannot be read.
    fn token(&self) -> Result<Option<AuthToken>, CredentialError>;

    /// Replace the stored token.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] when the backing storage cannot be written.
    fn set_token(&self, token: &AuthToken) -> Result<(), CredentialError>;

    /// Forget the stored token.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] when the backing storage cannot be written.
    fn clear(&self) -> Result<(), CredentialError>;
}

/// Process-local credential storage.
///
/// # Examples
///
/// ```
/// use tripsync_core::{AuthToken, CredentialStore, MemoryCredentials};
///
/// let store = MemoryCredentials::default();
/// assert!(store.token()?.is_none());
/// let token = AuthToken::new("abc").expect("non-blank");
/// store.set_token(&token)?;
/// assert_eq!(store.token()?, Some(token));
/// # Ok::<(), tripsync_core::CredentialError>(())
/// ```
#[derive(Debug, Default)]
pub struct MemoryCredentials {
    token: Mutex<Option<AuthToken>>,
}

impl MemoryCredentials {
    /// Storage pre-populated with `token`.
    #[must_use]
    pub fn with_token(token: AuthToken) -> Self {
        Self {
            token: Mutex::new(Some(token)),
        }
    }
}

impl CredentialStore for MemoryCredentials {
    fn token(&self) -> Result<Option<AuthToken>, CredentialError> {
        Ok(self
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn set_token(&self, token: &AuthToken) -> Result<(), CredentialError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", None)]
    #[case("   ", None)]
    #[case("abc", Some("abc"))]
    #[case(" abc\n", Some("abc"))]
    fn trims_and_rejects_blank_tokens(#[case] raw: &str, #[case] expected: Option<&str>) {
        assert_eq!(AuthToken::new(raw).as_ref().map(AuthToken::expose), expected);
    }

    #[rstest]
    fn debug_output_is_redacted() {
        let token = AuthToken::new("secret-value").expect("non-blank");
        assert!(!format!("{token:?}").contains("secret"));
    }

    #[rstest]
    fn clear_forgets_token() {
        let store = MemoryCredentials::with_token(AuthToken::new("t").expect("non-blank"));
        store.clear().expect("clear");
        assert!(store.token().expect("read").is_none());
    }
}
