//! File-backed [`CredentialStore`].

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tripsync_core::{AuthToken, CredentialError, CredentialStore};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCredentials {
    #[serde(default)]
    access_token: Option<String>,
}

/// Stores the bearer token as `{"accessToken": "..."}` in a JSON file.
///
/// A missing file means signed out. Every call reads or writes the file, so
/// several processes sharing the path observe each other's changes.
///
/// # Examples
///
/// ```no_run
/// use tripsync_core::{AuthToken, CredentialStore};
/// use tripsync_data::FileCredentials;
///
/// let store = FileCredentials::new("/tmp/tripsync/credentials.json");
/// if let Some(token) = AuthToken::new("secret") {
///     store.set_token(&token)?;
/// }
/// assert!(store.token()?.is_some());
/// # Ok::<(), tripsync_core::CredentialError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileCredentials {
    path: Utf8PathBuf,
}

impl FileCredentials {
    /// Use the credential file at `path`.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the credential file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl CredentialStore for FileCredentials {
    fn token(&self) -> Result<Option<AuthToken>, CredentialError> {
        let Some(contents) =
            tripsync_fs::read_to_string_if_exists(&self.path).map_err(|source| {
                CredentialError::Read {
                    path: self.path.clone(),
                    source,
                }
            })?
        else {
            return Ok(None);
        };
        if contents.trim().is_empty() {
            return Ok(None);
        }
        let stored: StoredCredentials =
            serde_json::from_str(&contents).map_err(|err| CredentialError::Parse {
                path: self.path.clone(),
                message: err.to_string(),
            })?;
        Ok(stored.access_token.and_then(AuthToken::new))
    }

    fn set_token(&self, token: &AuthToken) -> Result<(), CredentialError> {
        let stored = StoredCredentials {
            access_token: Some(token.expose().to_owned()),
        };
        let json = serde_json::to_string_pretty(&stored).map_err(|err| CredentialError::Parse {
            path: self.path.clone(),
            message: err.to_string(),
        })?;
        tripsync_fs::write_string(&self.path, &json).map_err(|source| CredentialError::Write {
            path: self.path.clone(),
            source,
        })?;
        log::debug!("stored credentials at {}", self.path);
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        let removed = tripsync_fs::remove_file_if_exists(&self.path).map_err(|source| {
            CredentialError::Write {
                path: self.path.clone(),
                source,
            }
        })?;
        if removed {
            log::debug!("removed credentials at {}", self.path);
        }
        Ok(())
    }
}
