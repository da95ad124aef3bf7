//! Stub services and fixtures for driving CLI commands without a network.

use std::sync::Arc;

use camino::Utf8PathBuf;
use geo::Coord;
use tempfile::TempDir;
use tripsync_core::test_support::{StubPlaceSearch, StubTripBackend};
use tripsync_core::{AuthToken, CredentialStore, Destination, PlaceCandidate};
use tripsync_data::FileCredentials;

use crate::connection::{ConnectionConfig, ServiceBuilder};
use crate::CliError;

/// Places the stub search provider knows about.
pub(super) const KNOWN_PLACES: [(&str, f64, f64); 5] = [
    ("Met Museum", -73.963, 40.779),
    ("MoMA", -73.977, 40.761),
    ("Guggenheim", -73.959, 40.783),
    ("Frick", -73.967, 40.771),
    ("Cloisters", -73.932, 40.865),
];

pub(super) fn place_id(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// [`ServiceBuilder`] handing out a shared stub backend.
pub(super) struct StubServices {
    pub(super) backend: Arc<StubTripBackend>,
}

impl StubServices {
    pub(super) fn new(trip: &str, destinations: Vec<Destination>) -> Self {
        Self {
            backend: Arc::new(StubTripBackend::new(trip, destinations)),
        }
    }
}

impl ServiceBuilder for StubServices {
    type Backend = StubTripBackend;
    type Search = StubPlaceSearch;

    fn backend(&self, _config: &ConnectionConfig) -> Result<Arc<Self::Backend>, CliError> {
        Ok(Arc::clone(&self.backend))
    }

    fn search(&self, _config: &ConnectionConfig) -> Result<Self::Search, CliError> {
        Ok(KNOWN_PLACES
            .iter()
            .fold(StubPlaceSearch::new(), |search, (name, x, y)| {
                search.with_place(
                    *name,
                    PlaceCandidate::located(place_id(name), *name, Coord { x: *x, y: *y }),
                )
            }))
    }
}

/// A temporary credential file.
pub(super) struct CredentialFile {
    _dir: TempDir,
    pub(super) path: Utf8PathBuf,
}

impl CredentialFile {
    pub(super) fn empty() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("credentials.json"))
            .expect("utf-8 temp path");
        Self { _dir: dir, path }
    }

    pub(super) fn signed_in() -> Self {
        let file = Self::empty();
        FileCredentials::new(file.path.clone())
            .set_token(&AuthToken::new("cli-token").expect("non-blank"))
            .expect("write token");
        file
    }
}

pub(super) fn scheduled(id: u64, name: &str, at: &str) -> Destination {
    Destination::new(id, name, Some(format!("2024-05-01T{at}:00")))
}
