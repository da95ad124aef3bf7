//! Settings and service wiring shared by the trip subcommands.

use std::sync::Arc;
use std::time::Duration;

use camino::Utf8PathBuf;
use geo::Coord;
use tripsync_core::{PlaceSearch, TripBackend, TripId};
use tripsync_data::{
    FileCredentials, HttpBackendConfig, HttpPlaceSearch, HttpSearchConfig, HttpTripBackend,
};
use tripsync_reconcile::{
    DEFAULT_ANCHOR, MissingAuthPolicy, PhotoConfig, PlaceResolver, Remote, ResolverConfig,
};

use crate::{ARG_TRIP, CliError};

/// Credential file used when none is configured.
pub(crate) const DEFAULT_CREDENTIALS_PATH: &str = ".tripsync/credentials.json";

/// Connection settings as merged from flags, environment and files.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawConnection {
    pub(crate) trip: Option<String>,
    pub(crate) backend_url: Option<String>,
    pub(crate) places_url: Option<String>,
    pub(crate) credentials: Option<Utf8PathBuf>,
    pub(crate) maps_api_key: Option<String>,
    pub(crate) anchor_lat: Option<f64>,
    pub(crate) anchor_lng: Option<f64>,
    pub(crate) timeout_secs: Option<u64>,
}

/// Validated connection settings.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ConnectionConfig {
    pub(crate) trip: TripId,
    pub(crate) backend_url: String,
    pub(crate) places_url: String,
    pub(crate) credentials: Utf8PathBuf,
    pub(crate) maps_api_key: Option<String>,
    pub(crate) anchor: Coord<f64>,
    pub(crate) timeout: Option<Duration>,
}

impl ConnectionConfig {
    /// Validate `raw`, naming `trip_env` when the trip id is missing.
    pub(crate) fn from_raw(raw: RawConnection, trip_env: &'static str) -> Result<Self, CliError> {
        let trip = raw
            .trip
            .map(|trip| trip.trim().to_owned())
            .filter(|trip| !trip.is_empty())
            .ok_or(CliError::MissingArgument {
                field: ARG_TRIP,
                env: trip_env,
            })?;
        let lat = raw.anchor_lat.unwrap_or(DEFAULT_ANCHOR.y);
        let lng = raw.anchor_lng.unwrap_or(DEFAULT_ANCHOR.x);
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(CliError::InvalidAnchor { lat, lng });
        }
        Ok(Self {
            trip: TripId::new(trip),
            backend_url: raw
                .backend_url
                .unwrap_or_else(|| HttpBackendConfig::default().base_url),
            places_url: raw
                .places_url
                .unwrap_or_else(|| HttpSearchConfig::default().places_url),
            credentials: raw
                .credentials
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_CREDENTIALS_PATH)),
            maps_api_key: raw.maps_api_key.filter(|key| !key.trim().is_empty()),
            anchor: Coord { x: lng, y: lat },
            timeout: raw.timeout_secs.map(Duration::from_secs),
        })
    }

    fn resolver_config(&self) -> ResolverConfig {
        let photos = match &self.maps_api_key {
            Some(key) => PhotoConfig::default().with_api_key(key.clone()),
            None => PhotoConfig::default(),
        };
        ResolverConfig::default()
            .with_anchor(self.anchor)
            .with_photos(photos)
    }

    /// Build the backend, resolver and credentials for a store.
    pub(crate) fn connect<SB: ServiceBuilder>(
        &self,
        builder: &SB,
    ) -> Result<Connection<SB::Backend, SB::Search>, CliError> {
        let backend = builder.backend(self)?;
        let search = builder.search(self)?;
        let credentials = Arc::new(FileCredentials::new(self.credentials.clone()));
        Ok(Connection {
            remote: Remote::new(backend, credentials, MissingAuthPolicy::Reject),
            resolver: Arc::new(PlaceResolver::with_config(search, self.resolver_config())),
        })
    }
}

/// The pieces a store is built from.
pub(crate) struct Connection<B, S> {
    pub(crate) remote: Remote<B, FileCredentials>,
    pub(crate) resolver: Arc<PlaceResolver<S>>,
}

/// Builds the backend and search provider for a command invocation.
pub(crate) trait ServiceBuilder {
    type Backend: TripBackend;
    type Search: PlaceSearch;

    fn backend(&self, config: &ConnectionConfig) -> Result<Arc<Self::Backend>, CliError>;
    fn search(&self, config: &ConnectionConfig) -> Result<Self::Search, CliError>;
}

/// Production wiring over HTTP.
pub(crate) struct HttpServices;

impl ServiceBuilder for HttpServices {
    type Backend = HttpTripBackend;
    type Search = HttpPlaceSearch;

    fn backend(&self, config: &ConnectionConfig) -> Result<Arc<Self::Backend>, CliError> {
        let mut http = HttpBackendConfig::new(config.backend_url.clone());
        if let Some(timeout) = config.timeout {
            http = http.with_timeout(timeout);
        }
        HttpTripBackend::with_config(http)
            .map(Arc::new)
            .map_err(|source| CliError::BuildBackend {
                url: config.backend_url.clone(),
                source,
            })
    }

    fn search(&self, config: &ConnectionConfig) -> Result<Self::Search, CliError> {
        let mut http = HttpSearchConfig::new(config.places_url.clone());
        if let Some(timeout) = config.timeout {
            http = http.with_timeout(timeout);
        }
        HttpPlaceSearch::with_config(http).map_err(|source| CliError::BuildSearch {
            url: config.places_url.clone(),
            source,
        })
    }
}
