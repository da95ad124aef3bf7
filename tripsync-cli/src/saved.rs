//! `saved` command implementation.

use std::io::Write;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use tripsync_core::SavedPlace;
use tripsync_reconcile::{MutationOutcome, SavedPlacesStore};

use crate::connection::{ConnectionConfig, RawConnection, ServiceBuilder};
use crate::{
    ARG_ADD, ARG_ANCHOR_LAT, ARG_ANCHOR_LNG, ARG_BACKEND_URL, ARG_CREDENTIALS, ARG_MAPS_API_KEY,
    ARG_PLACES_URL, ARG_REMOVE, ARG_TIMEOUT_SECS, ARG_TRIP, CliError, ENV_SAVED_TRIP, block_on,
    outcome_label, write_json,
};

/// CLI arguments for the `saved` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Load a trip's saved (unscheduled) places from the backend \
                 and print them. --add resolves a place by name and saves it; \
                 --remove deletes the destination behind a saved place id.",
    about = "Show or change a trip's saved places"
)]
#[ortho_config(prefix = "TRIPSYNC")]
pub(crate) struct SavedArgs {
    /// Trip identifier.
    #[arg(long = ARG_TRIP, value_name = "id")]
    #[serde(default)]
    pub(crate) trip: Option<String>,
    /// Base URL of the trip backend.
    #[arg(long = ARG_BACKEND_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) backend_url: Option<String>,
    /// Place search endpoint.
    #[arg(long = ARG_PLACES_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) places_url: Option<String>,
    /// Path to the credential file.
    #[arg(long = ARG_CREDENTIALS, value_name = "path")]
    #[serde(default)]
    pub(crate) credentials: Option<Utf8PathBuf>,
    /// Maps API key used for place photos.
    #[arg(long = ARG_MAPS_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) maps_api_key: Option<String>,
    /// Latitude that biases place search.
    #[arg(long = ARG_ANCHOR_LAT, value_name = "deg", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) anchor_lat: Option<f64>,
    /// Longitude that biases place search.
    #[arg(long = ARG_ANCHOR_LNG, value_name = "deg", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) anchor_lng: Option<f64>,
    /// Request timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// Place name to save.
    #[arg(long = ARG_ADD, value_name = "name")]
    #[serde(default)]
    pub(crate) add: Option<String>,
    /// Saved place id to remove.
    #[arg(long = ARG_REMOVE, value_name = "place-id")]
    #[serde(default)]
    pub(crate) remove: Option<String>,
}

impl SavedArgs {
    pub(crate) fn into_config(self) -> Result<SavedConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SavedConfig::try_from(merged)
    }
}

/// What the `saved` command does after loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SavedAction {
    Show,
    Add { name: String },
    Remove { place_id: String },
}

/// Resolved `saved` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SavedConfig {
    pub(crate) connection: ConnectionConfig,
    pub(crate) action: SavedAction,
}

impl TryFrom<SavedArgs> for SavedConfig {
    type Error = CliError;

    fn try_from(args: SavedArgs) -> Result<Self, Self::Error> {
        let action = match (args.add, args.remove) {
            (Some(_), Some(_)) => {
                return Err(CliError::ConflictingArguments {
                    first: ARG_ADD,
                    second: ARG_REMOVE,
                });
            }
            (Some(name), None) => SavedAction::Add { name },
            (None, Some(place_id)) => SavedAction::Remove { place_id },
            (None, None) => SavedAction::Show,
        };
        let connection = ConnectionConfig::from_raw(
            RawConnection {
                trip: args.trip,
                backend_url: args.backend_url,
                places_url: args.places_url,
                credentials: args.credentials,
                maps_api_key: args.maps_api_key,
                anchor_lat: args.anchor_lat,
                anchor_lng: args.anchor_lng,
                timeout_secs: args.timeout_secs,
            },
            ENV_SAVED_TRIP,
        )?;
        Ok(Self { connection, action })
    }
}

/// JSON printed by the `saved` command.
#[derive(Debug, Serialize)]
struct SavedReport<'a> {
    trip: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<&'static str>,
    places: &'a [SavedPlace],
}

pub(crate) fn run_saved_with<SB: ServiceBuilder>(
    args: SavedArgs,
    builder: &SB,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_saved(config, builder, writer)
}

pub(crate) fn execute_saved<SB: ServiceBuilder>(
    config: SavedConfig,
    builder: &SB,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let SavedConfig { connection, action } = config;
    let services = connection.connect(builder)?;
    let resolver = services.resolver;
    let store = SavedPlacesStore::new(
        connection.trip.clone(),
        services.remote,
        Arc::clone(&resolver),
    );

    let outcome: Option<MutationOutcome> = block_on(async {
        store.load().await?;
        let outcome = match action {
            SavedAction::Show => None,
            SavedAction::Add { name } => {
                let place = resolver
                    .resolve_name(&name)
                    .await
                    .ok_or(CliError::PlaceNotFound { name })?;
                Some(store.add_place(&place).await?)
            }
            SavedAction::Remove { place_id } => Some(store.remove_place(&place_id).await?),
        };
        Ok::<_, CliError>(outcome)
    })??;

    let saved = store.saved();
    let report = SavedReport {
        trip: connection.trip.as_str(),
        outcome: outcome.map(outcome_label),
        places: saved.places(),
    };
    write_json(writer, &report)
}
