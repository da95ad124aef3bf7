//! `itinerary` command implementation.

use std::io::Write;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use tripsync_core::{DestinationId, Entry, Itinerary, Slot};
use tripsync_reconcile::{ItineraryStore, MutationOutcome};

use crate::connection::{ConnectionConfig, RawConnection, ServiceBuilder};
use crate::{
    ARG_ADD, ARG_ANCHOR_LAT, ARG_ANCHOR_LNG, ARG_BACKEND_URL, ARG_CREDENTIALS, ARG_MAPS_API_KEY,
    ARG_MOVE, ARG_PLACES_URL, ARG_REMOVE, ARG_SLOT, ARG_TIMEOUT_SECS, ARG_TRIP, CliError,
    ENV_ITINERARY_SLOT, ENV_ITINERARY_TRIP, block_on, outcome_label, write_json,
};

/// CLI arguments for the `itinerary` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Load a trip's scheduled destinations from the backend and \
                 print them grouped by time slot. With --add, --remove or \
                 --move the change is sent to the backend first and the \
                 itinerary is reloaded before printing.",
    about = "Show or change a trip's itinerary"
)]
#[ortho_config(prefix = "TRIPSYNC")]
pub(crate) struct ItineraryArgs {
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
    /// Place name to schedule at --slot.
    #[arg(long = ARG_ADD, value_name = "name")]
    #[serde(default)]
    pub(crate) add: Option<String>,
    /// Target slot as HH:MM.
    #[arg(long = ARG_SLOT, value_name = "HH:MM")]
    #[serde(default)]
    pub(crate) slot: Option<String>,
    /// Destination to remove.
    #[arg(long = ARG_REMOVE, value_name = "id")]
    #[serde(default)]
    pub(crate) remove: Option<DestinationId>,
    /// Destination to move to --slot.
    #[arg(long = ARG_MOVE, value_name = "id")]
    #[serde(default)]
    pub(crate) move_to: Option<DestinationId>,
}

impl ItineraryArgs {
    pub(crate) fn into_config(self) -> Result<ItineraryConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ItineraryConfig::try_from(merged)
    }
}

/// What the `itinerary` command does after loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ItineraryAction {
    Show,
    Add { name: String, slot: Slot },
    Remove { destination_id: DestinationId, slot: Option<Slot> },
    Move { destination_id: DestinationId, slot: Slot },
}

/// Resolved `itinerary` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ItineraryConfig {
    pub(crate) connection: ConnectionConfig,
    pub(crate) action: ItineraryAction,
}

pub(crate) fn parse_slot(value: &str) -> Result<Slot, CliError> {
    value.trim().parse().map_err(|source| CliError::InvalidSlot {
        value: value.to_owned(),
        source,
    })
}

fn require_slot(slot: Option<Slot>) -> Result<Slot, CliError> {
    slot.ok_or(CliError::MissingArgument {
        field: ARG_SLOT,
        env: ENV_ITINERARY_SLOT,
    })
}

impl TryFrom<ItineraryArgs> for ItineraryConfig {
    type Error = CliError;

    fn try_from(args: ItineraryArgs) -> Result<Self, Self::Error> {
        let requested: Vec<&'static str> = [
            args.add.as_ref().map(|_| ARG_ADD),
            args.remove.map(|_| ARG_REMOVE),
            args.move_to.map(|_| ARG_MOVE),
        ]
        .into_iter()
        .flatten()
        .collect();
        if let [first, second, ..] = requested.as_slice() {
            return Err(CliError::ConflictingArguments {
                first: *first,
                second: *second,
            });
        }

        let slot = args.slot.as_deref().map(parse_slot).transpose()?;
        let action = match (args.add, args.remove, args.move_to) {
            (Some(name), _, _) => ItineraryAction::Add {
                name,
                slot: require_slot(slot)?,
            },
            (_, Some(destination_id), _) => ItineraryAction::Remove {
                destination_id,
                slot,
            },
            (_, _, Some(destination_id)) => ItineraryAction::Move {
                destination_id,
                slot: require_slot(slot)?,
            },
            (None, None, None) => ItineraryAction::Show,
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
            ENV_ITINERARY_TRIP,
        )?;
        Ok(Self { connection, action })
    }
}

/// One slot's worth of entries.
#[derive(Debug, Serialize)]
struct SlotGroup<'a> {
    slot: Slot,
    entries: Vec<&'a Entry>,
}

/// JSON printed by the `itinerary` command.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ItineraryReport<'a> {
    trip: &'a str,
    name: &'a str,
    start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<&'static str>,
    slots: Vec<SlotGroup<'a>>,
    unresolved: Vec<DestinationId>,
    directions_url: Option<String>,
}

impl<'a> ItineraryReport<'a> {
    fn new(trip: &'a str, itinerary: &'a Itinerary, outcome: Option<MutationOutcome>) -> Self {
        Self {
            trip,
            name: &itinerary.summary().name,
            start: itinerary.summary().start.map(|start| start.to_string()),
            outcome: outcome.map(outcome_label),
            slots: itinerary
                .by_slot()
                .into_iter()
                .map(|(slot, entries)| SlotGroup { slot, entries })
                .collect(),
            unresolved: itinerary.unresolved().iter().map(|(id, _)| *id).collect(),
            directions_url: itinerary.directions_url().map(String::from),
        }
    }
}

pub(crate) fn run_itinerary_with<SB: ServiceBuilder>(
    args: ItineraryArgs,
    builder: &SB,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_itinerary(config, builder, writer)
}

pub(crate) fn execute_itinerary<SB: ServiceBuilder>(
    config: ItineraryConfig,
    builder: &SB,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let ItineraryConfig { connection, action } = config;
    let services = connection.connect(builder)?;
    let resolver = services.resolver;
    let store = ItineraryStore::new(
        connection.trip.clone(),
        services.remote,
        Arc::clone(&resolver),
    );

    let outcome = block_on(async {
        store.load().await?;
        let outcome = match action {
            ItineraryAction::Show => None,
            ItineraryAction::Add { name, slot } => {
                let place = resolver
                    .resolve_name(&name)
                    .await
                    .ok_or(CliError::PlaceNotFound { name })?;
                Some(store.add(&place, slot).await?)
            }
            ItineraryAction::Remove {
                destination_id,
                slot,
            } => {
                let slot = slot.or_else(|| store.itinerary().slot_of(destination_id));
                Some(store.remove(destination_id, slot).await?)
            }
            ItineraryAction::Move {
                destination_id,
                slot,
            } => Some(store.reschedule(destination_id, slot).await?),
        };
        Ok::<_, CliError>(outcome)
    })??;

    let itinerary = store.itinerary();
    let report = ItineraryReport::new(connection.trip.as_str(), &itinerary, outcome);
    write_json(writer, &report)
}

#[cfg(test)]
pub(crate) fn itinerary_config_from_layers(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ItineraryConfig, CliError> {
    let merged = ItineraryArgs::merge_from_layers(layers).map_err(CliError::from)?;
    ItineraryConfig::try_from(merged)
}
