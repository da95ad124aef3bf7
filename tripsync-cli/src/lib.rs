//! Command-line interface for reconciling trip itineraries.
//!
//! Each subcommand loads its settings through `ortho_config` (CLI flags over
//! `TRIPSYNC_*` environment variables over configuration files), talks to the
//! trip backend through the reconciliation stores, and prints JSON to stdout.
#![forbid(unsafe_code)]

use std::future::Future;

use clap::{Parser, Subcommand};
use tripsync_reconcile::MutationOutcome;

mod connection;
mod error;
mod itinerary;
mod saved;
mod token;

pub use error::CliError;

use connection::HttpServices;
use itinerary::{ItineraryArgs, run_itinerary_with};
use saved::{SavedArgs, run_saved_with};
use token::{TokenArgs, run_token_with};

const ARG_TRIP: &str = "trip";
const ARG_BACKEND_URL: &str = "backend-url";
const ARG_PLACES_URL: &str = "places-url";
const ARG_CREDENTIALS: &str = "credentials";
const ARG_MAPS_API_KEY: &str = "maps-api-key";
const ARG_ANCHOR_LAT: &str = "anchor-lat";
const ARG_ANCHOR_LNG: &str = "anchor-lng";
const ARG_TIMEOUT_SECS: &str = "timeout-secs";
const ARG_ADD: &str = "add";
const ARG_SLOT: &str = "slot";
const ARG_REMOVE: &str = "remove";
const ARG_MOVE: &str = "move";
const ARG_SET: &str = "set";
const ARG_CLEAR: &str = "clear";
const ENV_ITINERARY_TRIP: &str = "TRIPSYNC_CMDS_ITINERARY_TRIP";
const ENV_ITINERARY_SLOT: &str = "TRIPSYNC_CMDS_ITINERARY_SLOT";
const ENV_SAVED_TRIP: &str = "TRIPSYNC_CMDS_SAVED_TRIP";
const ENV_TOKEN_SET: &str = "TRIPSYNC_CMDS_TOKEN_SET";

/// Run the tripsync CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments or configuration are invalid, when the
/// backend or credential file cannot be reached, or when output cannot be
/// written.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Command::Itinerary(args) => run_itinerary_with(args, &HttpServices, &mut stdout),
        Command::Saved(args) => run_saved_with(args, &HttpServices, &mut stdout),
        Command::Token(args) => run_token_with(args, &mut stdout),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "tripsync",
    about = "Keep a trip's itinerary and saved places in sync with the trip backend",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show or change the scheduled itinerary.
    Itinerary(ItineraryArgs),
    /// Show or change the saved places.
    Saved(SavedArgs),
    /// Store or clear the backend access token.
    Token(TokenArgs),
}

/// Drive `future` to completion on a current-thread runtime.
fn block_on<F: Future>(future: F) -> Result<F::Output, CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    Ok(runtime.block_on(future))
}

const fn outcome_label(outcome: MutationOutcome) -> &'static str {
    match outcome {
        MutationOutcome::Applied => "applied",
        MutationOutcome::Unchanged => "unchanged",
        MutationOutcome::Skipped => "skipped",
    }
}

fn write_json<T: serde::Serialize>(
    writer: &mut dyn std::io::Write,
    value: &T,
) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerializeOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
