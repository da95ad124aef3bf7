//! Error types emitted by the tripsync CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use thiserror::Error;
use tripsync_core::{CredentialError, SlotError};
use tripsync_data::ProviderBuildError;
use tripsync_reconcile::SyncError;

/// Errors emitted by the tripsync CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// Two mutually exclusive actions were requested.
    #[error("--{first} cannot be combined with --{second}")]
    ConflictingArguments {
        /// First action flag.
        first: &'static str,
        /// Second action flag.
        second: &'static str,
    },
    /// A slot argument is not a valid `HH:MM` time.
    #[error("invalid slot {value:?}: {source}")]
    InvalidSlot {
        /// Raw argument.
        value: String,
        /// Parse failure.
        #[source]
        source: SlotError,
    },
    /// The search anchor is outside valid coordinate ranges.
    #[error("invalid anchor ({lat}, {lng}): latitude must be within ±90 and longitude within ±180")]
    InvalidAnchor {
        /// Latitude.
        lat: f64,
        /// Longitude.
        lng: f64,
    },
    /// Constructing the trip backend failed.
    #[error("failed to build trip backend for {url:?}: {source}")]
    BuildBackend {
        /// Configured base URL.
        url: String,
        /// Construction failure.
        #[source]
        source: ProviderBuildError,
    },
    /// Constructing the place search provider failed.
    #[error("failed to build place search for {url:?}: {source}")]
    BuildSearch {
        /// Configured endpoint.
        url: String,
        /// Construction failure.
        #[source]
        source: ProviderBuildError,
    },
    /// A place name did not resolve to a search result.
    #[error("no place found for {name:?}")]
    PlaceNotFound {
        /// Requested name.
        name: String,
    },
    /// Reading or writing the credential file failed.
    #[error(transparent)]
    Credentials(#[from] CredentialError),
    /// A store operation failed.
    #[error(transparent)]
    Sync(#[from] SyncError),
    /// Starting the async runtime failed.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// Serializing command output failed.
    #[error("failed to serialize output: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
