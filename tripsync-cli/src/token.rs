//! `token` command implementation.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use tripsync_core::{AuthToken, CredentialStore};
use tripsync_data::FileCredentials;

use crate::connection::DEFAULT_CREDENTIALS_PATH;
use crate::{ARG_CLEAR, ARG_CREDENTIALS, ARG_SET, CliError, ENV_TOKEN_SET, write_json};

/// CLI arguments for the `token` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Store or clear the bearer token sent to the trip backend. \
                 Without --set or --clear, report whether a token is stored.",
    about = "Manage the backend access token"
)]
#[ortho_config(prefix = "TRIPSYNC")]
pub(crate) struct TokenArgs {
    /// Path to the credential file.
    #[arg(long = ARG_CREDENTIALS, value_name = "path")]
    #[serde(default)]
    pub(crate) credentials: Option<Utf8PathBuf>,
    /// Token to store.
    #[arg(long = ARG_SET, value_name = "token")]
    #[serde(default)]
    pub(crate) set: Option<String>,
    /// Remove the stored token.
    #[arg(long = ARG_CLEAR)]
    #[serde(default)]
    pub(crate) clear: bool,
}

/// What the `token` command does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenAction {
    Status,
    Set(AuthToken),
    Clear,
}

/// Resolved `token` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TokenConfig {
    pub(crate) credentials: Utf8PathBuf,
    pub(crate) action: TokenAction,
}

impl TryFrom<TokenArgs> for TokenConfig {
    type Error = CliError;

    fn try_from(args: TokenArgs) -> Result<Self, Self::Error> {
        let action = match (args.set, args.clear) {
            (Some(_), true) => {
                return Err(CliError::ConflictingArguments {
                    first: ARG_SET,
                    second: ARG_CLEAR,
                });
            }
            (Some(raw), false) => {
                TokenAction::Set(AuthToken::new(raw).ok_or(CliError::MissingArgument {
                    field: ARG_SET,
                    env: ENV_TOKEN_SET,
                })?)
            }
            (None, true) => TokenAction::Clear,
            (None, false) => TokenAction::Status,
        };
        Ok(Self {
            credentials: args
                .credentials
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_CREDENTIALS_PATH)),
            action,
        })
    }
}

/// JSON printed by the `token` command.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenReport<'a> {
    credentials: &'a str,
    signed_in: bool,
}

pub(crate) fn run_token_with(args: TokenArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    execute_token(&TokenConfig::try_from(merged)?, writer)
}

pub(crate) fn execute_token(config: &TokenConfig, writer: &mut dyn Write) -> Result<(), CliError> {
    let store = FileCredentials::new(config.credentials.clone());
    match &config.action {
        TokenAction::Status => {}
        TokenAction::Set(token) => {
            store.set_token(token)?;
            log::info!("stored access token in {}", config.credentials);
        }
        TokenAction::Clear => {
            store.clear()?;
            log::info!("cleared access token in {}", config.credentials);
        }
    }
    let report = TokenReport {
        credentials: config.credentials.as_str(),
        signed_in: store.token()?.is_some(),
    };
    write_json(writer, &report)
}
