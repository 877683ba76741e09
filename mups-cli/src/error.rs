//! CLI error type.

use mups::config::ConfigError;
use mups::{FilenameError, InvalidVersion, MetadataError};
use thiserror::Error;

/// Errors reported by `mups` subcommands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration problem with a user-facing explanation.
    #[error("{0}")]
    Config(String),

    /// Input failed a validation command.
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    ConfigFile(#[from] ConfigError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Filename(#[from] FilenameError),

    #[error(transparent)]
    Version(#[from] InvalidVersion),

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}
