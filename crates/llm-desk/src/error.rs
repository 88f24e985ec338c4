//! Error types for the application layer.

use std::path::PathBuf;

use dispatcher::DispatchError;
use thiserror::Error;

/// Errors loading `config.json`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read, or defaults could not be written.
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON of the expected shape.
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors surfaced by the application.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Nothing to send.
    #[error("no prompt to send")]
    EmptyPrompt,

    /// The named prompt template is not configured.
    #[error("unknown prompt template: {0}")]
    UnknownPrompt(String),

    /// No history row with this id.
    #[error("history item not found: {0}")]
    NotFound(i64),
}
