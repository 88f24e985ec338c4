//! Error types for dispatch operations.

use thiserror::Error;

/// Errors reported synchronously by the dispatcher.
///
/// Provider failures are never surfaced here; they arrive as response text
/// inside a [`crate::ResultEnvelope`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The model key is not in the model table.
    #[error("unknown model: {0}")]
    UnknownModel(String),

    /// The dispatcher was created outside a tokio runtime.
    #[error("dispatcher requires a tokio runtime")]
    NoRuntime,
}

/// Result type for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;
