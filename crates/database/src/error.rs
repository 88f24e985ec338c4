//! Database error types.

use thiserror::Error;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// The store was used after [`crate::HistoryStore::close`].
    #[error("history store is closed")]
    Closed,
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
