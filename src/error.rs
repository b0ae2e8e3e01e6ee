//! Error types for gator.

use thiserror::Error;

/// Common error type for gator.
#[derive(Error, Debug)]
pub enum GatorError {
    /// Opaque database error from the sqlx backend.
    #[error("database error: {0}")]
    Database(String),

    /// Unique-constraint violation on insert.
    ///
    /// Callers that treat re-insertion as benign (post ingestion) match on
    /// this variant and carry on.
    #[error("duplicate key: {0}")]
    Duplicate(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// No user is logged in, or the logged-in user cannot be resolved.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Invalid user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Command invoked with the wrong arguments.
    #[error("usage: gator {0}")]
    Usage(&'static str),

    /// Command name not registered.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Feed fetch failure.
    #[error(transparent)]
    Fetch(#[from] crate::agg::FetchError),
}

// Conversion from sqlx errors. Unique violations stay distinguishable so
// idempotent inserts can swallow them.
impl From<sqlx::Error> for GatorError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return GatorError::Duplicate(db_err.to_string());
            }
        }
        GatorError::Database(e.to_string())
    }
}

/// Result type alias for gator operations.
pub type Result<T> = std::result::Result<T, GatorError>;
