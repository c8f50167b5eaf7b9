//! Error types for the RQLite connector.

use thiserror::Error;

/// Result type alias for RQLite operations.
pub type RqliteResult<T> = Result<T, RqliteError>;

/// Errors that can occur while talking to an rqlite cluster.
#[derive(Debug, Error)]
pub enum RqliteError {
    /// HTTP transport error.
    #[error("rqlite request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection URI could not be parsed.
    #[error("Invalid connection URI: {0}")]
    InvalidUri(String),

    /// The API returned an unexpected payload.
    #[error("Unexpected rqlite response: {0}")]
    Api(String),

    /// Planning error from the shared SQLite planner.
    #[error(transparent)]
    Sqlite(#[from] schemahero_sqlite::SqliteError),

    /// A statement failed during deploy.
    #[error("Statement failed: {statement}: {message}")]
    Execute {
        /// The failing statement.
        statement: String,
        /// The error rqlite reported.
        message: String,
    },
}
