//! Error types for TimescaleDB operations.

use thiserror::Error;

/// Result type for TimescaleDB operations.
pub type TimescaleResult<T> = Result<T, TimescaleError>;

/// Errors that can occur while planning or introspecting TimescaleDB.
#[derive(Error, Debug)]
pub enum TimescaleError {
    /// An error from the underlying PostgreSQL connector.
    #[error(transparent)]
    Postgres(#[from] schemahero_postgres::error::PostgresError),

    /// The hypertable declaration failed validation.
    #[error("timescaledb validation error: {0}")]
    Validation(String),
}

impl TimescaleError {
    /// Build a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
