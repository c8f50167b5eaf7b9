//! Error types for the PostgreSQL connector.

use thiserror::Error;

/// Result type alias for PostgreSQL operations.
pub type PostgresResult<T> = Result<T, PostgresError>;

/// Errors that can occur while connecting, introspecting or planning.
#[derive(Debug, Error)]
pub enum PostgresError {
    /// Driver error.
    #[error("Postgres error: {0}")]
    Driver(#[from] tokio_postgres::Error),

    /// Pool error.
    #[error("Pool error: {0}")]
    Pool(String),

    /// Connection URI could not be parsed.
    #[error("Invalid connection URI: {0}")]
    InvalidUri(String),

    /// A declared column failed validation.
    #[error("Unsupported type '{data_type}' for column '{column}'")]
    UnsupportedType {
        /// Column name.
        column: String,
        /// The type string that could not be normalized.
        data_type: String,
    },

    /// A declared object failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A statement failed during deploy.
    #[error("Statement failed: {statement}: {source}")]
    Execute {
        /// The failing statement.
        statement: String,
        /// The driver error.
        source: tokio_postgres::Error,
    },

    /// The operation needs a live connection but the handle is fixture-only.
    #[error("Operation requires a live connection")]
    FixtureOnly,
}

impl PostgresError {
    /// Create an unsupported-type error.
    pub fn unsupported_type(column: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self::UnsupportedType {
            column: column.into(),
            data_type: data_type.into(),
        }
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
