//! Error types for the SQLite connector.

use thiserror::Error;

/// Result type alias for SQLite operations.
pub type SqliteResult<T> = Result<T, SqliteError>;

/// Errors that can occur while connecting, introspecting or planning.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// Driver error.
    #[error("SQLite error: {0}")]
    Driver(#[from] tokio_rusqlite::Error),

    /// A declared column failed validation.
    #[error("Unsupported type '{data_type}' for column '{column}'")]
    UnsupportedType {
        /// Column name.
        column: String,
        /// The type string that failed the whitelist.
        data_type: String,
    },

    /// A declared object failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A digest over the declared schema could not be computed.
    #[error(transparent)]
    Schema(#[from] schemahero_schema::SchemaError),

    /// A statement failed during deploy.
    #[error("Statement failed: {statement}: {source}")]
    Execute {
        /// The failing statement.
        statement: String,
        /// The driver error.
        source: tokio_rusqlite::Error,
    },
}

impl SqliteError {
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
