//! Error types for the MySQL connector.

use thiserror::Error;

/// Result type alias for MySQL operations.
pub type MysqlResult<T> = Result<T, MysqlError>;

/// Errors that can occur while connecting, introspecting or planning.
#[derive(Debug, Error)]
pub enum MysqlError {
    /// Driver error.
    #[error("MySQL error: {0}")]
    Driver(#[from] mysql_async::Error),

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
        source: mysql_async::Error,
    },

    /// The operation needs a live connection but the handle is fixture-only.
    #[error("Operation requires a live connection")]
    FixtureOnly,
}

impl MysqlError {
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
