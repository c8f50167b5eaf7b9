//! Error types for Cassandra operations.

use thiserror::Error;

/// Result type for Cassandra operations.
pub type CassandraResult<T> = Result<T, CassandraError>;

/// Errors that can occur while introspecting or planning against Cassandra.
#[derive(Error, Debug)]
pub enum CassandraError {
    /// The connection string or keyspace configuration was invalid.
    #[error("invalid cassandra configuration: {0}")]
    Configuration(String),

    /// Establishing the session failed.
    #[error("cassandra connection error: {0}")]
    Connection(#[from] scylla::transport::errors::NewSessionError),

    /// A query against the cluster failed.
    #[error("cassandra query error: {0}")]
    Query(#[from] scylla::transport::errors::QueryError),

    /// Decoding rows returned by the cluster failed.
    #[error("cassandra row decode error: {0}")]
    Decode(String),

    /// A declared column used a type the planner does not accept.
    #[error("unsupported cassandra type for column {column}: {data_type}")]
    UnsupportedType {
        /// The column carrying the type.
        column: String,
        /// The rejected type expression.
        data_type: String,
    },

    /// The declared schema failed validation before planning.
    #[error("cassandra validation error: {0}")]
    Validation(String),

    /// The requested change has no supported migration path.
    ///
    /// Altering a column to an incompatible type would require a table
    /// rebuild, which is not implemented for Cassandra. The marker is
    /// surfaced verbatim so the caller can redesign the change.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// A statement failed during deploy.
    #[error("failed to execute statement {statement:?}: {source}")]
    Execute {
        /// The statement that failed.
        statement: String,
        /// The underlying driver error.
        source: scylla::transport::errors::QueryError,
    },
}

impl CassandraError {
    /// Build an unsupported-type error.
    pub fn unsupported_type(column: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self::UnsupportedType {
            column: column.into(),
            data_type: data_type.into(),
        }
    }

    /// Build a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a not-implemented marker error.
    pub fn not_implemented(msg: impl Into<String>) -> Self {
        Self::NotImplemented(msg.into())
    }
}
