//! Error types for reconciliation.

use thiserror::Error;

/// Result type for reconciliation.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Errors that can occur while reconciling declared objects.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Schema parsing, digesting or validation failed.
    #[error(transparent)]
    Schema(#[from] schemahero_schema::SchemaError),

    /// PostgreSQL connector error.
    #[error(transparent)]
    Postgres(#[from] schemahero_postgres::PostgresError),

    /// MySQL connector error.
    #[error(transparent)]
    Mysql(#[from] schemahero_mysql::MysqlError),

    /// SQLite connector error.
    #[error(transparent)]
    Sqlite(#[from] schemahero_sqlite::SqliteError),

    /// RQLite connector error.
    #[error(transparent)]
    Rqlite(#[from] schemahero_rqlite::RqliteError),

    /// Cassandra connector error.
    #[error(transparent)]
    Cassandra(#[from] schemahero_cassandra::CassandraError),

    /// TimescaleDB planner error.
    #[error(transparent)]
    Timescale(#[from] schemahero_timescaledb::TimescaleError),

    /// A declared object failed validation before planning.
    #[error("validation error for '{object}': {message}")]
    Validation {
        /// Object identity.
        object: String,
        /// What failed.
        message: String,
    },

    /// The declared object references a database the reconciler does not
    /// know about.
    #[error("unknown database '{0}'")]
    UnknownDatabase(String),

    /// The object's engine branch does not match the connection's engine.
    #[error("object '{object}' declares engine {declared} but the database connection is {actual}")]
    EngineMismatch {
        /// Object identity.
        object: String,
        /// Engine of the populated schema branch.
        declared: String,
        /// Engine of the connection.
        actual: String,
    },

    /// An apply was requested for a Migration that does not exist.
    #[error("migration '{0}' not found")]
    MigrationNotFound(String),
}

impl ReconcileError {
    /// Build a validation error.
    pub fn validation(object: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            object: object.into(),
            message: message.into(),
        }
    }

    /// The statement that failed during an apply, when this error came
    /// out of a connector's deploy path.
    pub fn failing_statement(&self) -> Option<&str> {
        match self {
            Self::Postgres(schemahero_postgres::PostgresError::Execute { statement, .. })
            | Self::Mysql(schemahero_mysql::MysqlError::Execute { statement, .. })
            | Self::Sqlite(schemahero_sqlite::SqliteError::Execute { statement, .. })
            | Self::Rqlite(schemahero_rqlite::RqliteError::Execute { statement, .. })
            | Self::Cassandra(schemahero_cassandra::CassandraError::Execute {
                statement, ..
            }) => Some(statement),
            _ => None,
        }
    }
}
