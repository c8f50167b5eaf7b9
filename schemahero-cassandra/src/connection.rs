//! Cassandra session management.

use scylla::{Session, SessionBuilder};
use tracing::info;

use crate::config::CassandraConfig;
use crate::error::{CassandraError, CassandraResult};

/// An open session against a Cassandra cluster, scoped to one keyspace.
pub struct CassandraConnection {
    config: CassandraConfig,
    session: Session,
}

impl CassandraConnection {
    /// Connect to the cluster described by `config`.
    pub async fn connect(config: CassandraConfig) -> CassandraResult<Self> {
        let mut builder = SessionBuilder::new().known_nodes(&config.hosts);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.user(username, password);
        }
        let session = builder.build().await?;
        Ok(Self { config, session })
    }

    /// The keyspace this connection plans against.
    pub fn keyspace(&self) -> &str {
        &self.config.keyspace
    }

    pub(crate) fn session(&self) -> &Session {
        &self.session
    }

    /// Execute a list of planned statements in order.
    ///
    /// Execution halts at the first failing statement; the error carries
    /// the statement so the caller can record it.
    pub async fn deploy_statements(&self, statements: &[String]) -> CassandraResult<()> {
        for statement in statements {
            if statement.is_empty() {
                continue;
            }
            info!(statement = %statement, "executing statement");
            self.session
                .query_unpaged(statement.as_str(), &[])
                .await
                .map_err(|source| CassandraError::Execute {
                    statement: statement.clone(),
                    source,
                })?;
        }
        Ok(())
    }
}
