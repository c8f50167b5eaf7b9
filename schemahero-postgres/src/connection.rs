//! PostgreSQL connection wrapper.
//!
//! Wraps a deadpool pool and the handful of operations the reconciler
//! needs: introspection queries, statement deployment and version
//! detection. A fixture-only handle plans DDL without a live database.

use std::str::FromStr;

use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::{NoTls, Row};
use tracing::{debug, info};

use crate::config::PostgresConfig;
use crate::error::{PostgresError, PostgresResult};

/// A connection to a PostgreSQL or CockroachDB database.
pub struct PostgresConnection {
    config: PostgresConfig,
    pool: Option<Pool>,
    version: Option<String>,
    is_cockroach: bool,
}

impl PostgresConnection {
    /// Connect to the database at `uri` and resolve the server version.
    pub async fn connect(uri: &str) -> PostgresResult<Self> {
        let config = PostgresConfig::from_uri(uri)?;

        let pg_config = tokio_postgres::Config::from_str(uri)
            .map_err(|_| PostgresError::InvalidUri(uri.to_string()))?;
        let manager = Manager::from_config(
            pg_config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );
        // One connection per in-flight plan/apply.
        let pool = Pool::builder(manager)
            .max_size(1)
            .build()
            .map_err(|e| PostgresError::Pool(e.to_string()))?;

        let mut conn = Self {
            config,
            pool: Some(pool),
            version: None,
            is_cockroach: false,
        };

        let banner: String = conn.query_one("select version()", &[]).await?.get(0);
        conn.is_cockroach = banner.contains("CockroachDB");
        conn.version = Some(parse_server_version(&banner));
        debug!(version = ?conn.version, cockroach = conn.is_cockroach, "connected");

        Ok(conn)
    }

    /// A handle that can plan DDL but not reach a database. Used when
    /// generating migrations against fixtures.
    pub fn fixture(database: &str) -> Self {
        Self {
            config: PostgresConfig {
                uri: String::new(),
                host: String::new(),
                port: 5432,
                database: database.to_string(),
                user: String::new(),
                password: None,
                schemas: vec!["public".to_string()],
            },
            pool: None,
            version: None,
            is_cockroach: false,
        }
    }

    /// The parsed connection settings.
    pub fn config(&self) -> &PostgresConfig {
        &self.config
    }

    /// The database name.
    pub fn database_name(&self) -> &str {
        &self.config.database
    }

    /// The server version, e.g. `14.11`. None for fixture handles.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Whether the server identified itself as CockroachDB.
    pub fn is_cockroach(&self) -> bool {
        self.is_cockroach
    }

    fn pool(&self) -> PostgresResult<&Pool> {
        self.pool.as_ref().ok_or(PostgresError::FixtureOnly)
    }

    /// Run a parameterized catalog query.
    pub async fn query(
        &self,
        sql: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> PostgresResult<Vec<Row>> {
        debug!(sql = %sql, "executing query");
        let client = self
            .pool()?
            .get()
            .await
            .map_err(|e| PostgresError::Pool(e.to_string()))?;
        Ok(client.query(sql, params).await?)
    }

    pub(crate) async fn query_one(
        &self,
        sql: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> PostgresResult<Row> {
        debug!(sql = %sql, "executing query_one");
        let client = self
            .pool()?
            .get()
            .await
            .map_err(|e| PostgresError::Pool(e.to_string()))?;
        Ok(client.query_one(sql, params).await?)
    }

    /// Execute planned statements in order. Empty statements are skipped;
    /// the first failure halts deployment and surfaces the failing
    /// statement.
    pub async fn deploy_statements(&self, statements: &[String]) -> PostgresResult<()> {
        let client = self
            .pool()?
            .get()
            .await
            .map_err(|e| PostgresError::Pool(e.to_string()))?;

        for statement in statements {
            if statement.is_empty() {
                continue;
            }
            info!(statement = %statement, "executing statement");
            client
                .batch_execute(statement)
                .await
                .map_err(|source| PostgresError::Execute {
                    statement: statement.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Close the pool. Further calls behave like a fixture handle.
    pub fn close(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.close();
        }
    }
}

fn parse_server_version(banner: &str) -> String {
    // "PostgreSQL 14.11 on x86_64..." or "CockroachDB CCL v23.1.10 ..."
    let token = if banner.starts_with("CockroachDB") {
        banner
            .split_whitespace()
            .find(|t| t.len() > 1 && t.starts_with('v') && t.as_bytes()[1].is_ascii_digit())
    } else {
        banner.split_whitespace().nth(1)
    };
    token.unwrap_or(banner).trim_start_matches('v').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_server_version() {
        assert_eq!(
            parse_server_version("PostgreSQL 14.11 on x86_64-pc-linux-gnu"),
            "14.11"
        );
        assert_eq!(
            parse_server_version("CockroachDB CCL v23.1.10 (x86_64-linux-gnu)"),
            "23.1.10"
        );
    }

    #[tokio::test]
    async fn test_fixture_handle_rejects_execution() {
        let conn = PostgresConnection::fixture("db");
        let err = conn
            .deploy_statements(&["select 1".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, PostgresError::FixtureOnly));
    }
}
