//! MySQL connection wrapper.

use mysql_async::prelude::*;
use mysql_async::{Conn, Opts, OptsBuilder, Row};
use tracing::{debug, info};

use crate::config::MysqlConfig;
use crate::error::{MysqlError, MysqlResult};

/// A connection to a MySQL database.
pub struct MysqlConnection {
    config: MysqlConfig,
    conn: Option<Conn>,
    version: Option<String>,
}

impl MysqlConnection {
    /// Connect to the database and resolve the server version.
    pub async fn connect(uri: &str) -> MysqlResult<Self> {
        let config = MysqlConfig::from_uri(uri)?;

        let opts: Opts = OptsBuilder::default()
            .ip_or_hostname(config.host.clone())
            .tcp_port(config.port)
            .user(Some(config.user.clone()))
            .pass(config.password.clone())
            .db_name(Some(config.database.clone()))
            .into();
        let mut conn = Conn::new(opts).await?;

        let version: Option<String> = conn.query_first("select version()").await?;
        debug!(version = ?version, "connected");

        Ok(Self {
            config,
            conn: Some(conn),
            version,
        })
    }

    /// A handle that can plan DDL but not reach a database.
    pub fn fixture(database: &str) -> Self {
        Self {
            config: MysqlConfig {
                uri: String::new(),
                host: String::new(),
                port: 3306,
                database: database.to_string(),
                user: String::new(),
                password: None,
            },
            conn: None,
            version: None,
        }
    }

    /// The parsed connection settings.
    pub fn config(&self) -> &MysqlConfig {
        &self.config
    }

    /// The database name.
    pub fn database_name(&self) -> &str {
        &self.config.database
    }

    /// The server version. None for fixture handles.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn conn(&mut self) -> MysqlResult<&mut Conn> {
        self.conn.as_mut().ok_or(MysqlError::FixtureOnly)
    }

    pub(crate) async fn query_rows(
        &mut self,
        sql: &str,
        params: impl Into<mysql_async::Params> + Send,
    ) -> MysqlResult<Vec<Row>> {
        debug!(sql = %sql, "executing query");
        Ok(self.conn()?.exec(sql, params).await?)
    }

    /// Execute planned statements in order. Empty statements are skipped;
    /// the first failure halts deployment and surfaces the statement.
    pub async fn deploy_statements(&mut self, statements: &[String]) -> MysqlResult<()> {
        for statement in statements {
            if statement.is_empty() {
                continue;
            }
            info!(statement = %statement, "executing statement");
            let conn = self.conn()?;
            conn.query_drop(statement.as_str())
                .await
                .map_err(|source| MysqlError::Execute {
                    statement: statement.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Disconnect. Further calls behave like a fixture handle.
    pub async fn close(&mut self) -> MysqlResult<()> {
        if let Some(conn) = self.conn.take() {
            conn.disconnect().await?;
        }
        Ok(())
    }
}
