//! Database bindings and engine-polymorphic connections.
//!
//! A declared object names a logical database; the reconciler resolves
//! that name to a [`Database`] binding and opens one engine connection
//! for the duration of a single plan or apply.

use schemahero_cassandra::{CassandraConfig, CassandraConnection};
use schemahero_mysql::MysqlConnection;
use schemahero_postgres::PostgresConnection;
use schemahero_rqlite::RqliteConnection;
use schemahero_schema::Engine;
use schemahero_sqlite::SqliteConnection;

use crate::error::{ReconcileError, ReconcileResult};

/// How to reach one logical database.
#[derive(Debug, Clone)]
pub enum ConnectionInfo {
    /// A connection URI (Postgres, CockroachDB, TimescaleDB, MySQL,
    /// RQLite) or a filesystem path (SQLite).
    Uri(String),
    /// Cassandra contact points plus credentials and keyspace.
    Cassandra {
        /// `{host[:port],host[:port]}` contact-point list.
        hosts: String,
        /// Username for password authentication.
        username: Option<String>,
        /// Password for password authentication.
        password: Option<String>,
        /// The keyspace to plan against.
        keyspace: String,
    },
}

/// A binding from a logical database name to a live engine.
#[derive(Debug, Clone)]
pub struct Database {
    /// Logical name referenced by declared objects.
    pub name: String,
    /// Which engine this database runs.
    pub engine: Engine,
    /// How to connect.
    pub connection: ConnectionInfo,
}

impl Database {
    fn uri(&self) -> ReconcileResult<&str> {
        match &self.connection {
            ConnectionInfo::Uri(uri) => Ok(uri),
            ConnectionInfo::Cassandra { .. } => Err(ReconcileError::validation(
                &self.name,
                format!("driver {} expects a connection uri", self.engine.driver()),
            )),
        }
    }

    /// Open a connection appropriate for this database's engine.
    pub async fn connect(&self) -> ReconcileResult<SchemaConnection> {
        let connection = match self.engine {
            Engine::Postgres | Engine::Cockroachdb => {
                SchemaConnection::Postgres(PostgresConnection::connect(self.uri()?).await?)
            }
            Engine::Timescaledb => {
                SchemaConnection::Timescaledb(PostgresConnection::connect(self.uri()?).await?)
            }
            Engine::Mysql => {
                SchemaConnection::Mysql(MysqlConnection::connect(self.uri()?).await?)
            }
            Engine::Sqlite => {
                SchemaConnection::Sqlite(SqliteConnection::open(self.uri()?).await?)
            }
            Engine::Rqlite => {
                SchemaConnection::Rqlite(RqliteConnection::connect(self.uri()?).await?)
            }
            Engine::Cassandra => {
                let ConnectionInfo::Cassandra {
                    hosts,
                    username,
                    password,
                    keyspace,
                } = &self.connection
                else {
                    return Err(ReconcileError::validation(
                        &self.name,
                        "cassandra requires contact points and a keyspace",
                    ));
                };
                let config = CassandraConfig::new(
                    hosts,
                    username.clone(),
                    password.clone(),
                    keyspace.clone(),
                )?;
                SchemaConnection::Cassandra(CassandraConnection::connect(config).await?)
            }
        };
        Ok(connection)
    }
}

/// One open engine connection.
///
/// Carried for the duration of a single plan or apply; the reconciler
/// never pools connections across reconciliations.
pub enum SchemaConnection {
    Postgres(PostgresConnection),
    Timescaledb(PostgresConnection),
    Mysql(MysqlConnection),
    Sqlite(SqliteConnection),
    Rqlite(RqliteConnection),
    Cassandra(CassandraConnection),
}

impl SchemaConnection {
    /// The engine behind this connection.
    pub fn engine(&self) -> Engine {
        match self {
            Self::Postgres(_) => Engine::Postgres,
            Self::Timescaledb(_) => Engine::Timescaledb,
            Self::Mysql(_) => Engine::Mysql,
            Self::Sqlite(_) => Engine::Sqlite,
            Self::Rqlite(_) => Engine::Rqlite,
            Self::Cassandra(_) => Engine::Cassandra,
        }
    }

    /// Execute planned statements in order, halting at the first failure.
    pub async fn deploy_statements(&mut self, statements: &[String]) -> ReconcileResult<()> {
        match self {
            Self::Postgres(conn) | Self::Timescaledb(conn) => {
                conn.deploy_statements(statements).await?
            }
            Self::Mysql(conn) => conn.deploy_statements(statements).await?,
            Self::Sqlite(conn) => conn.deploy_statements(statements).await?,
            Self::Rqlite(conn) => conn.deploy_statements(statements).await?,
            Self::Cassandra(conn) => conn.deploy_statements(statements).await?,
        }
        Ok(())
    }

    /// Release the connection.
    pub async fn close(self) -> ReconcileResult<()> {
        match self {
            Self::Postgres(mut conn) | Self::Timescaledb(mut conn) => conn.close(),
            Self::Mysql(mut conn) => conn.close().await?,
            Self::Sqlite(conn) => conn.close().await?,
            Self::Rqlite(_) | Self::Cassandra(_) => {}
        }
        Ok(())
    }
}
