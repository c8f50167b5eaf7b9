//! SQLite connection wrapper.

use tokio_rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{SqliteError, SqliteResult};

/// A connection to a SQLite database file.
pub struct SqliteConnection {
    conn: Connection,
    path: String,
}

impl SqliteConnection {
    /// Open (or create) the database at `path`.
    pub async fn open(path: &str) -> SqliteResult<Self> {
        let conn = Connection::open(path).await?;
        debug!(path = %path, "opened database");
        Ok(Self {
            conn,
            path: path.to_string(),
        })
    }

    /// The database file path.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn inner(&self) -> &Connection {
        &self.conn
    }

    /// Execute planned statements in order. Empty statements are skipped;
    /// the first failure halts deployment and surfaces the statement.
    pub async fn deploy_statements(&self, statements: &[String]) -> SqliteResult<()> {
        for statement in statements {
            if statement.is_empty() {
                continue;
            }
            info!(statement = %statement, "executing statement");
            let sql = statement.clone();
            self.conn
                .call(move |conn| {
                    conn.execute_batch(&sql)?;
                    Ok(())
                })
                .await
                .map_err(|source| SqliteError::Execute {
                    statement: statement.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Close the connection.
    pub async fn close(self) -> SqliteResult<()> {
        self.conn.close().await?;
        Ok(())
    }
}
