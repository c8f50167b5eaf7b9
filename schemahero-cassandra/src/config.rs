//! Cassandra connection configuration.

use crate::error::{CassandraError, CassandraResult};

/// Connection parameters for a Cassandra cluster.
#[derive(Debug, Clone)]
pub struct CassandraConfig {
    /// Contact points, `host` or `host:port`.
    pub hosts: Vec<String>,
    /// Username for password authentication.
    pub username: Option<String>,
    /// Password for password authentication.
    pub password: Option<String>,
    /// The keyspace all tables and types are planned against.
    pub keyspace: String,
}

impl CassandraConfig {
    /// Parse the `{host[:port],host[:port]}` contact-point list.
    ///
    /// The surrounding braces are optional.
    pub fn new(
        hosts: &str,
        username: Option<String>,
        password: Option<String>,
        keyspace: impl Into<String>,
    ) -> CassandraResult<Self> {
        let trimmed = hosts
            .trim()
            .trim_start_matches('{')
            .trim_end_matches('}');
        let hosts: Vec<String> = trimmed
            .split(',')
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(String::from)
            .collect();
        if hosts.is_empty() {
            return Err(CassandraError::Configuration(
                "no contact points provided".to_string(),
            ));
        }
        let keyspace = keyspace.into();
        if keyspace.is_empty() {
            return Err(CassandraError::Configuration(
                "no keyspace provided".to_string(),
            ));
        }
        Ok(Self {
            hosts,
            username,
            password,
            keyspace,
        })
    }
}
