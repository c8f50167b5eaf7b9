//! PostgreSQL connection configuration.

use url::Url;

use crate::error::{PostgresError, PostgresResult};

/// Connection settings parsed from a database URI.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// The original connection URI.
    pub uri: String,
    /// Host name.
    pub host: String,
    /// Port (default 5432, 26257 for CockroachDB URIs that say so).
    pub port: u16,
    /// Database name.
    pub database: String,
    /// Username.
    pub user: String,
    /// Password.
    pub password: Option<String>,
    /// Schemas to introspect, in precedence order. Defaults to `public`.
    pub schemas: Vec<String>,
}

impl PostgresConfig {
    /// Parse a `postgres://` or `postgresql://` URI.
    ///
    /// The schema search list is taken from the first query parameter
    /// present, in this order: `schema`, `currentSchema`, `search_path`,
    /// `schemas`. Comma-separated values become a list.
    pub fn from_uri(uri: impl Into<String>) -> PostgresResult<Self> {
        let uri = uri.into();
        let parsed = Url::parse(&uri).map_err(|_| PostgresError::InvalidUri(uri.clone()))?;

        if parsed.scheme() != "postgresql" && parsed.scheme() != "postgres" {
            return Err(PostgresError::InvalidUri(uri));
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| PostgresError::InvalidUri(uri.clone()))?
            .to_string();
        let port = parsed.port().unwrap_or(5432);

        let database = parsed.path().trim_start_matches('/').to_string();
        if database.is_empty() {
            return Err(PostgresError::InvalidUri(uri));
        }

        let user = if parsed.username().is_empty() {
            "postgres".to_string()
        } else {
            parsed.username().to_string()
        };
        let password = parsed.password().map(String::from);

        let schemas = schema_search_list(&parsed);

        Ok(Self {
            uri,
            host,
            port,
            database,
            user,
            password,
            schemas,
        })
    }
}

fn schema_search_list(url: &Url) -> Vec<String> {
    for key in ["schema", "currentSchema", "search_path", "schemas"] {
        if let Some((_, value)) = url.query_pairs().find(|(k, _)| k == key) {
            let schemas: Vec<String> = value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !schemas.is_empty() {
                return schemas;
            }
        }
    }
    vec!["public".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_uri_defaults() {
        let config = PostgresConfig::from_uri("postgres://app:secret@db:5433/orders").unwrap();
        assert_eq!(config.host, "db");
        assert_eq!(config.port, 5433);
        assert_eq!(config.database, "orders");
        assert_eq!(config.user, "app");
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert_eq!(config.schemas, vec!["public".to_string()]);
    }

    #[test]
    fn test_schema_param_precedence() {
        let config = PostgresConfig::from_uri(
            "postgresql://db/app?search_path=a,b&schema=tenant",
        )
        .unwrap();
        assert_eq!(config.schemas, vec!["tenant".to_string()]);

        let config =
            PostgresConfig::from_uri("postgresql://db/app?search_path=a, b").unwrap();
        assert_eq!(config.schemas, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert!(PostgresConfig::from_uri("mysql://db/app").is_err());
        assert!(PostgresConfig::from_uri("postgres://host").is_err());
    }
}
