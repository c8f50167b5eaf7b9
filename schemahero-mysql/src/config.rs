//! MySQL connection configuration.
//!
//! Accepts both `mysql://user:pw@host:port/db` URLs and Go-style DSNs
//! (`user:pw@tcp(host:port)/db`). Either form is rewritten to force
//! `multiStatements=true` so composite plans execute atomically.

use url::Url;

use crate::error::{MysqlError, MysqlResult};

/// Connection settings parsed from a URI or DSN.
#[derive(Debug, Clone)]
pub struct MysqlConfig {
    /// The connection string after the multiStatements rewrite.
    pub uri: String,
    /// Host name.
    pub host: String,
    /// Port (default 3306).
    pub port: u16,
    /// Database name.
    pub database: String,
    /// Username.
    pub user: String,
    /// Password.
    pub password: Option<String>,
}

impl MysqlConfig {
    /// Parse a connection string in either form.
    pub fn from_uri(uri: impl Into<String>) -> MysqlResult<Self> {
        let raw = uri.into();
        let rewritten = rewrite_uri(&raw);

        if raw.starts_with("mysql://") {
            return Self::from_url(&raw, rewritten);
        }
        Self::from_dsn(&raw, rewritten)
    }

    fn from_url(raw: &str, rewritten: String) -> MysqlResult<Self> {
        let parsed = Url::parse(raw).map_err(|_| MysqlError::InvalidUri(raw.to_string()))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| MysqlError::InvalidUri(raw.to_string()))?
            .to_string();
        let database = parsed.path().trim_start_matches('/').to_string();
        if database.is_empty() {
            return Err(MysqlError::InvalidUri(raw.to_string()));
        }
        Ok(Self {
            uri: rewritten,
            host,
            port: parsed.port().unwrap_or(3306),
            database,
            user: parsed.username().to_string(),
            password: parsed.password().map(String::from),
        })
    }

    /// Go-style DSN: `user:pw@tcp(host:port)/db[?params]`.
    fn from_dsn(raw: &str, rewritten: String) -> MysqlResult<Self> {
        let invalid = || MysqlError::InvalidUri(raw.to_string());

        let (credentials, rest) = raw.rsplit_once('@').ok_or_else(invalid)?;
        let (user, password) = match credentials.split_once(':') {
            Some((user, pw)) => (user.to_string(), Some(pw.to_string())),
            None => (credentials.to_string(), None),
        };

        let address = rest
            .strip_prefix("tcp(")
            .and_then(|r| r.split_once(')'))
            .ok_or_else(invalid)?;
        let (host, port) = match address.0.split_once(':') {
            Some((host, port)) => (
                host.to_string(),
                port.parse().map_err(|_| invalid())?,
            ),
            None => (address.0.to_string(), 3306),
        };

        let database = address
            .1
            .strip_prefix('/')
            .ok_or_else(invalid)?
            .split('?')
            .next()
            .unwrap_or_default()
            .to_string();
        if database.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            uri: rewritten,
            host,
            port,
            database,
            user,
            password,
        })
    }
}

/// Force `multiStatements=true` on the connection string, replacing an
/// existing value if present.
pub fn rewrite_uri(uri: &str) -> String {
    if let Some((base, query)) = uri.split_once('?') {
        let mut params: Vec<String> = query
            .split('&')
            .filter(|p| !p.starts_with("multiStatements="))
            .map(String::from)
            .collect();
        params.push("multiStatements=true".to_string());
        format!("{base}?{}", params.join("&"))
    } else {
        format!("{uri}?multiStatements=true")
    }
}
