//! HTTP client for the rqlite API.
//!
//! Statements go to `/db/execute` as one JSON batch with the
//! `transaction` flag, so composite plans (including table rebuilds)
//! apply atomically. Queries go to `/db/query`.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::error::{RqliteError, RqliteResult};

/// A connection to an rqlite cluster.
#[derive(Debug)]
pub struct RqliteConnection {
    client: Client,
    base: Url,
    user: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExecuteResponse {
    #[serde(default)]
    results: Vec<ExecuteResult>,
}

#[derive(Debug, Deserialize)]
struct ExecuteResult {
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<QueryResult>,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl RqliteConnection {
    /// Connect to the cluster at `uri` (`http(s)://user:pw@host:port`)
    /// and verify it responds.
    pub async fn connect(uri: &str) -> RqliteResult<Self> {
        let parsed = Url::parse(uri).map_err(|_| RqliteError::InvalidUri(uri.to_string()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(RqliteError::InvalidUri(uri.to_string()));
        }

        let user = (!parsed.username().is_empty()).then(|| parsed.username().to_string());
        let password = parsed.password().map(String::from);
        let mut base = parsed;
        // Credentials ride on each request, not the base URL.
        let _ = base.set_username("");
        let _ = base.set_password(None);

        let conn = Self {
            client: Client::new(),
            base,
            user,
            password,
        };

        let status = conn.endpoint("/status")?;
        let response = conn.request(status).send().await?;
        if !response.status().is_success() {
            return Err(RqliteError::Api(format!(
                "status endpoint returned {}",
                response.status()
            )));
        }
        debug!(base = %conn.base, "connected");
        Ok(conn)
    }

    fn endpoint(&self, path: &str) -> RqliteResult<Url> {
        self.base
            .join(path)
            .map_err(|_| RqliteError::InvalidUri(self.base.to_string()))
    }

    fn request(&self, url: Url) -> reqwest::RequestBuilder {
        let mut builder = self.client.get(url);
        if let Some(user) = &self.user {
            builder = builder.basic_auth(user, self.password.as_deref());
        }
        builder
    }

    fn post(&self, url: Url) -> reqwest::RequestBuilder {
        let mut builder = self.client.post(url);
        if let Some(user) = &self.user {
            builder = builder.basic_auth(user, self.password.as_deref());
        }
        builder
    }

    /// Run one query and return the raw value rows.
    pub async fn query(&self, sql: &str) -> RqliteResult<Vec<Vec<Value>>> {
        debug!(sql = %sql, "executing query");
        let url = self.endpoint("/db/query")?;
        let body = serde_json::json!([sql]);
        let response: QueryResponse = self
            .post(url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let result = response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| RqliteError::Api("empty query result".to_string()))?;
        if let Some(error) = result.error {
            return Err(RqliteError::Api(error));
        }
        Ok(result.values)
    }

    /// Execute planned statements as one transactional batch. Empty
    /// statements are skipped; the first reported failure surfaces the
    /// statement.
    pub async fn deploy_statements(&self, statements: &[String]) -> RqliteResult<()> {
        let batch: Vec<&String> = statements.iter().filter(|s| !s.is_empty()).collect();
        if batch.is_empty() {
            return Ok(());
        }
        for statement in &batch {
            info!(statement = %statement, "executing statement");
        }

        let mut url = self.endpoint("/db/execute")?;
        url.set_query(Some("transaction"));
        let response: ExecuteResponse = self
            .post(url)
            .json(&batch)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        for (result, statement) in response.results.iter().zip(&batch) {
            if let Some(error) = &result.error {
                return Err(RqliteError::Execute {
                    statement: (*statement).clone(),
                    message: error.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_non_http_schemes() {
        let err = RqliteConnection::connect("postgres://db/app").await.unwrap_err();
        assert!(matches!(err, RqliteError::InvalidUri(_)));
    }
}
