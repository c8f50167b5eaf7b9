//! The View resource.

use serde::{Deserialize, Serialize};

use crate::error::{SchemaError, SchemaResult};
use crate::Engine;

use super::postgres::PostgresViewSchema;
use super::timescaledb::TimescaleDBViewSchema;

/// Marker for an engine that has no view support. Declaring it records the
/// intent "this engine has no such object", which is distinguishable from
/// "not declared".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotImplementedViewSchema {}

/// A declared view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct View {
    /// Resource name.
    pub name: String,
    /// Resource namespace.
    #[serde(default)]
    pub namespace: String,
    /// User intent.
    pub spec: ViewSpec,
    /// Observed state.
    #[serde(default)]
    pub status: ViewStatus,
}

/// Spec of a declared view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewSpec {
    /// Logical database name.
    pub database: String,
    /// View name.
    pub name: String,
    /// Engine-keyed schema.
    pub schema: ViewSchema,
}

/// Status of a declared view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewStatus {
    /// Digest of the spec at last plan time.
    #[serde(
        rename = "lastPlannedSpecDigest",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_planned_spec_digest: Option<String>,
}

/// Engine-keyed view schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postgres: Option<PostgresViewSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timescaledb: Option<TimescaleDBViewSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mysql: Option<NotImplementedViewSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sqlite: Option<NotImplementedViewSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rqlite: Option<NotImplementedViewSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cassandra: Option<NotImplementedViewSchema>,
}

impl ViewSchema {
    /// Assert engine exclusivity and return the single populated engine.
    pub fn assert_exclusive(&self, view: &str) -> SchemaResult<Engine> {
        let mut engines = Vec::new();
        if self.postgres.is_some() {
            engines.push(Engine::Postgres);
        }
        if self.timescaledb.is_some() {
            engines.push(Engine::Timescaledb);
        }
        if self.mysql.is_some() {
            engines.push(Engine::Mysql);
        }
        if self.sqlite.is_some() {
            engines.push(Engine::Sqlite);
        }
        if self.rqlite.is_some() {
            engines.push(Engine::Rqlite);
        }
        if self.cassandra.is_some() {
            engines.push(Engine::Cassandra);
        }
        match engines.as_slice() {
            [engine] => Ok(*engine),
            _ => Err(SchemaError::EngineExclusivity(
                view.to_string(),
                engines.len(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_implemented_marker_is_distinguishable() {
        let yaml = "database: db\nname: v\nschema:\n  mysql: {}\n";
        let spec: ViewSpec = serde_yaml::from_str(yaml).unwrap();
        assert!(spec.schema.mysql.is_some());
        assert!(spec.schema.postgres.is_none());
        assert_eq!(spec.schema.assert_exclusive("v").unwrap(), Engine::Mysql);
    }
}
