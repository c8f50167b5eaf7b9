//! The Function resource.

use serde::{Deserialize, Serialize};

use crate::error::{SchemaError, SchemaResult};
use crate::Engine;

use super::postgres::PostgresFunctionSchema;

/// Marker for an engine without stored function support.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotImplementedFunctionSchema {}

/// A declared function.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Function {
    /// Resource name.
    pub name: String,
    /// Resource namespace.
    #[serde(default)]
    pub namespace: String,
    /// User intent.
    pub spec: FunctionSpec,
    /// Observed state.
    #[serde(default)]
    pub status: FunctionStatus,
}

/// Spec of a declared function.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionSpec {
    /// Logical database name.
    pub database: String,
    /// Function name.
    pub name: String,
    /// Engine-keyed schema.
    pub schema: FunctionSchema,
}

/// Status of a declared function.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionStatus {
    #[serde(
        rename = "lastPlannedSpecDigest",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_planned_spec_digest: Option<String>,
}

/// Engine-keyed function schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postgres: Option<PostgresFunctionSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timescaledb: Option<PostgresFunctionSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mysql: Option<NotImplementedFunctionSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sqlite: Option<NotImplementedFunctionSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rqlite: Option<NotImplementedFunctionSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cassandra: Option<NotImplementedFunctionSchema>,
}

impl FunctionSchema {
    /// Assert engine exclusivity and return the single populated engine.
    pub fn assert_exclusive(&self, function: &str) -> SchemaResult<Engine> {
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
                function.to_string(),
                engines.len(),
            )),
        }
    }
}
