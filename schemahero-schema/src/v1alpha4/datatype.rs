//! The DataType resource (user-defined types).

use serde::{Deserialize, Serialize};

use crate::error::{SchemaError, SchemaResult};
use crate::Engine;

use super::cassandra::CassandraDataTypeSchema;

/// Marker for an engine without user-defined type support.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotImplementedDataTypeSchema {}

/// A declared user-defined type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataType {
    /// Resource name.
    pub name: String,
    /// Resource namespace.
    #[serde(default)]
    pub namespace: String,
    /// User intent.
    pub spec: DataTypeSpec,
    /// Observed state.
    #[serde(default)]
    pub status: DataTypeStatus,
}

/// Spec of a declared type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataTypeSpec {
    /// Logical database name.
    pub database: String,
    /// Type name.
    pub name: String,
    /// Engine-keyed schema.
    pub schema: DataTypeSchema,
}

/// Status of a declared type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataTypeStatus {
    #[serde(
        rename = "lastPlannedSpecDigest",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_planned_spec_digest: Option<String>,
}

/// Engine-keyed type schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataTypeSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cassandra: Option<CassandraDataTypeSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postgres: Option<NotImplementedDataTypeSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mysql: Option<NotImplementedDataTypeSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sqlite: Option<NotImplementedDataTypeSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rqlite: Option<NotImplementedDataTypeSchema>,
}

impl DataTypeSchema {
    /// Assert engine exclusivity and return the single populated engine.
    pub fn assert_exclusive(&self, datatype: &str) -> SchemaResult<Engine> {
        let mut engines = Vec::new();
        if self.cassandra.is_some() {
            engines.push(Engine::Cassandra);
        }
        if self.postgres.is_some() {
            engines.push(Engine::Postgres);
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
        match engines.as_slice() {
            [engine] => Ok(*engine),
            _ => Err(SchemaError::EngineExclusivity(
                datatype.to_string(),
                engines.len(),
            )),
        }
    }
}
