//! The DatabaseExtension resource.

use serde::{Deserialize, Serialize};

use crate::error::{SchemaError, SchemaResult};
use crate::Engine;

use super::postgres::PostgresDatabaseExtension;

/// A declared database extension.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseExtension {
    /// Resource name.
    pub name: String,
    /// Resource namespace.
    #[serde(default)]
    pub namespace: String,
    /// User intent.
    pub spec: DatabaseExtensionSpec,
    /// Observed state.
    #[serde(default)]
    pub status: DatabaseExtensionStatus,
}

/// Spec of a declared extension. Only Postgres-family engines have
/// extensions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseExtensionSpec {
    /// Logical database name.
    pub database: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postgres: Option<PostgresDatabaseExtension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timescaledb: Option<PostgresDatabaseExtension>,
}

/// Status of a declared extension.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseExtensionStatus {
    #[serde(
        rename = "lastPlannedSpecDigest",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_planned_spec_digest: Option<String>,
}

impl DatabaseExtensionSpec {
    /// Assert engine exclusivity and return the single populated engine.
    pub fn assert_exclusive(&self, name: &str) -> SchemaResult<Engine> {
        match (&self.postgres, &self.timescaledb) {
            (Some(_), None) => Ok(Engine::Postgres),
            (None, Some(_)) => Ok(Engine::Timescaledb),
            (None, None) => Err(SchemaError::EngineExclusivity(name.to_string(), 0)),
            (Some(_), Some(_)) => Err(SchemaError::EngineExclusivity(name.to_string(), 2)),
        }
    }
}
