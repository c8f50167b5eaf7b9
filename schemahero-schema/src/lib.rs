//! # schemahero-schema
//!
//! Declarative schema resources and the normalized introspection model for
//! SchemaHero.
//!
//! This crate defines:
//! - The v1alpha4 resource types (Table, View, DataType, Function,
//!   DatabaseExtension, Migration, DataMigration) and their YAML document
//!   format.
//! - The normalized model connectors produce when reading the live catalog
//!   (columns, keys, indexes, foreign keys) with the tolerant equality
//!   rules the diff planners depend on.
//! - Spec digests used to suppress no-op re-planning, and the Migration
//!   phase machine.
//!
//! Engine crates consume these types when planning; the reconciler drives
//! the lifecycle.

pub mod digest;
pub mod document;
pub mod error;
pub mod migration;
pub mod model;
pub mod v1alpha4;

use serde::{Deserialize, Serialize};

pub use digest::{content_digest, short_digest, spec_digest};
pub use document::{parse_document, render_table, Resource, CURRENT_API_VERSION};
pub use error::{SchemaError, SchemaResult};
pub use migration::{Migration, MigrationSpec, MigrationStatus, Phase};
pub use model::{
    bools_equal, generate_fk_name, generate_index_name, Column, ColumnAttributes,
    ColumnConstraints, ForeignKey, Index, KeyConstraint, LiveTable,
};

/// The supported engines. A declared object populates exactly one engine
/// branch; the reconciler dispatches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Postgres,
    Mysql,
    Cockroachdb,
    Cassandra,
    Sqlite,
    Rqlite,
    Timescaledb,
}

impl Engine {
    /// The driver name as it appears in connection configuration.
    pub fn driver(&self) -> &'static str {
        match self {
            Engine::Postgres => "postgres",
            Engine::Mysql => "mysql",
            Engine::Cockroachdb => "cockroachdb",
            Engine::Cassandra => "cassandra",
            Engine::Sqlite => "sqlite",
            Engine::Rqlite => "rqlite",
            Engine::Timescaledb => "timescaledb",
        }
    }

    /// Parse a driver name.
    pub fn from_driver(driver: &str) -> Option<Engine> {
        match driver {
            "postgres" => Some(Engine::Postgres),
            "mysql" => Some(Engine::Mysql),
            "cockroachdb" => Some(Engine::Cockroachdb),
            "cassandra" => Some(Engine::Cassandra),
            "sqlite" => Some(Engine::Sqlite),
            "rqlite" => Some(Engine::Rqlite),
            "timescaledb" => Some(Engine::Timescaledb),
            _ => None,
        }
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.driver())
    }
}
