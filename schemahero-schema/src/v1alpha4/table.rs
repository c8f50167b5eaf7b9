//! The Table resource.

use serde::{Deserialize, Serialize};

use crate::error::{SchemaError, SchemaResult};
use crate::Engine;

use super::cassandra::CassandraTableSchema;
use super::mysql::MysqlTableSchema;
use super::postgres::PostgresTableSchema;
use super::sqlite::{RqliteTableSchema, SqliteTableSchema};
use super::timescaledb::TimescaleDBTableSchema;

/// A declared table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    /// Resource name (metadata.name).
    pub name: String,
    /// Resource namespace.
    #[serde(default)]
    pub namespace: String,
    /// User intent.
    pub spec: TableSpec,
    /// Observed state.
    #[serde(default)]
    pub status: TableStatus,
}

/// Spec of a declared table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableSpec {
    /// Logical database name, bound to a connection elsewhere.
    pub database: String,
    /// Table name.
    pub name: String,
    /// Tables that must exist before this one is reconciled.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    /// Engine-keyed schema. Exactly one branch must be populated.
    pub schema: TableSchema,
    /// Optional seed rows inserted after the DDL converges.
    #[serde(rename = "seedData", skip_serializing_if = "Option::is_none")]
    pub seed_data: Option<SeedData>,
}

/// Status of a declared table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableStatus {
    /// SHA-256 over the canonical encoding of the spec at last plan time.
    /// Used to suppress no-op re-planning.
    #[serde(
        rename = "lastPlannedSpecDigest",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_planned_spec_digest: Option<String>,
}

/// Engine-keyed table schema. Exactly one branch is populated; the diff
/// engine asserts this before planning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postgres: Option<PostgresTableSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mysql: Option<MysqlTableSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cockroachdb: Option<PostgresTableSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cassandra: Option<CassandraTableSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sqlite: Option<SqliteTableSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rqlite: Option<RqliteTableSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timescaledb: Option<TimescaleDBTableSchema>,
}

impl TableSchema {
    /// Engines populated in this schema.
    pub fn populated_engines(&self) -> Vec<Engine> {
        let mut engines = Vec::new();
        if self.postgres.is_some() {
            engines.push(Engine::Postgres);
        }
        if self.mysql.is_some() {
            engines.push(Engine::Mysql);
        }
        if self.cockroachdb.is_some() {
            engines.push(Engine::Cockroachdb);
        }
        if self.cassandra.is_some() {
            engines.push(Engine::Cassandra);
        }
        if self.sqlite.is_some() {
            engines.push(Engine::Sqlite);
        }
        if self.rqlite.is_some() {
            engines.push(Engine::Rqlite);
        }
        if self.timescaledb.is_some() {
            engines.push(Engine::Timescaledb);
        }
        engines
    }

    /// Assert engine exclusivity and return the single populated engine.
    pub fn assert_exclusive(&self, table: &str) -> SchemaResult<Engine> {
        let engines = self.populated_engines();
        match engines.as_slice() {
            [engine] => Ok(*engine),
            _ => Err(SchemaError::EngineExclusivity(
                table.to_string(),
                engines.len(),
            )),
        }
    }
}

/// Seed rows to insert once the table schema has converged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedData {
    /// Rows to insert.
    #[serde(default)]
    pub rows: Vec<SeedRow>,
}

/// One seed row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedRow {
    /// Column values for this row.
    #[serde(default)]
    pub columns: Vec<SeedColumn>,
}

/// A single column value within a seed row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedColumn {
    /// Column name.
    pub column: String,
    /// Value to insert.
    pub value: SeedValue,
}

/// A seed value. YAML scalars map onto these variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeedValue {
    /// Integer literal.
    Int(i64),
    /// Floating point literal.
    Float(f64),
    /// Boolean literal.
    Bool(bool),
    /// String literal, quoted on emit.
    Str(String),
    /// Explicit NULL.
    Null,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::v1alpha4::postgres::{PostgresTableColumn, PostgresTableSchema};

    fn postgres_schema() -> PostgresTableSchema {
        PostgresTableSchema {
            columns: vec![PostgresTableColumn {
                name: "id".to_string(),
                column_type: "integer".to_string(),
                ..Default::default()
            }],
            primary_key: vec!["id".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_exclusivity_single_engine() {
        let schema = TableSchema {
            postgres: Some(postgres_schema()),
            ..Default::default()
        };
        assert_eq!(schema.assert_exclusive("users").unwrap(), Engine::Postgres);
    }

    #[test]
    fn test_exclusivity_rejects_none_and_many() {
        let empty = TableSchema::default();
        assert!(empty.assert_exclusive("users").is_err());

        let both = TableSchema {
            postgres: Some(postgres_schema()),
            cockroachdb: Some(postgres_schema()),
            ..Default::default()
        };
        let err = both.assert_exclusive("users").unwrap_err();
        assert!(err.to_string().contains("exactly one engine"));
    }

    #[test]
    fn test_table_yaml_round_trip() {
        let yaml = r#"
database: mydb
name: users
schema:
  postgres:
    primaryKey: [id]
    columns:
      - name: id
        type: integer
      - name: email
        type: text
        constraints:
          notNull: true
"#;
        let spec: TableSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(spec.name, "users");
        let pg = spec.schema.postgres.as_ref().unwrap();
        assert_eq!(pg.columns.len(), 2);
        assert_eq!(pg.primary_key, vec!["id".to_string()]);
        assert_eq!(pg.columns[1].constraints.as_ref().unwrap().not_null, Some(true));
    }
}
