//! YAML document parsing for declared objects.
//!
//! A document carries `apiVersion: schemas.schemahero.io/v1alpha4`, a
//! `kind`, `metadata.name`, and a `spec`. Older alpha versions are accepted
//! and land in the current in-memory types; the resource shapes are
//! additive across versions.

use serde::{Deserialize, Serialize};

use crate::error::{SchemaError, SchemaResult};
use crate::migration::{Migration, MigrationSpec, MigrationStatus};
use crate::v1alpha4::{
    DataMigration, DataMigrationSpec, DataType, DataTypeSpec, DatabaseExtension,
    DatabaseExtensionSpec, Function, FunctionSpec, Table, TableSpec, View, ViewSpec,
};

/// The schema group of all declared objects.
pub const API_GROUP: &str = "schemas.schemahero.io";

/// The current apiVersion.
pub const CURRENT_API_VERSION: &str = "schemas.schemahero.io/v1alpha4";

const ACCEPTED_VERSIONS: &[&str] = &["v1alpha2", "v1alpha3", "v1alpha4"];

/// A parsed declared object of any kind.
#[derive(Debug, Clone)]
pub enum Resource {
    Table(Table),
    View(View),
    DataType(DataType),
    Function(Function),
    DatabaseExtension(DatabaseExtension),
    Migration(Migration),
    DataMigration(DataMigration),
}

impl Resource {
    /// The resource's metadata name.
    pub fn name(&self) -> &str {
        match self {
            Resource::Table(t) => &t.name,
            Resource::View(v) => &v.name,
            Resource::DataType(d) => &d.name,
            Resource::Function(f) => &f.name,
            Resource::DatabaseExtension(e) => &e.name,
            Resource::Migration(m) => &m.name,
            Resource::DataMigration(d) => &d.name,
        }
    }

    /// The resource kind, as it appears in YAML.
    pub fn kind(&self) -> &'static str {
        match self {
            Resource::Table(_) => "Table",
            Resource::View(_) => "View",
            Resource::DataType(_) => "DataType",
            Resource::Function(_) => "Function",
            Resource::DatabaseExtension(_) => "DatabaseExtension",
            Resource::Migration(_) => "Migration",
            Resource::DataMigration(_) => "DataMigration",
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(rename = "apiVersion")]
    api_version: String,
    kind: String,
    #[serde(default)]
    metadata: Metadata,
    spec: serde_yaml::Value,
    #[serde(default)]
    status: Option<serde_yaml::Value>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct Metadata {
    #[serde(default)]
    name: String,
    #[serde(default)]
    namespace: String,
}

fn check_api_version(api_version: &str) -> SchemaResult<()> {
    let Some((group, version)) = api_version.split_once('/') else {
        return Err(SchemaError::UnsupportedApiVersion(api_version.to_string()));
    };
    if group != API_GROUP || !ACCEPTED_VERSIONS.contains(&version) {
        return Err(SchemaError::UnsupportedApiVersion(api_version.to_string()));
    }
    Ok(())
}

fn from_value<T: serde::de::DeserializeOwned>(value: serde_yaml::Value) -> SchemaResult<T> {
    Ok(serde_yaml::from_value(value)?)
}

/// Parse one YAML document into a resource.
pub fn parse_document(yaml: &str) -> SchemaResult<Resource> {
    let raw: RawDocument = serde_yaml::from_str(yaml)?;
    check_api_version(&raw.api_version)?;

    let name = raw.metadata.name;
    let namespace = raw.metadata.namespace;

    let resource = match raw.kind.as_str() {
        "Table" => {
            let spec: TableSpec = from_value(raw.spec)?;
            let status = match raw.status {
                Some(v) => from_value(v)?,
                None => Default::default(),
            };
            Resource::Table(Table {
                name,
                namespace,
                spec,
                status,
            })
        }
        "View" => {
            let spec: ViewSpec = from_value(raw.spec)?;
            Resource::View(View {
                name,
                namespace,
                spec,
                status: Default::default(),
            })
        }
        "DataType" => {
            let spec: DataTypeSpec = from_value(raw.spec)?;
            Resource::DataType(DataType {
                name,
                namespace,
                spec,
                status: Default::default(),
            })
        }
        "Function" => {
            let spec: FunctionSpec = from_value(raw.spec)?;
            Resource::Function(Function {
                name,
                namespace,
                spec,
                status: Default::default(),
            })
        }
        "DatabaseExtension" => {
            let spec: DatabaseExtensionSpec = from_value(raw.spec)?;
            Resource::DatabaseExtension(DatabaseExtension {
                name,
                namespace,
                spec,
                status: Default::default(),
            })
        }
        "Migration" => {
            let spec: MigrationSpec = from_value(raw.spec)?;
            let status: MigrationStatus = match raw.status {
                Some(v) => from_value(v)?,
                None => Default::default(),
            };
            Resource::Migration(Migration { name, spec, status })
        }
        "DataMigration" => {
            let spec: DataMigrationSpec = from_value(raw.spec)?;
            Resource::DataMigration(DataMigration {
                name,
                namespace,
                spec,
            })
        }
        other => return Err(SchemaError::UnknownKind(other.to_string())),
    };
    Ok(resource)
}

/// Render a Table as a complete YAML document.
pub fn render_table(table: &Table) -> SchemaResult<String> {
    #[derive(Serialize)]
    struct Doc<'a> {
        #[serde(rename = "apiVersion")]
        api_version: &'a str,
        kind: &'a str,
        metadata: Metadata,
        spec: &'a TableSpec,
    }
    Ok(serde_yaml::to_string(&Doc {
        api_version: CURRENT_API_VERSION,
        kind: "Table",
        metadata: Metadata {
            name: table.name.clone(),
            namespace: table.namespace.clone(),
        },
        spec: &table.spec,
    })?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE_YAML: &str = r#"
apiVersion: schemas.schemahero.io/v1alpha4
kind: Table
metadata:
  name: users
spec:
  database: mydb
  name: users
  schema:
    postgres:
      primaryKey: [id]
      columns:
        - name: id
          type: integer
"#;

    #[test]
    fn test_parse_table_document() {
        let resource = parse_document(TABLE_YAML).unwrap();
        assert_eq!(resource.kind(), "Table");
        assert_eq!(resource.name(), "users");
        let Resource::Table(table) = resource else {
            panic!("expected table");
        };
        assert_eq!(table.spec.database, "mydb");
        assert!(table.spec.schema.postgres.is_some());
    }

    #[test]
    fn test_older_api_versions_accepted() {
        let doc = TABLE_YAML.replace("v1alpha4", "v1alpha2");
        assert!(parse_document(&doc).is_ok());
        let doc3 = TABLE_YAML.replace("v1alpha4", "v1alpha3");
        assert!(parse_document(&doc3).is_ok());
    }

    #[test]
    fn test_unknown_version_rejected() {
        let doc = TABLE_YAML.replace("v1alpha4", "v2");
        let err = parse_document(&doc).unwrap_err();
        assert!(err.to_string().contains("v2"));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let doc = TABLE_YAML.replace("kind: Table", "kind: Sprocket");
        let err = parse_document(&doc).unwrap_err();
        assert!(err.to_string().contains("Sprocket"));
    }

    #[test]
    fn test_render_table_round_trips() {
        let Resource::Table(table) = parse_document(TABLE_YAML).unwrap() else {
            panic!("expected table");
        };
        let rendered = render_table(&table).unwrap();
        assert!(rendered.contains("apiVersion: schemas.schemahero.io/v1alpha4"));
        assert!(rendered.contains("kind: Table"));
        let reparsed = parse_document(&rendered).unwrap();
        assert_eq!(reparsed.name(), "users");
    }

    #[test]
    fn test_parse_migration_document() {
        let yaml = r#"
apiVersion: schemas.schemahero.io/v1alpha4
kind: Migration
metadata:
  name: users-abc1234-1700000000000000000
spec:
  tableName: users
  generatedDDL:
    - create table "users" ("id" integer, primary key ("id"))
"#;
        let Resource::Migration(m) = parse_document(yaml).unwrap() else {
            panic!("expected migration");
        };
        assert_eq!(m.spec.table_name, "users");
        assert_eq!(m.spec.generated_ddl.len(), 1);
        assert_eq!(m.status.phase, crate::migration::Phase::Planned);
    }
}
