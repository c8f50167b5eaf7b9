//! Render live tables back into declarative YAML.
//!
//! This is the core of the `generate` flow: introspect a database, emit
//! one Table document per live table plus a kustomization listing them.

use schemahero_schema::model::LiveTable;
use schemahero_schema::v1alpha4::{
    ForeignKeyReferences, MysqlTableColumn, MysqlTableSchema, PostgresTableColumn,
    PostgresTableSchema, SqliteTableColumn, SqliteTableSchema, Table, TableForeignKey,
    TableIndex, TableSchema, TableSpec,
};
use schemahero_schema::{Engine, SchemaResult};

fn foreign_keys(live: &LiveTable) -> Vec<TableForeignKey> {
    live.foreign_keys
        .iter()
        .map(|fk| TableForeignKey {
            columns: fk.child_columns.clone(),
            references: ForeignKeyReferences {
                table: fk.parent_table.clone(),
                columns: fk.parent_columns.clone(),
            },
            name: if fk.name.is_empty() {
                None
            } else {
                Some(fk.name.clone())
            },
            on_delete: if fk.on_delete.is_empty() {
                None
            } else {
                Some(fk.on_delete.clone())
            },
        })
        .collect()
}

fn indexes(live: &LiveTable) -> Vec<TableIndex> {
    live.indexes
        .iter()
        .map(|index| TableIndex {
            columns: index.columns.clone(),
            name: if index.name.is_empty() {
                None
            } else {
                Some(index.name.clone())
            },
            is_unique: index.is_unique,
        })
        .collect()
}

fn primary_key(live: &LiveTable) -> Vec<String> {
    live.primary_key
        .as_ref()
        .map(|pk| pk.columns.clone())
        .unwrap_or_default()
}

fn postgres_schema(live: &LiveTable) -> PostgresTableSchema {
    PostgresTableSchema {
        primary_key: primary_key(live),
        foreign_keys: foreign_keys(live),
        indexes: indexes(live),
        columns: live
            .columns
            .iter()
            .map(|column| PostgresTableColumn {
                name: column.name.clone(),
                column_type: if column.is_array {
                    format!("{}[]", column.data_type)
                } else {
                    column.data_type.clone()
                },
                constraints: column.constraints.clone(),
                attributes: column.attributes.clone(),
                default: column.default.clone(),
            })
            .collect(),
        is_deleted: None,
    }
}

fn mysql_schema(live: &LiveTable) -> MysqlTableSchema {
    MysqlTableSchema {
        primary_key: primary_key(live),
        foreign_keys: foreign_keys(live),
        indexes: indexes(live),
        columns: live
            .columns
            .iter()
            .map(|column| MysqlTableColumn {
                name: column.name.clone(),
                column_type: column.data_type.clone(),
                constraints: column.constraints.clone(),
                attributes: column.attributes.clone(),
                default: column.default.clone(),
                charset: column.charset.clone(),
                collation: column.collation.clone(),
            })
            .collect(),
        ..Default::default()
    }
}

fn sqlite_schema(live: &LiveTable) -> SqliteTableSchema {
    SqliteTableSchema {
        primary_key: primary_key(live),
        foreign_keys: foreign_keys(live),
        indexes: indexes(live),
        columns: live
            .columns
            .iter()
            .map(|column| SqliteTableColumn {
                name: column.name.clone(),
                column_type: column.data_type.clone(),
                constraints: column.constraints.clone(),
                attributes: column.attributes.clone(),
                default: column.default.clone(),
            })
            .collect(),
        ..Default::default()
    }
}

/// Render one live table as a declarative Table YAML document.
pub fn render_live_table(database: &str, engine: Engine, live: &LiveTable) -> SchemaResult<String> {
    let mut schema = TableSchema::default();
    match engine {
        Engine::Postgres | Engine::Timescaledb => schema.postgres = Some(postgres_schema(live)),
        Engine::Cockroachdb => schema.cockroachdb = Some(postgres_schema(live)),
        Engine::Mysql => schema.mysql = Some(mysql_schema(live)),
        Engine::Sqlite => schema.sqlite = Some(sqlite_schema(live)),
        Engine::Cassandra => {
            // Cassandra introspection carries its own live model; there is
            // no relational LiveTable to render from.
            return Err(schemahero_schema::SchemaError::validation(
                &live.name,
                "generate is not supported for cassandra",
            ));
        }
        Engine::Rqlite => {
            let sqlite = sqlite_schema(live);
            schema.rqlite = Some(schemahero_schema::v1alpha4::RqliteTableSchema {
                primary_key: sqlite.primary_key,
                foreign_keys: sqlite.foreign_keys,
                indexes: sqlite.indexes,
                columns: sqlite.columns,
                strict: None,
                is_deleted: None,
            });
        }
    }

    let table = Table {
        name: live.name.clone(),
        namespace: String::new(),
        spec: TableSpec {
            database: database.to_string(),
            name: live.name.clone(),
            requires: Vec::new(),
            schema,
            seed_data: None,
        },
        status: Default::default(),
    };
    schemahero_schema::document::render_table(&table)
}

/// The YAML file name for one generated table document.
pub fn table_file_name(table: &str) -> String {
    format!("{}.yaml", table)
}

/// Render the kustomization listing the generated documents.
pub fn kustomization_yaml(files: &[String]) -> String {
    let mut out = String::from("resources:\n");
    for file in files {
        out.push_str("- ");
        out.push_str(file);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schemahero_schema::model::{Column, ColumnConstraints, KeyConstraint};

    fn live_users() -> LiveTable {
        LiveTable {
            name: "users".to_string(),
            columns: vec![
                Column {
                    name: "id".to_string(),
                    data_type: "integer".to_string(),
                    constraints: Some(ColumnConstraints {
                        not_null: Some(true),
                    }),
                    ..Default::default()
                },
                Column {
                    name: "login".to_string(),
                    data_type: "character varying (255)".to_string(),
                    ..Default::default()
                },
            ],
            primary_key: Some(KeyConstraint {
                name: Some("users_pkey".to_string()),
                columns: vec!["id".to_string()],
                is_primary: true,
            }),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        }
    }

    #[test]
    fn generated_yaml_parses_back_as_a_table() {
        let yaml = render_live_table("app", Engine::Postgres, &live_users()).unwrap();
        assert!(yaml.contains("apiVersion: schemas.schemahero.io/v1alpha4"));
        assert!(yaml.contains("kind: Table"));

        let resource = schemahero_schema::document::parse_document(&yaml).unwrap();
        let schemahero_schema::document::Resource::Table(table) = resource else {
            panic!("expected a Table resource");
        };
        assert_eq!(table.spec.name, "users");
        let postgres = table.spec.schema.postgres.unwrap();
        assert_eq!(postgres.primary_key, vec!["id".to_string()]);
        assert_eq!(postgres.columns.len(), 2);
    }

    #[test]
    fn kustomization_lists_files() {
        let files = vec![table_file_name("users"), table_file_name("orders")];
        assert_eq!(
            kustomization_yaml(&files),
            "resources:\n- users.yaml\n- orders.yaml\n"
        );
    }
}
