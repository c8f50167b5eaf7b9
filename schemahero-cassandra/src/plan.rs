//! Cassandra schema planning.
//!
//! Cassandra has no general ALTER path: only adding columns, dropping
//! columns, and the trivial in-place type change are produced. Anything
//! else fails with the not-implemented marker so the caller can redesign
//! the change instead of getting a silently destructive plan.

use schemahero_schema::v1alpha4::{CassandraDataTypeSchema, CassandraTableSchema};

use crate::ddl;
use crate::error::{CassandraError, CassandraResult};
use crate::types::normalize_column_type;

/// A column as read from `system_schema.columns`.
#[derive(Debug, Clone)]
pub struct CassandraLiveColumn {
    /// Column name.
    pub name: String,
    /// Case-folded CQL type.
    pub data_type: String,
    /// Whether the column is static.
    pub is_static: bool,
}

/// A table as read from `system_schema`.
#[derive(Debug, Clone, Default)]
pub struct CassandraLiveTable {
    /// Table name.
    pub name: String,
    /// All columns, including key columns.
    pub columns: Vec<CassandraLiveColumn>,
    /// Composite key shape: partition key first, then one singleton list
    /// per clustering column.
    pub primary_key: Vec<Vec<String>>,
}

impl CassandraLiveTable {
    fn column(&self, name: &str) -> Option<&CassandraLiveColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A user-defined type as read from `system_schema.types`.
#[derive(Debug, Clone, Default)]
pub struct CassandraLiveType {
    /// Type name.
    pub name: String,
    /// Field name and case-folded type, in declaration order.
    pub fields: Vec<(String, String)>,
}

/// Plan the statements converging one table toward its declared schema.
pub fn plan_table(
    keyspace: &str,
    table: &str,
    declared: &CassandraTableSchema,
    live: Option<&CassandraLiveTable>,
) -> CassandraResult<Vec<String>> {
    if declared.is_deleted.unwrap_or(false) {
        return Ok(match live {
            Some(_) => vec![ddl::drop_table_statement(keyspace, table)],
            None => Vec::new(),
        });
    }

    let live = match live {
        Some(live) => live,
        None => return Ok(vec![ddl::create_table_statement(keyspace, table, declared)?]),
    };

    if declared.primary_key != live.primary_key {
        return Err(CassandraError::not_implemented(format!(
            "changing the primary key of table {} requires a rebuild",
            table
        )));
    }

    let key_columns: Vec<&str> = declared
        .primary_key
        .iter()
        .flatten()
        .map(String::as_str)
        .collect();

    let mut drops = Vec::new();
    let mut adds = Vec::new();
    let mut alters = Vec::new();

    for column in &declared.columns {
        let wanted = normalize_column_type(&column.name, &column.column_type)?;
        match live.column(&column.name) {
            None => adds.push(ddl::add_column_statement(keyspace, table, column)?),
            Some(existing) => {
                if existing.is_static != column.is_static.unwrap_or(false) {
                    return Err(CassandraError::not_implemented(format!(
                        "changing column {} between static and regular requires a rebuild",
                        column.name
                    )));
                }
                if existing.data_type != wanted.data_type {
                    if key_columns.contains(&column.name.as_str()) {
                        return Err(CassandraError::not_implemented(format!(
                            "changing the type of key column {} requires a rebuild",
                            column.name
                        )));
                    }
                    alters.push(ddl::alter_column_type_statement(
                        keyspace,
                        table,
                        &column.name,
                        &wanted.data_type,
                    ));
                }
            }
        }
    }

    for column in &live.columns {
        if key_columns.contains(&column.name.as_str()) {
            continue;
        }
        if !declared.columns.iter().any(|c| c.name == column.name) {
            drops.push(ddl::drop_column_statement(keyspace, table, &column.name));
        }
    }

    let mut statements = drops;
    statements.extend(adds);
    statements.extend(alters);
    Ok(statements)
}

/// Plan the statements converging one user-defined type toward its
/// declared schema.
///
/// Cassandra only supports appending fields to a type; removing or
/// retyping a field fails with the not-implemented marker.
pub fn plan_type(
    keyspace: &str,
    name: &str,
    declared: &CassandraDataTypeSchema,
    live: Option<&CassandraLiveType>,
) -> CassandraResult<Vec<String>> {
    if declared.is_deleted.unwrap_or(false) {
        return Ok(match live {
            Some(_) => vec![ddl::drop_type_statement(keyspace, name)],
            None => Vec::new(),
        });
    }

    let live = match live {
        Some(live) => live,
        None => return Ok(vec![ddl::create_type_statement(keyspace, name, declared)?]),
    };

    let mut statements = Vec::new();
    for field in &declared.fields {
        let wanted = normalize_column_type(&field.name, &field.field_type)?;
        match live.fields.iter().find(|(n, _)| n == &field.name) {
            None => statements.push(ddl::add_type_field_statement(
                keyspace,
                name,
                &field.name,
                &wanted.data_type,
            )),
            Some((_, existing)) if existing != &wanted.data_type => {
                return Err(CassandraError::not_implemented(format!(
                    "changing the type of field {} on type {} requires a rebuild",
                    field.name, name
                )));
            }
            Some(_) => {}
        }
    }
    for (field, _) in &live.fields {
        if !declared.fields.iter().any(|f| &f.name == field) {
            return Err(CassandraError::not_implemented(format!(
                "removing field {} from type {} requires a rebuild",
                field, name
            )));
        }
    }
    Ok(statements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schemahero_schema::v1alpha4::{CassandraColumn, CassandraField};

    fn column(name: &str, column_type: &str) -> CassandraColumn {
        CassandraColumn {
            name: name.to_string(),
            column_type: column_type.to_string(),
            is_static: None,
        }
    }

    fn live_column(name: &str, data_type: &str) -> CassandraLiveColumn {
        CassandraLiveColumn {
            name: name.to_string(),
            data_type: data_type.to_string(),
            is_static: false,
        }
    }

    #[test]
    fn create_with_composite_partition_and_clustering_column() {
        let declared = CassandraTableSchema {
            primary_key: vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["c".to_string()],
            ],
            columns: vec![column("a", "int"), column("b", "int"), column("c", "int")],
            ..Default::default()
        };
        let statements = plan_table("k", "t", &declared, None).unwrap();
        assert_eq!(
            statements,
            vec!["create table \"k.t\" (a int, b int, c int, primary key ((a, b), c))"]
        );
    }

    #[test]
    fn converged_table_plans_nothing() {
        let declared = CassandraTableSchema {
            primary_key: vec![vec!["id".to_string()]],
            columns: vec![column("id", "uuid"), column("note", "text")],
            ..Default::default()
        };
        let live = CassandraLiveTable {
            name: "t".to_string(),
            columns: vec![live_column("id", "uuid"), live_column("note", "text")],
            primary_key: vec![vec!["id".to_string()]],
        };
        let statements = plan_table("k", "t", &declared, Some(&live)).unwrap();
        assert!(statements.is_empty());
    }

    #[test]
    fn drops_precede_adds() {
        let declared = CassandraTableSchema {
            primary_key: vec![vec!["id".to_string()]],
            columns: vec![column("id", "uuid"), column("added", "int")],
            ..Default::default()
        };
        let live = CassandraLiveTable {
            name: "t".to_string(),
            columns: vec![live_column("id", "uuid"), live_column("removed", "text")],
            primary_key: vec![vec!["id".to_string()]],
        };
        let statements = plan_table("k", "t", &declared, Some(&live)).unwrap();
        assert_eq!(
            statements,
            vec![
                "alter table \"k.t\" drop removed",
                "alter table \"k.t\" add added int",
            ]
        );
    }

    #[test]
    fn type_change_alters_in_place() {
        let declared = CassandraTableSchema {
            primary_key: vec![vec!["id".to_string()]],
            columns: vec![column("id", "uuid"), column("note", "varchar")],
            ..Default::default()
        };
        let live = CassandraLiveTable {
            name: "t".to_string(),
            columns: vec![live_column("id", "uuid"), live_column("note", "text")],
            primary_key: vec![vec!["id".to_string()]],
        };
        let statements = plan_table("k", "t", &declared, Some(&live)).unwrap();
        assert_eq!(statements, vec!["alter table \"k.t\" alter note type varchar"]);
    }

    #[test]
    fn primary_key_change_is_not_implemented() {
        let declared = CassandraTableSchema {
            primary_key: vec![vec!["other".to_string()]],
            columns: vec![column("id", "uuid"), column("other", "uuid")],
            ..Default::default()
        };
        let live = CassandraLiveTable {
            name: "t".to_string(),
            columns: vec![live_column("id", "uuid"), live_column("other", "uuid")],
            primary_key: vec![vec!["id".to_string()]],
        };
        assert!(matches!(
            plan_table("k", "t", &declared, Some(&live)),
            Err(CassandraError::NotImplemented(_))
        ));
    }

    #[test]
    fn type_planning_appends_fields() {
        let declared = CassandraDataTypeSchema {
            fields: vec![
                CassandraField {
                    name: "street".to_string(),
                    field_type: "text".to_string(),
                },
                CassandraField {
                    name: "zip".to_string(),
                    field_type: "text".to_string(),
                },
            ],
            ..Default::default()
        };
        let live = CassandraLiveType {
            name: "address".to_string(),
            fields: vec![("street".to_string(), "text".to_string())],
        };
        let statements = plan_type("k", "address", &declared, Some(&live)).unwrap();
        assert_eq!(statements, vec!["alter type \"k.address\" add zip text"]);
    }

    #[test]
    fn type_field_removal_is_not_implemented() {
        let declared = CassandraDataTypeSchema::default();
        let live = CassandraLiveType {
            name: "address".to_string(),
            fields: vec![("street".to_string(), "text".to_string())],
        };
        assert!(matches!(
            plan_type("k", "address", &declared, Some(&live)),
            Err(CassandraError::NotImplemented(_))
        ));
    }
}
