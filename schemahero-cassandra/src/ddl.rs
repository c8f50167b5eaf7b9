//! CQL statement rendering.
//!
//! Table names are double-quoted in `"keyspace.table"` form; column and
//! field identifiers are emitted bare, as Cassandra folds them to lower
//! case anyway.

use schemahero_schema::v1alpha4::{
    CassandraColumn, CassandraDataTypeSchema, CassandraTableProperties, CassandraTableSchema,
};

use crate::error::CassandraResult;
use crate::types::normalize_column_type;

/// Render the qualified, quoted name of a table or type.
pub fn qualified_name(keyspace: &str, name: &str) -> String {
    format!("\"{}.{}\"", keyspace, name)
}

fn column_clause(column: &CassandraColumn) -> CassandraResult<String> {
    let normalized = normalize_column_type(&column.name, &column.column_type)?;
    let mut clause = format!("{} {}", column.name, normalized.data_type);
    if column.is_static.unwrap_or(false) {
        clause.push_str(" static");
    }
    Ok(clause)
}

/// Render the `primary key (...)` clause from the composite key shape.
///
/// The first inner list is the partition key; it is parenthesized when
/// composite. Columns of every subsequent list follow as clustering
/// columns.
pub fn primary_key_clause(primary_key: &[Vec<String>]) -> Option<String> {
    let (partition, clustering) = primary_key.split_first()?;
    if partition.is_empty() {
        return None;
    }
    let mut parts = Vec::with_capacity(1 + clustering.len());
    if partition.len() == 1 {
        parts.push(partition[0].clone());
    } else {
        parts.push(format!("({})", partition.join(", ")));
    }
    for group in clustering {
        for column in group {
            parts.push(column.clone());
        }
    }
    Some(format!("primary key ({})", parts.join(", ")))
}

fn properties_clauses(properties: &CassandraTableProperties) -> Vec<String> {
    let mut clauses = Vec::new();
    if let Some(chance) = &properties.bloom_filter_fp_chance {
        clauses.push(format!("bloom_filter_fp_chance = {}", chance));
    }
    if let Some(caching) = &properties.caching {
        let entries: Vec<String> = caching
            .iter()
            .map(|(k, v)| format!("'{}': '{}'", k, v))
            .collect();
        clauses.push(format!("caching = {{{}}}", entries.join(", ")));
    }
    if let Some(comment) = &properties.comment {
        clauses.push(format!("comment = '{}'", comment.replace('\'', "''")));
    }
    if let Some(seconds) = properties.gc_grace_seconds {
        clauses.push(format!("gc_grace_seconds = {}", seconds));
    }
    if let Some(ttl) = properties.default_ttl {
        clauses.push(format!("default_time_to_live = {}", ttl));
    }
    clauses
}

/// Render the `create table` statement for a declared table.
pub fn create_table_statement(
    keyspace: &str,
    table: &str,
    schema: &CassandraTableSchema,
) -> CassandraResult<String> {
    let mut elements = Vec::with_capacity(schema.columns.len() + 1);
    for column in &schema.columns {
        elements.push(column_clause(column)?);
    }
    if let Some(clause) = primary_key_clause(&schema.primary_key) {
        elements.push(clause);
    }

    let mut statement = format!(
        "create table {} ({})",
        qualified_name(keyspace, table),
        elements.join(", ")
    );

    let mut with_clauses = Vec::new();
    if let Some(order) = &schema.clustering_order {
        let direction = if order.is_descending.unwrap_or(false) {
            " desc"
        } else {
            ""
        };
        with_clauses.push(format!(
            "clustering order by ({}{})",
            order.column, direction
        ));
    }
    if let Some(properties) = &schema.properties {
        with_clauses.extend(properties_clauses(properties));
    }
    if !with_clauses.is_empty() {
        statement.push_str(" with ");
        statement.push_str(&with_clauses.join(" and "));
    }
    Ok(statement)
}

/// Render `drop table`.
pub fn drop_table_statement(keyspace: &str, table: &str) -> String {
    format!("drop table {}", qualified_name(keyspace, table))
}

/// Render `alter table ... add`.
pub fn add_column_statement(
    keyspace: &str,
    table: &str,
    column: &CassandraColumn,
) -> CassandraResult<String> {
    Ok(format!(
        "alter table {} add {}",
        qualified_name(keyspace, table),
        column_clause(column)?
    ))
}

/// Render `alter table ... drop`.
pub fn drop_column_statement(keyspace: &str, table: &str, column: &str) -> String {
    format!(
        "alter table {} drop {}",
        qualified_name(keyspace, table),
        column
    )
}

/// Render `alter table ... alter ... type`.
pub fn alter_column_type_statement(
    keyspace: &str,
    table: &str,
    column: &str,
    data_type: &str,
) -> String {
    format!(
        "alter table {} alter {} type {}",
        qualified_name(keyspace, table),
        column,
        data_type
    )
}

/// Render `create type` for a user-defined type.
pub fn create_type_statement(
    keyspace: &str,
    name: &str,
    schema: &CassandraDataTypeSchema,
) -> CassandraResult<String> {
    let mut fields = Vec::with_capacity(schema.fields.len());
    for field in &schema.fields {
        let normalized = normalize_column_type(&field.name, &field.field_type)?;
        fields.push(format!("{} {}", field.name, normalized.data_type));
    }
    Ok(format!(
        "create type {} ({})",
        qualified_name(keyspace, name),
        fields.join(", ")
    ))
}

/// Render `alter type ... add` for one new field.
pub fn add_type_field_statement(
    keyspace: &str,
    name: &str,
    field: &str,
    data_type: &str,
) -> String {
    format!(
        "alter type {} add {} {}",
        qualified_name(keyspace, name),
        field,
        data_type
    )
}

/// Render `drop type`.
pub fn drop_type_statement(keyspace: &str, name: &str) -> String {
    format!("drop type {}", qualified_name(keyspace, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn composite_partition_with_clustering_column() {
        let clause = primary_key_clause(&[
            vec!["a".to_string(), "b".to_string()],
            vec!["c".to_string()],
        ]);
        assert_eq!(clause.as_deref(), Some("primary key ((a, b), c)"));
    }

    #[test]
    fn scalar_partition_key() {
        let clause = primary_key_clause(&[vec!["id".to_string()]]);
        assert_eq!(clause.as_deref(), Some("primary key (id)"));
    }

    #[test]
    fn clustering_order_renders_after_columns() {
        let schema = CassandraTableSchema {
            primary_key: vec![vec!["a".to_string()], vec!["b".to_string()]],
            clustering_order: Some(schemahero_schema::v1alpha4::CassandraClusteringOrder {
                column: "b".to_string(),
                is_descending: Some(true),
            }),
            columns: vec![
                CassandraColumn {
                    name: "a".to_string(),
                    column_type: "int".to_string(),
                    is_static: None,
                },
                CassandraColumn {
                    name: "b".to_string(),
                    column_type: "timestamp".to_string(),
                    is_static: None,
                },
            ],
            ..Default::default()
        };
        let statement = create_table_statement("k", "events", &schema).unwrap();
        assert_eq!(
            statement,
            "create table \"k.events\" (a int, b timestamp, primary key (a, b)) with clustering order by (b desc)"
        );
    }

    #[test]
    fn static_column_renders_suffix() {
        let column = CassandraColumn {
            name: "s".to_string(),
            column_type: "text".to_string(),
            is_static: Some(true),
        };
        let statement = add_column_statement("k", "t", &column).unwrap();
        assert_eq!(statement, "alter table \"k.t\" add s text static");
    }
}
