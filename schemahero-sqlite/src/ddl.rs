//! DDL generation for SQLite.

use schemahero_schema::digest::spec_digest;
use schemahero_schema::model::Column;
use schemahero_schema::v1alpha4::{SeedData, SeedValue, SqliteTableSchema, TableForeignKey, TableIndex};

use crate::error::SqliteResult;
use crate::plan::declared_column_to_model;

/// Index names are generated under the same 64-char cap MySQL uses;
/// SQLite itself has no limit but the cap keeps generated names portable.
pub const MAX_IDENT_LENGTH: usize = 64;

/// Quote an identifier with backticks.
pub fn quote(ident: &str) -> String {
    format!("`{ident}`")
}

/// Encode a default value. Literals are wrapped in single quotes with
/// embedded quotes doubled; recognized SQL expressions pass through.
pub fn encode_value(value: &str) -> String {
    let upper = value.trim().to_uppercase();
    if upper == "CURRENT_TIMESTAMP"
        || upper == "NULL"
        || upper.contains('(')
        || upper.contains("CURRENT_")
    {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "''"))
    }
}

/// Render one column for CREATE TABLE or ADD COLUMN.
pub fn column_clause(column: &Column) -> String {
    let mut clause = format!("{} {}", quote(&column.name), column.data_type);
    if column.is_not_null() {
        clause.push_str(" not null");
    }
    if let Some(default) = &column.default {
        if default.is_empty() {
            clause.push_str(" default ''");
        } else {
            clause.push_str(&format!(" default {}", encode_value(default)));
        }
    }
    clause
}

/// Render the full CREATE TABLE statement. Unique indexes become inline
/// `unique (...)` constraints so they survive the rebuild procedure;
/// plain indexes are separate statements.
pub fn create_table_statement(
    table: &str,
    schema: &SqliteTableSchema,
    strict: bool,
) -> SqliteResult<String> {
    let mut clauses = Vec::new();
    for declared in &schema.columns {
        let column = declared_column_to_model(declared, strict)?;
        clauses.push(column_clause(&column));
    }

    if !schema.primary_key.is_empty() {
        let cols: Vec<String> = schema.primary_key.iter().map(|c| quote(c)).collect();
        clauses.push(format!("primary key ({})", cols.join(", ")));
    }

    for index in &schema.indexes {
        if index.is_unique.unwrap_or(false) {
            let cols: Vec<String> = index.columns.iter().map(|c| quote(c)).collect();
            clauses.push(format!("unique ({})", cols.join(", ")));
        }
    }

    for fk in &schema.foreign_keys {
        clauses.push(foreign_key_clause(fk));
    }

    let mut statement = format!("create table {} ({})", quote(table), clauses.join(", "));
    if strict {
        statement.push_str(" strict");
    }
    Ok(statement)
}

fn foreign_key_clause(fk: &TableForeignKey) -> String {
    let child: Vec<String> = fk.columns.iter().map(|c| quote(c)).collect();
    let parent: Vec<String> = fk.references.columns.iter().map(|c| quote(c)).collect();
    let mut clause = format!(
        "foreign key ({}) references {} ({})",
        child.join(", "),
        quote(&fk.references.table),
        parent.join(", ")
    );
    if let Some(on_delete) = &fk.on_delete {
        if !on_delete.is_empty() {
            clause.push_str(&format!(" on delete {}", on_delete.to_lowercase()));
        }
    }
    clause
}

/// `alter table ... add column ...`
pub fn add_column_statement(table: &str, column: &Column) -> String {
    format!(
        "alter table {} add column {}",
        quote(table),
        column_clause(column)
    )
}

/// `create [unique] index ... on ... (...)`
pub fn create_index_statement(table: &str, index: &TableIndex) -> String {
    let unique = if index.is_unique.unwrap_or(false) {
        "unique "
    } else {
        ""
    };
    let cols: Vec<String> = index.columns.iter().map(|c| quote(c)).collect();
    format!(
        "create {}index {} on {} ({})",
        unique,
        quote(&index.index_name(table, MAX_IDENT_LENGTH)),
        quote(table),
        cols.join(", ")
    )
}

/// `drop index ...`
pub fn drop_index_statement(index_name: &str) -> String {
    format!("drop index {}", quote(index_name))
}

/// `drop table ...`
pub fn drop_table_statement(table: &str) -> String {
    format!("drop table {}", quote(table))
}

/// The content-derived temporary table name the rebuild procedure renames
/// to: `{table}_{sha256(declared schema)}`. Deterministic for a given
/// declaration so the procedure is idempotent.
pub fn rebuild_temp_name(table: &str, schema: &SqliteTableSchema) -> SqliteResult<String> {
    let digest = spec_digest(schema)?;
    Ok(format!("{table}_{digest}"))
}

/// The table-rebuild sequence: rename aside, create from the declaration,
/// copy the surviving columns, drop the renamed original. `shared_columns`
/// is the declared/introspected intersection, in declared order.
/// `wrap_transaction` adds BEGIN/COMMIT (SQLite); RQLite runs the
/// statements as one batch instead.
pub fn rebuild_statements(
    table: &str,
    schema: &SqliteTableSchema,
    strict: bool,
    shared_columns: &[String],
    wrap_transaction: bool,
) -> SqliteResult<Vec<String>> {
    let temp = rebuild_temp_name(table, schema)?;
    let cols = shared_columns.join(",");

    let mut statements = Vec::new();
    if wrap_transaction {
        statements.push("begin transaction".to_string());
    }
    statements.push(format!(
        "alter table {} rename to {}",
        quote(table),
        quote(&temp)
    ));
    statements.push(create_table_statement(table, schema, strict)?);
    statements.push(format!(
        "insert into {table} ({cols}) select {cols} from {temp}"
    ));
    statements.push(format!("drop table {temp}"));
    for index in &schema.indexes {
        if !index.is_unique.unwrap_or(false) {
            statements.push(create_index_statement(table, index));
        }
    }
    if wrap_transaction {
        statements.push("commit".to_string());
    }
    Ok(statements)
}

/// Seed-data INSERT statements. With a declared primary key the insert
/// upserts via `on conflict`.
pub fn seed_data_statements(table: &str, primary_key: &[String], seed: &SeedData) -> Vec<String> {
    let mut statements = Vec::new();
    for row in &seed.rows {
        if row.columns.is_empty() {
            continue;
        }
        let cols: Vec<String> = row.columns.iter().map(|c| quote(&c.column)).collect();
        let values: Vec<String> = row.columns.iter().map(|c| seed_value(&c.value)).collect();
        let mut statement = format!(
            "insert into {} ({}) values ({})",
            quote(table),
            cols.join(", "),
            values.join(", ")
        );
        if !primary_key.is_empty() {
            let pk: Vec<String> = primary_key.iter().map(|c| quote(c)).collect();
            let updates: Vec<String> = row
                .columns
                .iter()
                .filter(|c| !primary_key.contains(&c.column))
                .map(|c| format!("{} = excluded.{}", quote(&c.column), quote(&c.column)))
                .collect();
            if updates.is_empty() {
                statement.push_str(&format!(" on conflict ({}) do nothing", pk.join(", ")));
            } else {
                statement.push_str(&format!(
                    " on conflict ({}) do update set {}",
                    pk.join(", "),
                    updates.join(", ")
                ));
            }
        }
        statements.push(statement);
    }
    statements
}

fn seed_value(value: &SeedValue) -> String {
    match value {
        SeedValue::Int(i) => i.to_string(),
        SeedValue::Float(f) => f.to_string(),
        SeedValue::Bool(b) => {
            if *b {
                "1".to_string()
            } else {
                "0".to_string()
            }
        }
        SeedValue::Str(s) => format!("'{}'", s.replace('\'', "''")),
        SeedValue::Null => "null".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemahero_schema::v1alpha4::SqliteTableColumn;

    fn schema() -> SqliteTableSchema {
        SqliteTableSchema {
            columns: vec![
                SqliteTableColumn {
                    name: "one".to_string(),
                    column_type: "integer".to_string(),
                    ..Default::default()
                },
                SqliteTableColumn {
                    name: "two".to_string(),
                    column_type: "text".to_string(),
                    ..Default::default()
                },
            ],
            primary_key: vec!["one".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_create_table() {
        assert_eq!(
            create_table_statement("t", &schema(), false).unwrap(),
            "create table `t` (`one` integer, `two` text, primary key (`one`))"
        );
    }

    #[test]
    fn test_create_table_strict() {
        let stmt = create_table_statement("t", &schema(), true).unwrap();
        assert!(stmt.ends_with(" strict"));
    }

    #[test]
    fn test_unique_index_is_inline_constraint() {
        let mut schema = schema();
        schema.indexes.push(TableIndex {
            columns: vec!["two".to_string()],
            name: None,
            is_unique: Some(true),
        });
        let stmt = create_table_statement("t", &schema, false).unwrap();
        assert!(stmt.contains("unique (`two`)"));
    }

    #[test]
    fn test_rebuild_temp_name_is_deterministic() {
        let a = rebuild_temp_name("t", &schema()).unwrap();
        let b = rebuild_temp_name("t", &schema()).unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with("t_"));
        assert_eq!(a.len(), "t_".len() + 64);
    }

    #[test]
    fn test_rebuild_sequence_shape() {
        let stmts =
            rebuild_statements("t", &schema(), false, &["one".to_string(), "two".to_string()], true)
                .unwrap();
        let temp = rebuild_temp_name("t", &schema()).unwrap();
        assert_eq!(stmts[0], "begin transaction");
        assert_eq!(stmts[1], format!("alter table `t` rename to `{temp}`"));
        assert_eq!(
            stmts[2],
            "create table `t` (`one` integer, `two` text, primary key (`one`))"
        );
        assert_eq!(
            stmts[3],
            format!("insert into t (one,two) select one,two from {temp}")
        );
        assert_eq!(stmts[4], format!("drop table {temp}"));
        assert_eq!(stmts.last().unwrap(), "commit");
    }

    #[test]
    fn test_rebuild_without_transaction_wrapper() {
        let stmts =
            rebuild_statements("t", &schema(), false, &["one".to_string()], false).unwrap();
        assert!(!stmts.contains(&"begin transaction".to_string()));
        assert!(!stmts.contains(&"commit".to_string()));
    }

    #[test]
    fn test_empty_string_default_survives() {
        let column = Column {
            name: "note".to_string(),
            data_type: "text".to_string(),
            default: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(column_clause(&column), "`note` text default ''");
    }
}
