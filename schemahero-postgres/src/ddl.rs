//! DDL generation for PostgreSQL.
//!
//! Statements are emitted without trailing semicolons; extension statements
//! are the one exception and keep theirs.

use schemahero_schema::model::{Column, KeyConstraint};
use schemahero_schema::v1alpha4::{
    PostgresDatabaseExtension, PostgresFunctionSchema, PostgresTableSchema, PostgresViewSchema,
    SeedData, SeedValue, TableForeignKey, TableIndex,
};

use crate::error::PostgresResult;
use crate::plan::declared_column_to_model;

/// Postgres identifier length limit.
pub const MAX_IDENT_LENGTH: usize = 63;

/// Quote an identifier.
pub fn quote(ident: &str) -> String {
    format!("\"{ident}\"")
}

/// Encode a default value or seed literal. Literals are wrapped in single
/// quotes with embedded quotes doubled; recognized SQL expressions pass
/// through unquoted.
pub fn encode_value(value: &str) -> String {
    if is_sql_expression(value) {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "''"))
    }
}

fn is_sql_expression(value: &str) -> bool {
    let upper = value.trim().to_uppercase();
    upper == "CURRENT_TIMESTAMP"
        || upper == "NOW()"
        || upper == "NULL"
        || upper.contains('(')
        || upper.contains("CURRENT_")
}

/// Render one column for CREATE TABLE or ADD COLUMN.
pub fn column_clause(column: &Column) -> String {
    let mut clause = format!("{} {}", quote(&column.name), column.data_type);
    if column.is_array {
        clause.push_str("[]");
    }
    if let Some(not_null) = column.not_null() {
        if not_null {
            clause.push_str(" not null");
        } else {
            clause.push_str(" null");
        }
    }
    if let Some(default) = &column.default {
        clause.push_str(&format!(" default {}", encode_value(default)));
    }
    clause
}

/// Render the full CREATE TABLE statement for a declared schema: columns,
/// then the primary key, then inline unique constraints, then foreign keys.
pub fn create_table_statement(
    table: &str,
    schema: &PostgresTableSchema,
) -> PostgresResult<String> {
    let mut clauses = Vec::new();
    for declared in &schema.columns {
        let column = declared_column_to_model(declared, &schema.primary_key)?;
        clauses.push(column_clause(&column));
    }

    if !schema.primary_key.is_empty() {
        let cols: Vec<String> = schema.primary_key.iter().map(|c| quote(c)).collect();
        clauses.push(format!("primary key ({})", cols.join(", ")));
    }

    for index in &schema.indexes {
        if index.is_unique.unwrap_or(false) {
            clauses.push(unique_constraint_clause(table, index));
        }
    }

    for fk in &schema.foreign_keys {
        clauses.push(foreign_key_clause(table, fk));
    }

    Ok(format!(
        "create table {} ({})",
        quote(table),
        clauses.join(", ")
    ))
}

fn unique_constraint_clause(table: &str, index: &TableIndex) -> String {
    let cols: Vec<String> = index.columns.iter().map(|c| quote(c)).collect();
    format!(
        "constraint {} unique ({})",
        quote(&index.index_name(table, MAX_IDENT_LENGTH)),
        cols.join(", ")
    )
}

fn foreign_key_clause(table: &str, fk: &TableForeignKey) -> String {
    let child: Vec<String> = fk.columns.iter().map(|c| quote(c)).collect();
    let parent: Vec<String> = fk.references.columns.iter().map(|c| quote(c)).collect();
    let mut clause = format!(
        "constraint {} foreign key ({}) references {} ({})",
        quote(&fk.constraint_name(table)),
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

/// `alter table ... drop column ...`
pub fn drop_column_statement(table: &str, column: &str) -> String {
    format!("alter table {} drop column {}", quote(table), quote(column))
}

/// One ALTER TABLE statement carrying one or more ALTER COLUMN actions.
pub fn alter_column_statement(table: &str, column: &str, actions: &[String]) -> String {
    let actions: Vec<String> = actions
        .iter()
        .map(|a| format!("alter column {} {}", quote(column), a))
        .collect();
    format!("alter table {} {}", quote(table), actions.join(", "))
}

/// `update ... set col = default where col is null` — the backfill step of
/// the three-statement not-null pattern.
pub fn backfill_nulls_statement(table: &str, column: &str, default: &str) -> String {
    format!(
        "update {} set {}={} where {} is null",
        quote(table),
        quote(column),
        encode_value(default),
        quote(column)
    )
}

/// `alter table ... drop constraint ...`
pub fn drop_constraint_statement(table: &str, constraint: &str) -> String {
    format!(
        "alter table {} drop constraint {}",
        quote(table),
        quote(constraint)
    )
}

/// `alter table ... add constraint ... primary key (...)`
pub fn add_primary_key_statement(table: &str, key: &KeyConstraint) -> String {
    let cols: Vec<String> = key.columns.iter().map(|c| quote(c)).collect();
    format!(
        "alter table {} add constraint {} primary key ({})",
        quote(table),
        quote(&KeyConstraint::generated_pk_name(table)),
        cols.join(", ")
    )
}

/// `alter table ... add constraint ... foreign key ...`
pub fn add_foreign_key_statement(table: &str, fk: &TableForeignKey) -> String {
    format!(
        "alter table {} add {}",
        quote(table),
        foreign_key_clause(table, fk)
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

/// Drop an index. Unique indexes use `if exists`: the backing constraint
/// drop may already have removed them.
pub fn drop_index_statement(index_name: &str, is_unique: bool) -> String {
    if is_unique {
        format!("drop index if exists {}", quote(index_name))
    } else {
        format!("drop index {}", quote(index_name))
    }
}

/// `drop table ...`
pub fn drop_table_statement(table: &str) -> String {
    format!("drop table {}", quote(table))
}

/// Seed-data INSERT statements. With a declared primary key the insert is
/// an upsert keyed on it.
pub fn seed_data_statements(
    table: &str,
    primary_key: &[String],
    seed_data: &SeedData,
) -> Vec<String> {
    let mut statements = Vec::new();
    for row in &seed_data.rows {
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

pub(crate) fn seed_value(value: &SeedValue) -> String {
    match value {
        SeedValue::Int(i) => i.to_string(),
        SeedValue::Float(f) => f.to_string(),
        SeedValue::Bool(b) => b.to_string(),
        SeedValue::Str(s) => format!("'{}'", s.replace('\'', "''")),
        SeedValue::Null => "null".to_string(),
    }
}

/// CREATE VIEW / CREATE MATERIALIZED VIEW.
pub fn create_view_statement(view: &str, schema: &PostgresViewSchema) -> String {
    if schema.is_materialized.unwrap_or(false) {
        format!(
            "create materialized view {} as {}",
            quote(view),
            schema.query.trim()
        )
    } else {
        format!(
            "create or replace view {} as {}",
            quote(view),
            schema.query.trim()
        )
    }
}

/// DROP VIEW / DROP MATERIALIZED VIEW.
pub fn drop_view_statement(view: &str, is_materialized: bool) -> String {
    if is_materialized {
        format!("drop materialized view {}", quote(view))
    } else {
        format!("drop view {}", quote(view))
    }
}

/// CREATE OR REPLACE FUNCTION.
pub fn create_function_statement(name: &str, schema: &PostgresFunctionSchema) -> String {
    let params: Vec<String> = schema
        .params
        .iter()
        .map(|p| {
            let mut parts = Vec::new();
            if let Some(mode) = &p.mode {
                parts.push(mode.to_lowercase());
            }
            if let Some(name) = &p.name {
                parts.push(name.clone());
            }
            parts.push(p.param_type.clone());
            parts.join(" ")
        })
        .collect();
    let returns = match &schema.return_type {
        Some(t) if schema.return_set.unwrap_or(false) => format!("setof {t}"),
        Some(t) => t.clone(),
        None => "void".to_string(),
    };
    format!(
        "create or replace function {} ({}) returns {} language {} as $$\n{}\n$$",
        quote(name),
        params.join(", "),
        returns,
        schema.lang,
        schema.body.trim()
    )
}

/// `drop function ...`
pub fn drop_function_statement(name: &str) -> String {
    format!("drop function {}", quote(name))
}

/// CREATE EXTENSION. Extension statements keep their trailing semicolon.
pub fn create_extension_statement(ext: &PostgresDatabaseExtension) -> String {
    match &ext.version {
        Some(version) => format!(
            "create extension if not exists {} version '{}';",
            quote(&ext.name),
            version
        ),
        None => format!("create extension if not exists {};", quote(&ext.name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemahero_schema::v1alpha4::{
        ForeignKeyReferences, PostgresTableColumn, SeedColumn, SeedRow,
    };

    #[test]
    fn test_encode_value_quotes_literals() {
        assert_eq!(encode_value("11"), "'11'");
        assert_eq!(encode_value("it's"), "'it''s'");
        assert_eq!(encode_value("CURRENT_TIMESTAMP"), "CURRENT_TIMESTAMP");
        assert_eq!(encode_value("now()"), "now()");
        assert_eq!(encode_value("NULL"), "NULL");
        assert_eq!(encode_value("uuid_generate_v4()"), "uuid_generate_v4()");
    }

    #[test]
    fn test_create_table_simple() {
        let schema = PostgresTableSchema {
            columns: vec![PostgresTableColumn {
                name: "id".to_string(),
                column_type: "integer".to_string(),
                ..Default::default()
            }],
            primary_key: vec!["id".to_string()],
            ..Default::default()
        };
        assert_eq!(
            create_table_statement("simple", &schema).unwrap(),
            r#"create table "simple" ("id" integer, primary key ("id"))"#
        );
    }

    #[test]
    fn test_create_table_with_unique_index_and_fk() {
        let schema = PostgresTableSchema {
            columns: vec![
                PostgresTableColumn {
                    name: "id".to_string(),
                    column_type: "integer".to_string(),
                    ..Default::default()
                },
                PostgresTableColumn {
                    name: "user_id".to_string(),
                    column_type: "integer".to_string(),
                    ..Default::default()
                },
            ],
            primary_key: vec!["id".to_string()],
            indexes: vec![TableIndex {
                columns: vec!["user_id".to_string()],
                name: None,
                is_unique: Some(true),
            }],
            foreign_keys: vec![TableForeignKey {
                columns: vec!["user_id".to_string()],
                references: ForeignKeyReferences {
                    table: "users".to_string(),
                    columns: vec!["id".to_string()],
                },
                name: None,
                on_delete: Some("cascade".to_string()),
            }],
            ..Default::default()
        };
        let stmt = create_table_statement("orders", &schema).unwrap();
        assert!(stmt.contains(r#"constraint "idx_orders_user_id" unique ("user_id")"#));
        assert!(stmt.contains(
            r#"constraint "orders_user_id_fkey" foreign key ("user_id") references "users" ("id") on delete cascade"#
        ));
    }

    #[test]
    fn test_alter_column_statement_joins_actions() {
        let stmt = alter_column_statement(
            "t",
            "a",
            &["type text".to_string(), "drop default".to_string()],
        );
        assert_eq!(
            stmt,
            r#"alter table "t" alter column "a" type text, alter column "a" drop default"#
        );
    }

    #[test]
    fn test_backfill_statement() {
        assert_eq!(
            backfill_nulls_statement("t", "a", "11"),
            r#"update "t" set "a"='11' where "a" is null"#
        );
    }

    #[test]
    fn test_seed_upsert() {
        let seed = SeedData {
            rows: vec![SeedRow {
                columns: vec![
                    SeedColumn {
                        column: "id".to_string(),
                        value: SeedValue::Int(1),
                    },
                    SeedColumn {
                        column: "name".to_string(),
                        value: SeedValue::Str("alpha".to_string()),
                    },
                ],
            }],
        };
        let stmts = seed_data_statements("t", &["id".to_string()], &seed);
        assert_eq!(stmts.len(), 1);
        assert_eq!(
            stmts[0],
            r#"insert into "t" ("id", "name") values (1, 'alpha') on conflict ("id") do update set "name" = excluded."name""#
        );
    }

    #[test]
    fn test_create_extension_keeps_semicolon() {
        let ext = PostgresDatabaseExtension {
            name: "postgis".to_string(),
            version: None,
        };
        assert_eq!(
            create_extension_statement(&ext),
            r#"create extension if not exists "postgis";"#
        );
    }

    #[test]
    fn test_create_function() {
        let f = PostgresFunctionSchema {
            lang: "plpgsql".to_string(),
            params: vec![],
            return_type: Some("integer".to_string()),
            return_set: None,
            body: "begin return 1; end;".to_string(),
            is_deleted: None,
        };
        let stmt = create_function_statement("one", &f);
        assert!(stmt.starts_with(r#"create or replace function "one" () returns integer"#));
        assert!(stmt.contains("language plpgsql"));
        assert!(stmt.contains("begin return 1; end;"));
    }
}
