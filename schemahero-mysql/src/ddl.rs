//! DDL generation for MySQL.

use schemahero_schema::model::Column;
use schemahero_schema::v1alpha4::{
    MysqlTableSchema, SeedData, SeedValue, TableForeignKey, TableIndex,
};

use crate::error::MysqlResult;
use crate::plan::declared_column_to_model;

/// MySQL identifier length limit.
pub const MAX_IDENT_LENGTH: usize = 64;

/// Quote an identifier with backticks.
pub fn quote(ident: &str) -> String {
    format!("`{ident}`")
}

/// Encode a default value or seed literal. Literals are wrapped in single
/// quotes with embedded quotes doubled; recognized SQL expressions pass
/// through unquoted.
pub fn encode_value(value: &str) -> String {
    let upper = value.trim().to_uppercase();
    if upper == "CURRENT_TIMESTAMP"
        || upper == "NOW()"
        || upper == "NULL"
        || upper.contains('(')
        || upper.contains("CURRENT_")
    {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "''"))
    }
}

/// Render one column for CREATE TABLE, ADD COLUMN or MODIFY COLUMN.
/// `table_charset`/`table_collation` are the table defaults a column
/// inherits when it declares none.
pub fn column_clause(
    column: &Column,
    table_charset: Option<&str>,
    table_collation: Option<&str>,
) -> String {
    let mut clause = format!("{} {}", quote(&column.name), column.data_type);

    if let Some(charset) = column.charset.as_deref().or(table_charset) {
        if !charset.is_empty() {
            clause.push_str(&format!(" character set {charset}"));
        }
    }
    if let Some(collation) = column.collation.as_deref().or(table_collation) {
        if !collation.is_empty() {
            clause.push_str(&format!(" collate {collation}"));
        }
    }

    if let Some(not_null) = column.not_null() {
        if not_null {
            clause.push_str(" not null");
        } else {
            clause.push_str(" null");
        }
    }
    if column.is_auto_increment() {
        clause.push_str(" auto_increment");
    }
    if let Some(default) = &column.default {
        clause.push_str(&format!(" default {}", encode_value(default)));
    }
    clause
}

/// Render the full CREATE TABLE statement: columns, primary key, trailing
/// key clauses for indexes, then foreign keys.
pub fn create_table_statement(table: &str, schema: &MysqlTableSchema) -> MysqlResult<String> {
    let charset = schema.default_charset.as_deref();
    let collation = schema.collation.as_deref();

    let mut clauses = Vec::new();
    for declared in &schema.columns {
        let column = declared_column_to_model(declared)?;
        clauses.push(column_clause(&column, None, None));
    }

    if !schema.primary_key.is_empty() {
        let cols: Vec<String> = schema.primary_key.iter().map(|c| quote(c)).collect();
        clauses.push(format!("primary key ({})", cols.join(", ")));
    }

    for index in &schema.indexes {
        clauses.push(key_clause(table, index));
    }
    for fk in &schema.foreign_keys {
        clauses.push(foreign_key_clause(table, fk));
    }

    let mut statement = format!("create table {} ({})", quote(table), clauses.join(", "));
    if let Some(charset) = charset {
        statement.push_str(&format!(" default character set {charset}"));
    }
    if let Some(collation) = collation {
        statement.push_str(&format!(" collate {collation}"));
    }
    Ok(statement)
}

fn key_clause(table: &str, index: &TableIndex) -> String {
    let cols: Vec<String> = index.columns.iter().map(|c| quote(c)).collect();
    let keyword = if index.is_unique.unwrap_or(false) {
        "unique key"
    } else {
        "key"
    };
    format!(
        "{} {} ({})",
        keyword,
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
        column_clause(column, None, None)
    )
}

/// `alter table ... drop column ...`
pub fn drop_column_statement(table: &str, column: &str) -> String {
    format!("alter table {} drop column {}", quote(table), quote(column))
}

/// `alter table ... modify column ...` restating the full definition.
pub fn modify_column_statement(table: &str, column: &Column) -> String {
    format!(
        "alter table {} modify column {}",
        quote(table),
        column_clause(column, None, None)
    )
}

/// The backfill step of the three-statement not-null pattern.
pub fn backfill_nulls_statement(table: &str, column: &str, default: &str) -> String {
    format!(
        "update {} set {}={} where {} is null",
        quote(table),
        quote(column),
        encode_value(default),
        quote(column)
    )
}

/// `alter table ... drop primary key`
pub fn drop_primary_key_statement(table: &str) -> String {
    format!("alter table {} drop primary key", quote(table))
}

/// `alter table ... add primary key (...)`
pub fn add_primary_key_statement(table: &str, columns: &[String]) -> String {
    let cols: Vec<String> = columns.iter().map(|c| quote(c)).collect();
    format!(
        "alter table {} add primary key ({})",
        quote(table),
        cols.join(", ")
    )
}

/// `alter table ... drop foreign key ...`
pub fn drop_foreign_key_statement(table: &str, constraint: &str) -> String {
    format!(
        "alter table {} drop foreign key {}",
        quote(table),
        quote(constraint)
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

/// `alter table ... drop index ...`
pub fn drop_index_statement(table: &str, index_name: &str) -> String {
    format!(
        "alter table {} drop index {}",
        quote(table),
        quote(index_name)
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

/// `drop table ...`
pub fn drop_table_statement(table: &str) -> String {
    format!("drop table {}", quote(table))
}

/// Seed-data INSERT statements, upserting on duplicate key.
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
        let updates: Vec<String> = row
            .columns
            .iter()
            .filter(|c| !primary_key.contains(&c.column))
            .map(|c| format!("{} = values({})", quote(&c.column), quote(&c.column)))
            .collect();
        if !primary_key.is_empty() && !updates.is_empty() {
            statement.push_str(&format!(
                " on duplicate key update {}",
                updates.join(", ")
            ));
        }
        statements.push(statement);
    }
    statements
}

fn seed_value(value: &SeedValue) -> String {
    match value {
        SeedValue::Int(i) => i.to_string(),
        SeedValue::Float(f) => f.to_string(),
        SeedValue::Bool(b) => b.to_string(),
        SeedValue::Str(s) => format!("'{}'", s.replace('\'', "''")),
        SeedValue::Null => "null".to_string(),
    }
}
