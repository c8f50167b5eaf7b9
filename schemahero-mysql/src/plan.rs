//! Declarative-vs-live diffing for MySQL tables.

use schemahero_schema::model::{Column, KeyConstraint, LiveTable};
use schemahero_schema::v1alpha4::{MysqlTableColumn, MysqlTableSchema, SeedData};

use crate::ddl;
use crate::error::MysqlResult;
use crate::types::normalize_column_type;

/// Normalize a declared column into the comparison model.
pub fn declared_column_to_model(declared: &MysqlTableColumn) -> MysqlResult<Column> {
    let normalized = normalize_column_type(&declared.name, &declared.column_type)?;
    Ok(Column {
        name: declared.name.clone(),
        data_type: normalized.data_type,
        default: declared.default.clone(),
        charset: declared.charset.clone(),
        collation: declared.collation.clone(),
        constraints: declared.constraints.clone(),
        attributes: declared.attributes.clone(),
        ..Default::default()
    })
}

/// Plan DDL for one table against the introspected state.
pub fn plan_table(
    table: &str,
    declared: &MysqlTableSchema,
    live: Option<&LiveTable>,
) -> MysqlResult<Vec<String>> {
    if declared.is_deleted.unwrap_or(false) {
        return Ok(match live {
            Some(_) => vec![ddl::drop_table_statement(table)],
            None => Vec::new(),
        });
    }

    let live = match live {
        Some(live) => live,
        None => return Ok(vec![ddl::create_table_statement(table, declared)?]),
    };

    let mut statements = Vec::new();
    statements.extend(column_statements(table, declared, live)?);
    statements.extend(primary_key_statements(table, declared, live));
    statements.extend(foreign_key_statements(table, declared, live));
    statements.extend(index_statements(table, declared, live));
    Ok(statements)
}

fn column_statements(
    table: &str,
    declared: &MysqlTableSchema,
    live: &LiveTable,
) -> MysqlResult<Vec<String>> {
    let table_charset = declared.default_charset.as_deref();
    let table_collation = declared.collation.as_deref();

    let mut statements = Vec::new();
    for declared_column in &declared.columns {
        let mut wanted = declared_column_to_model(declared_column)?;
        // Charset inheritance happens before comparison so columns that
        // rely on the table default diff clean.
        if wanted.charset.is_none() {
            wanted.charset = table_charset.map(String::from);
        }
        if wanted.collation.is_none() {
            wanted.collation = table_collation.map(String::from);
        }

        match live.column(&wanted.name) {
            None => statements.push(ddl::add_column_statement(table, &wanted)),
            Some(existing) => {
                let is_pk = declared.primary_key.contains(&wanted.name);
                statements.extend(modify_column_statements(table, &wanted, existing, is_pk));
            }
        }
    }

    for existing in &live.columns {
        if !declared.columns.iter().any(|c| c.name == existing.name) {
            statements.push(ddl::drop_column_statement(table, &existing.name));
        }
    }
    Ok(statements)
}

fn modify_column_statements(
    table: &str,
    wanted: &Column,
    existing: &Column,
    is_pk: bool,
) -> Vec<String> {
    let changed = wanted.data_type != existing.data_type
        || wanted.default != existing.default
        || charset_differs(wanted, existing)
        || wanted.is_auto_increment() != existing.is_auto_increment()
        || (!is_pk && wanted.is_not_null() != existing.is_not_null());
    if !changed {
        return Vec::new();
    }

    // Adding not-null to a nullable column with a declared default is
    // split so the migration is safe on nonempty tables.
    if !is_pk && wanted.is_not_null() && !existing.is_not_null() {
        if let Some(default) = &wanted.default {
            let mut nullable = wanted.clone();
            if let Some(constraints) = &mut nullable.constraints {
                constraints.not_null = None;
            }
            return vec![
                ddl::modify_column_statement(table, &nullable),
                ddl::backfill_nulls_statement(table, &wanted.name, default),
                ddl::modify_column_statement(table, wanted),
            ];
        }
    }

    vec![ddl::modify_column_statement(table, wanted)]
}

fn charset_differs(wanted: &Column, existing: &Column) -> bool {
    // An unset declared charset matches whatever the catalog reports; the
    // table default was already folded in.
    (wanted.charset.is_some() && wanted.charset != existing.charset)
        || (wanted.collation.is_some() && wanted.collation != existing.collation)
}

fn primary_key_statements(
    table: &str,
    declared: &MysqlTableSchema,
    live: &LiveTable,
) -> Vec<String> {
    let wanted = if declared.primary_key.is_empty() {
        None
    } else {
        Some(KeyConstraint {
            name: None,
            columns: declared.primary_key.clone(),
            is_primary: true,
        })
    };

    match (&wanted, &live.primary_key) {
        (None, None) => Vec::new(),
        (Some(wanted), Some(existing)) if wanted.equals(existing) => Vec::new(),
        (Some(wanted), Some(_)) => vec![
            ddl::drop_primary_key_statement(table),
            ddl::add_primary_key_statement(table, &wanted.columns),
        ],
        (Some(wanted), None) => vec![ddl::add_primary_key_statement(table, &wanted.columns)],
        (None, Some(_)) => vec![ddl::drop_primary_key_statement(table)],
    }
}

fn foreign_key_statements(
    table: &str,
    declared: &MysqlTableSchema,
    live: &LiveTable,
) -> Vec<String> {
    let wanted: Vec<_> = declared
        .foreign_keys
        .iter()
        .map(|fk| fk.to_model(table))
        .collect();

    let mut statements = Vec::new();
    for existing in &live.foreign_keys {
        if !wanted.iter().any(|fk| fk.equals(existing)) {
            statements.push(ddl::drop_foreign_key_statement(table, &existing.name));
        }
    }
    for (declared_fk, model) in declared.foreign_keys.iter().zip(&wanted) {
        if !live.foreign_keys.iter().any(|fk| fk.equals(model)) {
            statements.push(ddl::add_foreign_key_statement(table, declared_fk));
        }
    }
    statements
}

fn index_statements(
    table: &str,
    declared: &MysqlTableSchema,
    live: &LiveTable,
) -> Vec<String> {
    let wanted: Vec<_> = declared
        .indexes
        .iter()
        .map(|idx| idx.to_model(table, ddl::MAX_IDENT_LENGTH))
        .collect();

    let mut statements = Vec::new();
    for existing in &live.indexes {
        if !wanted.iter().any(|idx| idx.equals(existing)) {
            statements.push(ddl::drop_index_statement(table, &existing.name));
        }
    }
    for (declared_idx, model) in declared.indexes.iter().zip(&wanted) {
        if !live.indexes.iter().any(|idx| idx.equals(model)) {
            statements.push(ddl::create_index_statement(table, declared_idx));
        }
    }
    statements
}

/// Seed-data statements, planned after schema statements.
pub fn plan_seed_data(table: &str, declared: &MysqlTableSchema, seed: &SeedData) -> Vec<String> {
    ddl::seed_data_statements(table, &declared.primary_key, seed)
}
