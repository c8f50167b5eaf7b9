//! Declarative-vs-live diffing for SQLite tables.
//!
//! SQLite cannot modify a column in place. Changes to primary keys,
//! foreign keys, existing columns or constraint-backing indexes trigger
//! the table-rebuild procedure; plain column adds and non-constraint
//! index changes are planned in place.

use schemahero_schema::model::{Column, Index, KeyConstraint, LiveTable};
use schemahero_schema::v1alpha4::{SeedData, SqliteTableColumn, SqliteTableSchema};

use crate::ddl;
use crate::error::SqliteResult;
use crate::types::normalize_column_type;

/// The introspected state of one table. Constraint-backing indexes
/// (unique constraints, the primary key's index) are kept apart from
/// plain indexes because they cannot be dropped in place.
#[derive(Debug, Clone, Default)]
pub struct SqliteLiveTable {
    /// Columns, primary key, foreign keys and plain indexes.
    pub table: LiveTable,
    /// Indexes that back constraints.
    pub constraint_indexes: Vec<Index>,
}

/// Normalize a declared column into the comparison model. The empty-string
/// sentinel decodes into a real empty-string default here.
pub fn declared_column_to_model(
    declared: &SqliteTableColumn,
    strict: bool,
) -> SqliteResult<Column> {
    let data_type = normalize_column_type(&declared.name, &declared.column_type, strict)?;
    Ok(Column {
        name: declared.name.clone(),
        data_type,
        default: declared.effective_default(),
        constraints: declared.constraints.clone(),
        attributes: declared.attributes.clone(),
        ..Default::default()
    })
}

/// Plan DDL for one table. `wrap_transaction` controls whether a rebuild
/// is wrapped in BEGIN/COMMIT (SQLite) or left bare for single-batch
/// execution (RQLite).
pub fn plan_table(
    table: &str,
    declared: &SqliteTableSchema,
    strict: bool,
    live: Option<&SqliteLiveTable>,
    wrap_transaction: bool,
) -> SqliteResult<Vec<String>> {
    if declared.is_deleted.unwrap_or(false) {
        return Ok(match live {
            Some(_) => vec![ddl::drop_table_statement(table)],
            None => Vec::new(),
        });
    }

    let live = match live {
        Some(live) => live,
        None => {
            let mut statements = vec![ddl::create_table_statement(table, declared, strict)?];
            for index in &declared.indexes {
                if !index.is_unique.unwrap_or(false) {
                    statements.push(ddl::create_index_statement(table, index));
                }
            }
            return Ok(statements);
        }
    };

    if needs_rebuild(table, declared, strict, live)? {
        let shared = shared_columns(declared, &live.table);
        return ddl::rebuild_statements(table, declared, strict, &shared, wrap_transaction);
    }

    let mut statements = Vec::new();
    for declared_column in &declared.columns {
        let wanted = declared_column_to_model(declared_column, strict)?;
        if live.table.column(&wanted.name).is_none() {
            statements.push(ddl::add_column_statement(table, &wanted));
        }
    }
    statements.extend(plain_index_statements(table, declared, live));
    Ok(statements)
}

/// Whether convergence requires the rebuild procedure.
fn needs_rebuild(
    table: &str,
    declared: &SqliteTableSchema,
    strict: bool,
    live: &SqliteLiveTable,
) -> SqliteResult<bool> {
    // Primary-key change.
    let wanted_pk = if declared.primary_key.is_empty() {
        None
    } else {
        Some(KeyConstraint {
            name: None,
            columns: declared.primary_key.clone(),
            is_primary: true,
        })
    };
    let pk_equal = match (&wanted_pk, &live.table.primary_key) {
        (None, None) => true,
        (Some(a), Some(b)) => a.equals(b),
        _ => false,
    };
    if !pk_equal {
        return Ok(true);
    }

    // Foreign-key set change, either direction.
    let wanted_fks: Vec<_> = declared
        .foreign_keys
        .iter()
        .map(|fk| fk.to_model(table))
        .collect();
    let fks_equal = wanted_fks
        .iter()
        .all(|fk| live.table.foreign_keys.iter().any(|l| l.equals(fk)))
        && live
            .table
            .foreign_keys
            .iter()
            .all(|l| wanted_fks.iter().any(|fk| fk.equals(l)));
    if !fks_equal {
        return Ok(true);
    }

    // Existing column changed, or a live column was removed from the
    // declaration.
    for declared_column in &declared.columns {
        let wanted = declared_column_to_model(declared_column, strict)?;
        if let Some(existing) = live.table.column(&wanted.name) {
            let is_pk = declared.primary_key.contains(&wanted.name);
            let not_null_differs = !is_pk && wanted.is_not_null() != existing.is_not_null();
            if wanted.data_type != existing.data_type
                || wanted.default != existing.default
                || not_null_differs
            {
                return Ok(true);
            }
        }
    }
    for existing in &live.table.columns {
        if !declared.columns.iter().any(|c| c.name == existing.name) {
            return Ok(true);
        }
    }

    // Constraint-backing index change.
    let wanted_unique: Vec<_> = declared
        .indexes
        .iter()
        .filter(|idx| idx.is_unique.unwrap_or(false))
        .map(|idx| idx.to_model(table, ddl::MAX_IDENT_LENGTH))
        .collect();
    let unique_equal = wanted_unique
        .iter()
        .all(|idx| live.constraint_indexes.iter().any(|l| l.equals(idx)))
        && live
            .constraint_indexes
            .iter()
            .all(|l| wanted_unique.iter().any(|idx| idx.equals(l)));
    Ok(!unique_equal)
}

fn shared_columns(declared: &SqliteTableSchema, live: &LiveTable) -> Vec<String> {
    declared
        .columns
        .iter()
        .filter(|c| live.column(&c.name).is_some())
        .map(|c| c.name.clone())
        .collect()
}

fn plain_index_statements(
    table: &str,
    declared: &SqliteTableSchema,
    live: &SqliteLiveTable,
) -> Vec<String> {
    let wanted: Vec<_> = declared
        .indexes
        .iter()
        .filter(|idx| !idx.is_unique.unwrap_or(false))
        .map(|idx| idx.to_model(table, ddl::MAX_IDENT_LENGTH))
        .collect();

    let mut statements = Vec::new();
    for existing in &live.table.indexes {
        if !wanted.iter().any(|idx| idx.equals(existing)) {
            statements.push(ddl::drop_index_statement(&existing.name));
        }
    }
    for (declared_idx, model) in declared
        .indexes
        .iter()
        .filter(|idx| !idx.is_unique.unwrap_or(false))
        .zip(&wanted)
    {
        if !live.table.indexes.iter().any(|idx| idx.equals(model)) {
            statements.push(ddl::create_index_statement(table, declared_idx));
        }
    }
    statements
}

/// Seed-data statements, planned after schema statements.
pub fn plan_seed_data(table: &str, declared: &SqliteTableSchema, seed: &SeedData) -> Vec<String> {
    ddl::seed_data_statements(table, &declared.primary_key, seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schemahero_schema::v1alpha4::TableIndex;

    fn declared_column(name: &str, column_type: &str) -> SqliteTableColumn {
        SqliteTableColumn {
            name: name.to_string(),
            column_type: column_type.to_string(),
            ..Default::default()
        }
    }

    fn live_column(name: &str, data_type: &str) -> Column {
        Column {
            name: name.to_string(),
            data_type: data_type.to_string(),
            ..Default::default()
        }
    }

    fn live(columns: Vec<Column>) -> SqliteLiveTable {
        SqliteLiveTable {
            table: LiveTable {
                name: "t".to_string(),
                columns,
                ..Default::default()
            },
            constraint_indexes: Vec::new(),
        }
    }

    #[test]
    fn test_converged_table_plans_nothing() {
        let declared = SqliteTableSchema {
            columns: vec![declared_column("one", "integer")],
            ..Default::default()
        };
        let state = live(vec![live_column("one", "integer")]);
        assert!(plan_table("t", &declared, false, Some(&state), true)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_new_column_added_in_place() {
        let declared = SqliteTableSchema {
            columns: vec![
                declared_column("one", "integer"),
                declared_column("two", "text"),
            ],
            ..Default::default()
        };
        let state = live(vec![live_column("one", "integer")]);
        assert_eq!(
            plan_table("t", &declared, false, Some(&state), true).unwrap(),
            vec!["alter table `t` add column `two` text".to_string()]
        );
    }

    #[test]
    fn test_type_change_triggers_rebuild() {
        let declared = SqliteTableSchema {
            columns: vec![
                declared_column("one", "integer"),
                declared_column("two", "text"),
                declared_column("three", "integer"),
            ],
            indexes: vec![TableIndex {
                columns: vec!["two".to_string(), "three".to_string()],
                name: None,
                is_unique: Some(true),
            }],
            ..Default::default()
        };
        let state = SqliteLiveTable {
            table: LiveTable {
                name: "t".to_string(),
                columns: vec![
                    live_column("one", "integer"),
                    live_column("two", "text"),
                    live_column("three", "text"),
                ],
                ..Default::default()
            },
            constraint_indexes: vec![Index {
                name: "sqlite_autoindex_t_1".to_string(),
                columns: vec!["two".to_string(), "three".to_string()],
                is_unique: Some(true),
            }],
        };

        let plan = plan_table("t", &declared, false, Some(&state), true).unwrap();
        let temp = ddl::rebuild_temp_name("t", &declared).unwrap();
        assert_eq!(
            plan,
            vec![
                "begin transaction".to_string(),
                format!("alter table `t` rename to `{temp}`"),
                "create table `t` (`one` integer, `two` text, `three` integer, unique (`two`, `three`))"
                    .to_string(),
                format!("insert into t (one,two,three) select one,two,three from {temp}"),
                format!("drop table {temp}"),
                "commit".to_string(),
            ]
        );
    }

    #[test]
    fn test_removed_column_triggers_rebuild() {
        let declared = SqliteTableSchema {
            columns: vec![declared_column("one", "integer")],
            ..Default::default()
        };
        let state = live(vec![
            live_column("one", "integer"),
            live_column("stale", "text"),
        ]);
        let plan = plan_table("t", &declared, false, Some(&state), true).unwrap();
        assert_eq!(plan[0], "begin transaction");
        assert!(plan.iter().any(|s| s.starts_with("insert into t (one) ")));
    }

    #[test]
    fn test_plain_index_changes_avoid_rebuild() {
        let declared = SqliteTableSchema {
            columns: vec![declared_column("one", "integer")],
            indexes: vec![TableIndex {
                columns: vec!["one".to_string()],
                name: None,
                is_unique: None,
            }],
            ..Default::default()
        };
        let state = live(vec![live_column("one", "integer")]);
        assert_eq!(
            plan_table("t", &declared, false, Some(&state), true).unwrap(),
            vec!["create index `idx_t_one` on `t` (`one`)".to_string()]
        );
    }
}
