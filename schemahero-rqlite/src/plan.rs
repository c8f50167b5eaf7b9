//! Planning for RQLite tables.
//!
//! RQLite is SQLite behind an HTTP consensus layer: the shared SQLite
//! planner does the diffing, with the transaction wrapper disabled so a
//! table rebuild runs as one `/db/execute` batch. The `strict` flag
//! restricts column types to the five storage classes.

use schemahero_schema::v1alpha4::{RqliteTableSchema, SeedData};
use schemahero_sqlite::SqliteLiveTable;

use crate::error::RqliteResult;

/// Plan DDL for one table against the introspected state.
pub fn plan_table(
    table: &str,
    declared: &RqliteTableSchema,
    live: Option<&SqliteLiveTable>,
) -> RqliteResult<Vec<String>> {
    let strict = declared.strict.unwrap_or(false);
    let statements =
        schemahero_sqlite::plan_table(table, &declared.as_sqlite(), strict, live, false)?;
    Ok(statements)
}

/// Seed-data statements, planned after schema statements.
pub fn plan_seed_data(table: &str, declared: &RqliteTableSchema, seed: &SeedData) -> Vec<String> {
    schemahero_sqlite::plan_seed_data(table, &declared.as_sqlite(), seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schemahero_schema::v1alpha4::{SqliteTableColumn, EMPTY_STRING_DEFAULT_SENTINEL};

    #[test]
    fn test_create_strict_table() {
        let declared = RqliteTableSchema {
            columns: vec![SqliteTableColumn {
                name: "id".to_string(),
                column_type: "integer".to_string(),
                ..Default::default()
            }],
            primary_key: vec!["id".to_string()],
            strict: Some(true),
            ..Default::default()
        };
        let plan = plan_table("t", &declared, None).unwrap();
        assert_eq!(
            plan,
            vec!["create table `t` (`id` integer, primary key (`id`)) strict".to_string()]
        );
    }

    #[test]
    fn test_strict_rejects_affinity_types() {
        let declared = RqliteTableSchema {
            columns: vec![SqliteTableColumn {
                name: "name".to_string(),
                column_type: "varchar(50)".to_string(),
                ..Default::default()
            }],
            strict: Some(true),
            ..Default::default()
        };
        assert!(plan_table("t", &declared, None).is_err());
    }

    #[test]
    fn test_empty_string_sentinel_round_trips() {
        let declared = RqliteTableSchema {
            columns: vec![SqliteTableColumn {
                name: "note".to_string(),
                column_type: "text".to_string(),
                default: Some(EMPTY_STRING_DEFAULT_SENTINEL.to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let plan = plan_table("t", &declared, None).unwrap();
        assert_eq!(
            plan,
            vec!["create table `t` (`note` text default '')".to_string()]
        );
    }

    #[test]
    fn test_rebuild_runs_without_transaction_wrapper() {
        use schemahero_schema::model::{Column, LiveTable};

        let declared = RqliteTableSchema {
            columns: vec![SqliteTableColumn {
                name: "a".to_string(),
                column_type: "integer".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let live = SqliteLiveTable {
            table: LiveTable {
                name: "t".to_string(),
                columns: vec![Column {
                    name: "a".to_string(),
                    data_type: "text".to_string(),
                    ..Default::default()
                }],
                ..Default::default()
            },
            constraint_indexes: Vec::new(),
        };
        let plan = plan_table("t", &declared, Some(&live)).unwrap();
        assert!(!plan.contains(&"begin transaction".to_string()));
        assert!(plan[0].starts_with("alter table `t` rename to"));
    }
}
