//! Declarative-vs-live diffing for PostgreSQL tables, views, functions
//! and extensions.
//!
//! Planning is pure: it takes the declared schema and the normalized
//! catalog state and returns ordered DDL statements. Statement order is
//! columns, then the primary key, then foreign keys, then indexes; drops
//! come before adds within each group.

use schemahero_schema::model::{Column, KeyConstraint, LiveTable};
use schemahero_schema::v1alpha4::{
    PostgresFunctionSchema, PostgresTableColumn, PostgresTableSchema, PostgresViewSchema, SeedData,
};

use crate::ddl;
use crate::error::PostgresResult;
use crate::types::normalize_column_type;

/// Normalize a declared column into the comparison model. Honors the
/// canonical type table, array suffixes and parameter defaults.
pub fn declared_column_to_model(
    declared: &PostgresTableColumn,
    _primary_key: &[String],
) -> PostgresResult<Column> {
    let normalized = normalize_column_type(&declared.name, &declared.column_type)?;
    Ok(Column {
        name: declared.name.clone(),
        data_type: normalized.data_type,
        is_array: normalized.is_array,
        default: declared.default.clone(),
        constraints: declared.constraints.clone(),
        attributes: declared.attributes.clone(),
        ..Default::default()
    })
}

/// Plan DDL for one table. `live` is the introspected state, None when
/// the table does not exist yet.
pub fn plan_table(
    table: &str,
    declared: &PostgresTableSchema,
    live: Option<&LiveTable>,
) -> PostgresResult<Vec<String>> {
    if declared.is_deleted.unwrap_or(false) {
        return Ok(match live {
            Some(_) => vec![ddl::drop_table_statement(table)],
            None => Vec::new(),
        });
    }

    let live = match live {
        Some(live) => live,
        None => {
            let mut statements = vec![ddl::create_table_statement(table, declared)?];
            // Unique indexes land inline as constraints; the rest are
            // separate statements.
            for index in &declared.indexes {
                if !index.is_unique.unwrap_or(false) {
                    statements.push(ddl::create_index_statement(table, index));
                }
            }
            return Ok(statements);
        }
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
    declared: &PostgresTableSchema,
    live: &LiveTable,
) -> PostgresResult<Vec<String>> {
    let mut statements = Vec::new();

    for declared_column in &declared.columns {
        let wanted = declared_column_to_model(declared_column, &declared.primary_key)?;
        match live.column(&wanted.name) {
            None => statements.push(ddl::add_column_statement(table, &wanted)),
            Some(existing) => {
                let is_pk = declared.primary_key.contains(&wanted.name);
                statements.extend(alter_column_statements(table, &wanted, existing, is_pk));
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

/// Statements to reconcile one existing column. Adding a not-null to a
/// previously nullable column with a declared default is split into the
/// three-statement pattern: set default, backfill nulls, set not null.
fn alter_column_statements(
    table: &str,
    wanted: &Column,
    existing: &Column,
    is_pk: bool,
) -> Vec<String> {
    let type_changed = wanted.data_type != existing.data_type || wanted.is_array != existing.is_array;
    let default_changed = wanted.default != existing.default;
    let wanted_not_null = wanted.is_not_null();
    let existing_not_null = existing.is_not_null();

    let rendered_type = if wanted.is_array {
        format!("{}[]", wanted.data_type)
    } else {
        wanted.data_type.clone()
    };

    // Primary key columns are implicitly not null; only the explicit
    // attributes are diffed.
    if !is_pk && wanted_not_null && !existing_not_null {
        let mut statements = Vec::new();
        if type_changed {
            statements.push(ddl::alter_column_statement(
                table,
                &wanted.name,
                &[format!("type {rendered_type}")],
            ));
        }
        match &wanted.default {
            Some(default) => {
                statements.push(ddl::alter_column_statement(
                    table,
                    &wanted.name,
                    &[format!("set default {}", ddl::encode_value(default))],
                ));
                statements.push(ddl::backfill_nulls_statement(table, &wanted.name, default));
                statements.push(ddl::alter_column_statement(
                    table,
                    &wanted.name,
                    &["set not null".to_string()],
                ));
            }
            None => {
                statements.push(ddl::alter_column_statement(
                    table,
                    &wanted.name,
                    &["set not null".to_string()],
                ));
            }
        }
        return statements;
    }

    let mut actions = Vec::new();
    if type_changed {
        actions.push(format!("type {rendered_type}"));
    }
    if default_changed {
        match &wanted.default {
            Some(default) => actions.push(format!("set default {}", ddl::encode_value(default))),
            None => actions.push("drop default".to_string()),
        }
    }
    if !is_pk && !wanted_not_null && existing_not_null {
        actions.push("drop not null".to_string());
    }

    if actions.is_empty() {
        Vec::new()
    } else {
        vec![ddl::alter_column_statement(table, &wanted.name, &actions)]
    }
}

fn primary_key_statements(
    table: &str,
    declared: &PostgresTableSchema,
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
        (Some(wanted), Some(existing)) => vec![
            ddl::drop_constraint_statement(table, &live_pk_name(table, existing)),
            ddl::add_primary_key_statement(table, wanted),
        ],
        (Some(wanted), None) => vec![ddl::add_primary_key_statement(table, wanted)],
        (None, Some(existing)) => {
            vec![ddl::drop_constraint_statement(table, &live_pk_name(table, existing))]
        }
    }
}

fn live_pk_name(table: &str, existing: &KeyConstraint) -> String {
    match &existing.name {
        Some(name) if !name.is_empty() => name.clone(),
        _ => KeyConstraint::generated_pk_name(table),
    }
}

fn foreign_key_statements(
    table: &str,
    declared: &PostgresTableSchema,
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
            statements.push(ddl::drop_constraint_statement(table, &existing.name));
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
    declared: &PostgresTableSchema,
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
            statements.push(ddl::drop_index_statement(
                &existing.name,
                existing.is_unique.unwrap_or(false),
            ));
        }
    }
    for (declared_idx, model) in declared.indexes.iter().zip(&wanted) {
        if !live.indexes.iter().any(|idx| idx.equals(model)) {
            statements.push(ddl::create_index_statement(table, declared_idx));
        }
    }
    statements
}

/// Seed-data statements. Planned after schema statements; an upsert when
/// the table declares a primary key.
pub fn plan_seed_data(table: &str, declared: &PostgresTableSchema, seed: &SeedData) -> Vec<String> {
    ddl::seed_data_statements(table, &declared.primary_key, seed)
}

/// Plan DDL for one view. `live_query` is the current definition when
/// the view exists.
pub fn plan_view(
    view: &str,
    declared: &PostgresViewSchema,
    live_query: Option<&str>,
) -> Vec<String> {
    let is_materialized = declared.is_materialized.unwrap_or(false);
    if declared.is_deleted.unwrap_or(false) {
        return match live_query {
            Some(_) => vec![ddl::drop_view_statement(view, is_materialized)],
            None => Vec::new(),
        };
    }
    match live_query {
        None => vec![ddl::create_view_statement(view, declared)],
        Some(existing) if existing.trim() == declared.query.trim() => Vec::new(),
        Some(_) if is_materialized => vec![
            // Materialized views have no CREATE OR REPLACE; rebuild.
            ddl::drop_view_statement(view, true),
            ddl::create_view_statement(view, declared),
        ],
        Some(_) => vec![ddl::create_view_statement(view, declared)],
    }
}

/// Plan DDL for one function. CREATE OR REPLACE is idempotent, so an
/// existing function is always re-planned when the body hash differs.
pub fn plan_function(
    name: &str,
    declared: &PostgresFunctionSchema,
    exists: bool,
) -> Vec<String> {
    if declared.is_deleted.unwrap_or(false) {
        return if exists {
            vec![ddl::drop_function_statement(name)]
        } else {
            Vec::new()
        };
    }
    vec![ddl::create_function_statement(name, declared)]
}

/// Plan one extension against the installed set. The statement keeps its
/// trailing semicolon; extensions are the exception to the no-semicolon
/// rule.
pub fn plan_extension(
    declared: &schemahero_schema::v1alpha4::PostgresDatabaseExtension,
    installed: &[String],
) -> Vec<String> {
    if installed.iter().any(|name| name == &declared.name) {
        return Vec::new();
    }
    vec![ddl::create_extension_statement(declared)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schemahero_schema::model::{ColumnConstraints, ForeignKey, Index};
    use schemahero_schema::v1alpha4::{ForeignKeyReferences, TableForeignKey, TableIndex};

    fn declared_column(name: &str, column_type: &str) -> PostgresTableColumn {
        PostgresTableColumn {
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

    #[test]
    fn test_plan_creates_missing_table() {
        let declared = PostgresTableSchema {
            columns: vec![declared_column("id", "integer")],
            primary_key: vec!["id".to_string()],
            ..Default::default()
        };
        let plan = plan_table("simple", &declared, None).unwrap();
        assert_eq!(
            plan,
            vec![r#"create table "simple" ("id" integer, primary key ("id"))"#.to_string()]
        );
    }

    #[test]
    fn test_plan_is_empty_when_converged() {
        let declared = PostgresTableSchema {
            columns: vec![declared_column("id", "int8")],
            primary_key: vec!["id".to_string()],
            ..Default::default()
        };
        let live = LiveTable {
            name: "t".to_string(),
            columns: vec![Column {
                constraints: Some(ColumnConstraints {
                    not_null: Some(true),
                }),
                ..live_column("id", "bigint")
            }],
            primary_key: Some(KeyConstraint {
                name: Some("t_pkey".to_string()),
                columns: vec!["id".to_string()],
                is_primary: true,
            }),
            ..Default::default()
        };
        let plan = plan_table("t", &declared, Some(&live)).unwrap();
        assert!(plan.is_empty(), "unexpected statements: {plan:?}");
    }

    #[test]
    fn test_not_null_add_is_three_statements() {
        let declared = PostgresTableSchema {
            columns: vec![PostgresTableColumn {
                constraints: Some(ColumnConstraints {
                    not_null: Some(true),
                }),
                default: Some("11".to_string()),
                ..declared_column("a", "integer")
            }],
            ..Default::default()
        };
        let live = LiveTable {
            name: "t".to_string(),
            columns: vec![live_column("a", "integer")],
            ..Default::default()
        };
        let plan = plan_table("t", &declared, Some(&live)).unwrap();
        assert_eq!(
            plan,
            vec![
                r#"alter table "t" alter column "a" set default '11'"#.to_string(),
                r#"update "t" set "a"='11' where "a" is null"#.to_string(),
                r#"alter table "t" alter column "a" set not null"#.to_string(),
            ]
        );
    }

    #[test]
    fn test_type_and_default_change_share_one_statement() {
        let declared = PostgresTableSchema {
            columns: vec![PostgresTableColumn {
                default: Some("x".to_string()),
                ..declared_column("a", "text")
            }],
            ..Default::default()
        };
        let live = LiveTable {
            name: "t".to_string(),
            columns: vec![live_column("a", "integer")],
            ..Default::default()
        };
        let plan = plan_table("t", &declared, Some(&live)).unwrap();
        assert_eq!(
            plan,
            vec![
                r#"alter table "t" alter column "a" type text, alter column "a" set default 'x'"#
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_removed_column_is_dropped() {
        let declared = PostgresTableSchema {
            columns: vec![declared_column("id", "integer")],
            ..Default::default()
        };
        let live = LiveTable {
            name: "t".to_string(),
            columns: vec![live_column("id", "integer"), live_column("stale", "text")],
            ..Default::default()
        };
        let plan = plan_table("t", &declared, Some(&live)).unwrap();
        assert_eq!(plan, vec![r#"alter table "t" drop column "stale""#.to_string()]);
    }

    #[test]
    fn test_foreign_key_drops_precede_adds() {
        let declared = PostgresTableSchema {
            columns: vec![
                declared_column("id", "integer"),
                declared_column("owner_id", "integer"),
            ],
            foreign_keys: vec![TableForeignKey {
                columns: vec!["owner_id".to_string()],
                references: ForeignKeyReferences {
                    table: "owners".to_string(),
                    columns: vec!["id".to_string()],
                },
                name: None,
                on_delete: None,
            }],
            ..Default::default()
        };
        let live = LiveTable {
            name: "pets".to_string(),
            columns: vec![
                live_column("id", "integer"),
                live_column("owner_id", "integer"),
            ],
            foreign_keys: vec![ForeignKey {
                name: "pets_owner_id_fkey".to_string(),
                parent_table: "owners".to_string(),
                child_columns: vec!["owner_id".to_string()],
                parent_columns: vec!["id".to_string()],
                on_delete: "CASCADE".to_string(),
            }],
            ..Default::default()
        };
        let plan = plan_table("pets", &declared, Some(&live)).unwrap();
        assert_eq!(
            plan,
            vec![
                r#"alter table "pets" drop constraint "pets_owner_id_fkey""#.to_string(),
                r#"alter table "pets" add constraint "pets_owner_id_fkey" foreign key ("owner_id") references "owners" ("id")"#
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_index_reconciliation() {
        let declared = PostgresTableSchema {
            columns: vec![declared_column("email", "text")],
            indexes: vec![TableIndex {
                columns: vec!["email".to_string()],
                name: None,
                is_unique: None,
            }],
            ..Default::default()
        };
        let live = LiveTable {
            name: "users".to_string(),
            columns: vec![live_column("email", "text")],
            indexes: vec![Index {
                name: "idx_users_stale".to_string(),
                columns: vec!["stale".to_string()],
                is_unique: None,
            }],
            ..Default::default()
        };
        let plan = plan_table("users", &declared, Some(&live)).unwrap();
        assert_eq!(
            plan,
            vec![
                r#"drop index "idx_users_stale""#.to_string(),
                r#"create index "idx_users_email" on "users" ("email")"#.to_string(),
            ]
        );
    }

    #[test]
    fn test_is_deleted_plans_drop() {
        let declared = PostgresTableSchema {
            is_deleted: Some(true),
            ..Default::default()
        };
        let live = LiveTable {
            name: "t".to_string(),
            ..Default::default()
        };
        assert_eq!(
            plan_table("t", &declared, Some(&live)).unwrap(),
            vec![r#"drop table "t""#.to_string()]
        );
        assert!(plan_table("t", &declared, None).unwrap().is_empty());
    }

    #[test]
    fn test_plan_view_materialized_rebuild() {
        let declared = PostgresViewSchema {
            query: "select 1".to_string(),
            is_materialized: Some(true),
            is_deleted: None,
        };
        let plan = plan_view("v", &declared, Some("select 2"));
        assert_eq!(
            plan,
            vec![
                r#"drop materialized view "v""#.to_string(),
                r#"create materialized view "v" as select 1"#.to_string(),
            ]
        );
        assert!(plan_view("v", &declared, Some("select 1")).is_empty());
    }
}
