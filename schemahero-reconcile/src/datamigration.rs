//! Row-level data-migration planning.
//!
//! Every emitted statement carries a comment line identifying the
//! migration and the 1-based operation index, so the generated DDL reads
//! back unambiguously from the Migration resource.

use schemahero_schema::v1alpha4::{
    CalculatedUpdate, CustomSql, DataMigration, FormatChange, StaticUpdate, StringTransform,
    TransformUpdate,
};

use crate::error::{ReconcileError, ReconcileResult};

const FORBIDDEN_FRAGMENTS: &[&str] = &["drop table", "drop database", "truncate", "delete from"];

fn comment(name: &str, index: usize) -> String {
    format!("-- Data Migration: {} (Operation {})", name, index)
}

fn static_update_statement(table: &str, update: &StaticUpdate) -> String {
    let set: Vec<String> = update
        .set
        .iter()
        .map(|cv| {
            format!(
                "{} = {}",
                cv.column,
                schemahero_postgres::ddl::encode_value(&cv.value)
            )
        })
        .collect();
    let mut statement = format!("update {} set {}", table, set.join(", "));
    if let Some(clause) = &update.where_clause {
        statement.push_str(&format!(" where {}", clause));
    }
    statement
}

fn calculated_update_statement(table: &str, update: &CalculatedUpdate) -> String {
    let set: Vec<String> = update
        .set
        .iter()
        .map(|ce| format!("{} = {}", ce.column, ce.expression))
        .collect();
    let mut statement = format!("update {} set {}", table, set.join(", "));
    if let Some(clause) = &update.where_clause {
        statement.push_str(&format!(" where {}", clause));
    }
    statement
}

fn transform_expression(
    migration: &str,
    transform: &TransformUpdate,
) -> ReconcileResult<String> {
    let column = &transform.column;
    if let Some(tz) = &transform.timezone_convert {
        return Ok(format!(
            "{} AT TIME ZONE '{}' AT TIME ZONE '{}'",
            column, tz.from, tz.to
        ));
    }
    if let Some(target) = &transform.type_cast {
        return Ok(format!("{}::{}", column, target));
    }
    if let Some(format) = &transform.format_change {
        let function = match format {
            FormatChange::Uppercase => "UPPER",
            FormatChange::Lowercase => "LOWER",
            FormatChange::Trim => "TRIM",
        };
        return Ok(format!("{}({})", function, column));
    }
    if let Some(string) = &transform.string_transform {
        return string_transform_expression(migration, column, string);
    }
    Err(ReconcileError::validation(
        migration,
        format!("transform of column {} sets no transform kind", column),
    ))
}

fn string_transform_expression(
    migration: &str,
    column: &str,
    transform: &StringTransform,
) -> ReconcileResult<String> {
    if let Some(replace) = &transform.replace {
        return Ok(format!(
            "replace({}, '{}', '{}')",
            column,
            replace.old.replace('\'', "''"),
            replace.new.replace('\'', "''")
        ));
    }
    if let Some(substring) = &transform.substring {
        return Ok(match substring.length {
            Some(length) => format!("substring({}, {}, {})", column, substring.start, length),
            None => format!("substring({}, {})", column, substring.start),
        });
    }
    Err(ReconcileError::validation(
        migration,
        format!("string transform of column {} sets no branch", column),
    ))
}

fn guard_custom_sql(migration: &str, custom: &CustomSql) -> ReconcileResult<()> {
    let lowered = custom.sql.trim().to_lowercase();
    let starts_ok = ["update", "insert", "with"]
        .iter()
        .any(|prefix| lowered.starts_with(prefix));
    if !starts_ok {
        return Err(ReconcileError::validation(
            migration,
            "custom sql must start with UPDATE, INSERT or WITH",
        ));
    }
    if custom.validate {
        for fragment in FORBIDDEN_FRAGMENTS {
            if lowered.contains(fragment) {
                return Err(ReconcileError::validation(
                    migration,
                    format!("custom sql contains forbidden fragment '{}'", fragment),
                ));
            }
        }
    }
    Ok(())
}

/// Plan the statements for one data migration. Each statement is prefixed
/// with its identifying comment line.
pub fn plan_data_migration(migration: &DataMigration) -> ReconcileResult<Vec<String>> {
    let table = &migration.spec.table_name;
    let mut statements = Vec::with_capacity(migration.spec.operations.len());

    for (i, operation) in migration.spec.operations.iter().enumerate() {
        operation.validate(&migration.name, i)?;
        let index = i + 1;

        let sql = if let Some(update) = &operation.update {
            static_update_statement(table, update)
        } else if let Some(update) = &operation.calculate {
            calculated_update_statement(table, update)
        } else if let Some(transform) = &operation.convert {
            let expression = transform_expression(&migration.name, transform)?;
            format!(
                "update {} set {} = {}",
                table, transform.column, expression
            )
        } else if let Some(custom) = &operation.custom_sql {
            guard_custom_sql(&migration.name, custom)?;
            custom.sql.trim().to_string()
        } else {
            // operation.validate already rejected this shape.
            return Err(ReconcileError::validation(
                &migration.name,
                format!("operation {} sets no branch", index),
            ));
        };

        statements.push(format!("{}\n{}", comment(&migration.name, index), sql));
    }
    Ok(statements)
}
