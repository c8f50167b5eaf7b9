//! TimescaleDB schema planning.
//!
//! A TimescaleDB table is a PostgreSQL table plus optional hypertable,
//! compression and retention declarations. Planning emits the standard
//! Postgres statements first, then appends the timescale calls that are
//! still missing from the live state.

use schemahero_schema::model::LiveTable;
use schemahero_schema::v1alpha4::{
    Hypertable, PostgresViewSchema, SeedData, TimescaleDBTableSchema, TimescaleDBViewSchema,
};

use crate::ddl;
use crate::error::{TimescaleError, TimescaleResult};

/// What the live database already knows about one hypertable.
#[derive(Debug, Clone, Copy, Default)]
pub struct HypertableState {
    /// The table is registered as a hypertable.
    pub is_hypertable: bool,
    /// Compression is enabled on the hypertable.
    pub compression_enabled: bool,
    /// A compression policy job exists.
    pub has_compression_policy: bool,
    /// A retention policy job exists.
    pub has_retention_policy: bool,
}

fn validate_hypertable(
    table: &str,
    declared: &TimescaleDBTableSchema,
    hypertable: &Hypertable,
) -> TimescaleResult<()> {
    let has_column = |name: &str| declared.columns.iter().any(|c| c.name == name);

    if !has_column(&hypertable.time_column_name) {
        return Err(TimescaleError::validation(format!(
            "hypertable time column {} is not a column of table {}",
            hypertable.time_column_name, table
        )));
    }
    if let Some(partitioning) = &hypertable.partitioning_column {
        if !has_column(partitioning) {
            return Err(TimescaleError::validation(format!(
                "partitioning column {} is not a column of table {}",
                partitioning, table
            )));
        }
        if partitioning == &hypertable.time_column_name {
            return Err(TimescaleError::validation(format!(
                "partitioning column {} must differ from the time column",
                partitioning
            )));
        }
        if hypertable.number_partitions.is_none() {
            return Err(TimescaleError::validation(
                "numberPartitions is required when a partitioning column is set",
            ));
        }
    }
    Ok(())
}

/// Plan DDL for one table: the Postgres plan, then hypertable setup,
/// then compression and retention policies.
pub fn plan_table(
    table: &str,
    declared: &TimescaleDBTableSchema,
    live: Option<&LiveTable>,
    state: Option<&HypertableState>,
) -> TimescaleResult<Vec<String>> {
    let mut statements =
        schemahero_postgres::plan_table(table, &declared.as_postgres(), live)?;
    if declared.is_deleted.unwrap_or(false) {
        return Ok(statements);
    }

    let hypertable = match &declared.hypertable {
        Some(hypertable) => hypertable,
        None => return Ok(statements),
    };
    validate_hypertable(table, declared, hypertable)?;

    let state = state.copied().unwrap_or_default();
    if !state.is_hypertable {
        statements.push(ddl::create_hypertable_statement(table, hypertable));
    }

    if let Some(compression) = &hypertable.compression {
        if !state.compression_enabled {
            statements.push(ddl::enable_compression_statement(
                table,
                compression.segment_by.as_deref(),
            ));
        }
        if let Some(interval) = &compression.interval {
            if !state.has_compression_policy {
                statements.push(ddl::add_compression_policy_statement(table, interval));
            }
        }
    }

    if let Some(retention) = &hypertable.retention {
        if !state.has_retention_policy {
            statements.push(ddl::add_retention_policy_statement(
                table,
                &retention.interval,
            ));
        }
    }

    Ok(statements)
}

/// Plan seed data through the Postgres upsert path.
pub fn plan_seed_data(
    table: &str,
    declared: &TimescaleDBTableSchema,
    seed: &SeedData,
) -> Vec<String> {
    schemahero_postgres::plan_seed_data(table, &declared.as_postgres(), seed)
}

/// Plan DDL for one view. Continuous aggregates rebuild via drop and
/// create; anything else is a plain Postgres view.
pub fn plan_view(
    view: &str,
    declared: &TimescaleDBViewSchema,
    live_query: Option<&str>,
) -> Vec<String> {
    if !declared.is_continuous_aggregate.unwrap_or(false) {
        let postgres_view = PostgresViewSchema {
            query: declared.query.clone(),
            is_materialized: None,
            is_deleted: declared.is_deleted,
        };
        return schemahero_postgres::plan_view(view, &postgres_view, live_query);
    }

    if declared.is_deleted.unwrap_or(false) {
        return match live_query {
            Some(_) => vec![ddl::drop_continuous_aggregate_statement(view)],
            None => Vec::new(),
        };
    }
    match live_query {
        None => vec![ddl::create_continuous_aggregate_statement(view, declared)],
        Some(existing) if existing.trim() == declared.query.trim() => Vec::new(),
        Some(_) => vec![
            ddl::drop_continuous_aggregate_statement(view),
            ddl::create_continuous_aggregate_statement(view, declared),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schemahero_schema::v1alpha4::{HypertableCompression, PostgresTableColumn};

    fn column(name: &str, column_type: &str) -> PostgresTableColumn {
        PostgresTableColumn {
            name: name.to_string(),
            column_type: column_type.to_string(),
            ..Default::default()
        }
    }

    fn metrics_schema() -> TimescaleDBTableSchema {
        TimescaleDBTableSchema {
            columns: vec![
                column("time", "timestamptz"),
                column("val", "double precision"),
            ],
            hypertable: Some(Hypertable {
                time_column_name: "time".to_string(),
                chunk_time_interval: Some("7 days".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn new_hypertable_creates_table_then_registers_it() {
        let statements = plan_table("metrics", &metrics_schema(), None, None).unwrap();
        assert_eq!(
            statements,
            vec![
                "create table \"metrics\" (\"time\" timestamp with time zone, \"val\" double precision)",
                "select create_hypertable('metrics', 'time', chunk_time_interval => '7 days')",
            ]
        );
    }

    #[test]
    fn registered_hypertable_is_not_re_registered() {
        let mut declared = metrics_schema();
        declared.hypertable.as_mut().unwrap().compression = Some(HypertableCompression {
            segment_by: Some("val".to_string()),
            interval: Some("30 days".to_string()),
        });
        let live = LiveTable {
            name: "metrics".to_string(),
            columns: vec![
                schemahero_schema::model::Column {
                    name: "time".to_string(),
                    data_type: "timestamp with time zone".to_string(),
                    ..Default::default()
                },
                schemahero_schema::model::Column {
                    name: "val".to_string(),
                    data_type: "double precision".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let state = HypertableState {
            is_hypertable: true,
            compression_enabled: false,
            has_compression_policy: false,
            has_retention_policy: false,
        };
        let statements = plan_table("metrics", &declared, Some(&live), Some(&state)).unwrap();
        assert_eq!(
            statements,
            vec![
                "alter table \"metrics\" set (timescaledb.compress, timescaledb.compress_segmentby = 'val')",
                "select add_compression_policy('metrics', INTERVAL '30 days')",
            ]
        );
    }

    #[test]
    fn partitioning_column_requires_number_partitions() {
        let mut declared = metrics_schema();
        let hypertable = declared.hypertable.as_mut().unwrap();
        hypertable.partitioning_column = Some("val".to_string());
        assert!(matches!(
            plan_table("metrics", &declared, None, None),
            Err(TimescaleError::Validation(_))
        ));
    }

    #[test]
    fn continuous_aggregate_drops_as_materialized_view() {
        let declared = TimescaleDBViewSchema {
            query: "select 1".to_string(),
            is_continuous_aggregate: Some(true),
            is_deleted: Some(true),
            ..Default::default()
        };
        let statements = plan_view("metrics_hourly", &declared, Some("select 1"));
        assert_eq!(statements, vec!["drop materialized view \"metrics_hourly\""]);
    }
}
