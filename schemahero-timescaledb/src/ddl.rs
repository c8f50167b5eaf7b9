//! TimescaleDB statement rendering.
//!
//! Hypertable parameters render in a fixed order so the same declaration
//! always produces the same statement text.

use schemahero_schema::v1alpha4::{Hypertable, TimescaleDBViewSchema};

fn quote(ident: &str) -> String {
    format!("\"{}\"", ident)
}

fn push_str_param(params: &mut Vec<String>, name: &str, value: &Option<String>) {
    if let Some(value) = value {
        params.push(format!("{} => '{}'", name, value));
    }
}

fn push_bool_param(params: &mut Vec<String>, name: &str, value: Option<bool>) {
    if let Some(value) = value {
        params.push(format!("{} => {}", name, value));
    }
}

/// Render `select create_hypertable(...)` from a hypertable declaration.
pub fn create_hypertable_statement(table: &str, hypertable: &Hypertable) -> String {
    let mut params = Vec::new();
    push_str_param(
        &mut params,
        "partitioning_column",
        &hypertable.partitioning_column,
    );
    if let Some(n) = hypertable.number_partitions {
        params.push(format!("number_partitions => {}", n));
    }
    push_str_param(
        &mut params,
        "chunk_time_interval",
        &hypertable.chunk_time_interval,
    );
    push_bool_param(
        &mut params,
        "create_default_indexes",
        hypertable.create_default_indexes,
    );
    push_bool_param(&mut params, "if_not_exists", hypertable.if_not_exists);
    push_str_param(
        &mut params,
        "partitioning_func",
        &hypertable.partitioning_func,
    );
    push_str_param(
        &mut params,
        "associated_schema_name",
        &hypertable.associated_schema_name,
    );
    push_str_param(
        &mut params,
        "associated_table_prefix",
        &hypertable.associated_table_prefix,
    );
    push_bool_param(&mut params, "migrate_data", hypertable.migrate_data);
    push_str_param(
        &mut params,
        "time_partitioning_func",
        &hypertable.time_partitioning_func,
    );
    if let Some(n) = hypertable.replication_factor {
        params.push(format!("replication_factor => {}", n));
    }

    let mut statement = format!(
        "select create_hypertable('{}', '{}'",
        table, hypertable.time_column_name
    );
    for param in params {
        statement.push_str(", ");
        statement.push_str(&param);
    }
    statement.push(')');
    statement
}

/// Render the `alter table ... set` statement enabling compression.
pub fn enable_compression_statement(table: &str, segment_by: Option<&str>) -> String {
    match segment_by {
        Some(column) => format!(
            "alter table {} set (timescaledb.compress, timescaledb.compress_segmentby = '{}')",
            quote(table),
            column
        ),
        None => format!("alter table {} set (timescaledb.compress)", quote(table)),
    }
}

/// Render `select add_compression_policy(...)`.
pub fn add_compression_policy_statement(table: &str, interval: &str) -> String {
    format!(
        "select add_compression_policy('{}', INTERVAL '{}')",
        table, interval
    )
}

/// Render `select add_retention_policy(...)`.
pub fn add_retention_policy_statement(table: &str, interval: &str) -> String {
    format!(
        "select add_retention_policy('{}', interval '{}')",
        table, interval
    )
}

/// Render the continuous-aggregate materialized view definition.
pub fn create_continuous_aggregate_statement(
    view: &str,
    declared: &TimescaleDBViewSchema,
) -> String {
    let mut statement = format!(
        "create materialized view {} with (timescaledb.continuous) as {}",
        quote(view),
        declared.query
    );
    if declared.with_no_data.unwrap_or(false) {
        statement.push_str(" with no data");
    }
    statement
}

/// Continuous aggregates are materialized views underneath.
pub fn drop_continuous_aggregate_statement(view: &str) -> String {
    format!("drop materialized view {}", quote(view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn hypertable_parameters_render_in_fixed_order() {
        let hypertable = Hypertable {
            time_column_name: "time".to_string(),
            partitioning_column: Some("device_id".to_string()),
            number_partitions: Some(4),
            chunk_time_interval: Some("7 days".to_string()),
            if_not_exists: Some(true),
            ..Default::default()
        };
        assert_eq!(
            create_hypertable_statement("metrics", &hypertable),
            "select create_hypertable('metrics', 'time', partitioning_column => 'device_id', number_partitions => 4, chunk_time_interval => '7 days', if_not_exists => true)"
        );
    }

    #[test]
    fn compression_with_segment_by() {
        assert_eq!(
            enable_compression_statement("metrics", Some("device_id")),
            "alter table \"metrics\" set (timescaledb.compress, timescaledb.compress_segmentby = 'device_id')"
        );
    }

    #[test]
    fn continuous_aggregate_with_no_data() {
        let declared = TimescaleDBViewSchema {
            query: "select time_bucket('1 hour', time) as bucket, avg(val) from metrics group by bucket".to_string(),
            is_continuous_aggregate: Some(true),
            with_no_data: Some(true),
            ..Default::default()
        };
        assert_eq!(
            create_continuous_aggregate_statement("metrics_hourly", &declared),
            "create materialized view \"metrics_hourly\" with (timescaledb.continuous) as select time_bucket('1 hour', time) as bucket, avg(val) from metrics group by bucket with no data"
        );
    }
}
