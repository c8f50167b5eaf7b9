//! TimescaleDB table and continuous-aggregate view schemas.
//!
//! A TimescaleDB table is a PostgreSQL table plus optional hypertable,
//! compression and retention declarations.

use serde::{Deserialize, Serialize};

use super::common::{TableForeignKey, TableIndex};
use super::postgres::PostgresTableColumn;

/// A declared TimescaleDB table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimescaleDBTableSchema {
    /// Primary key columns, in order.
    #[serde(rename = "primaryKey", default, skip_serializing_if = "Vec::is_empty")]
    pub primary_key: Vec<String>,
    /// Foreign keys.
    #[serde(rename = "foreignKeys", default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<TableForeignKey>,
    /// Indexes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<TableIndex>,
    /// Columns, in order; plain Postgres columns.
    #[serde(default)]
    pub columns: Vec<PostgresTableColumn>,
    /// Hypertable declaration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hypertable: Option<Hypertable>,
    /// When true, the table should be dropped.
    #[serde(rename = "isDeleted", skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,
}

impl TimescaleDBTableSchema {
    /// View the relational part of the declaration as a plain PostgreSQL
    /// table schema. Hypertable, compression and retention declarations
    /// are planned separately.
    pub fn as_postgres(&self) -> super::postgres::PostgresTableSchema {
        super::postgres::PostgresTableSchema {
            primary_key: self.primary_key.clone(),
            foreign_keys: self.foreign_keys.clone(),
            indexes: self.indexes.clone(),
            columns: self.columns.clone(),
            is_deleted: self.is_deleted,
        }
    }
}

/// Hypertable parameters. On emit these render in a fixed order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hypertable {
    /// Time dimension column; required.
    #[serde(rename = "timeColumnName")]
    pub time_column_name: String,
    /// Space-partitioning column. Must exist and must differ from the time
    /// column; requires `numberPartitions` when set.
    #[serde(rename = "partitioningColumn", skip_serializing_if = "Option::is_none")]
    pub partitioning_column: Option<String>,
    #[serde(rename = "numberPartitions", skip_serializing_if = "Option::is_none")]
    pub number_partitions: Option<i64>,
    #[serde(rename = "chunkTimeInterval", skip_serializing_if = "Option::is_none")]
    pub chunk_time_interval: Option<String>,
    #[serde(rename = "createDefaultIndexes", skip_serializing_if = "Option::is_none")]
    pub create_default_indexes: Option<bool>,
    #[serde(rename = "ifNotExists", skip_serializing_if = "Option::is_none")]
    pub if_not_exists: Option<bool>,
    #[serde(rename = "partitioningFunc", skip_serializing_if = "Option::is_none")]
    pub partitioning_func: Option<String>,
    #[serde(rename = "associatedSchemaName", skip_serializing_if = "Option::is_none")]
    pub associated_schema_name: Option<String>,
    #[serde(rename = "associatedTablePrefix", skip_serializing_if = "Option::is_none")]
    pub associated_table_prefix: Option<String>,
    #[serde(rename = "migrateData", skip_serializing_if = "Option::is_none")]
    pub migrate_data: Option<bool>,
    #[serde(rename = "timePartitioningFunc", skip_serializing_if = "Option::is_none")]
    pub time_partitioning_func: Option<String>,
    #[serde(rename = "replicationFactor", skip_serializing_if = "Option::is_none")]
    pub replication_factor: Option<i64>,
    /// Compression policy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression: Option<HypertableCompression>,
    /// Retention policy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention: Option<HypertableRetention>,
}

/// Compression policy for a hypertable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HypertableCompression {
    /// Column to segment compressed chunks by.
    #[serde(rename = "segmentBy", skip_serializing_if = "Option::is_none")]
    pub segment_by: Option<String>,
    /// Compress chunks older than this interval, e.g. `7 days`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
}

/// Retention policy for a hypertable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HypertableRetention {
    /// Drop chunks older than this interval, e.g. `90 days`.
    pub interval: String,
}

/// A declared TimescaleDB view; continuous aggregates are materialized
/// views with `timescaledb.continuous`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimescaleDBViewSchema {
    /// The SELECT that defines the view.
    pub query: String,
    /// Whether this is a continuous aggregate.
    #[serde(rename = "isContinuousAggregate", skip_serializing_if = "Option::is_none")]
    pub is_continuous_aggregate: Option<bool>,
    /// Create the view WITH NO DATA.
    #[serde(rename = "withNoData", skip_serializing_if = "Option::is_none")]
    pub with_no_data: Option<bool>,
    /// When true, the view should be dropped.
    #[serde(rename = "isDeleted", skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hypertable_yaml() {
        let yaml = r#"
timeColumnName: time
chunkTimeInterval: 7 days
compression:
  segmentBy: device_id
  interval: 30 days
"#;
        let h: Hypertable = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(h.time_column_name, "time");
        assert_eq!(h.chunk_time_interval.as_deref(), Some("7 days"));
        assert_eq!(
            h.compression.as_ref().unwrap().segment_by.as_deref(),
            Some("device_id")
        );
    }
}
