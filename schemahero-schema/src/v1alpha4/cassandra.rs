//! Cassandra table and user-defined type schemas.

use serde::{Deserialize, Serialize};

/// A declared Cassandra table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CassandraTableSchema {
    /// Composite primary key: a list of lists. The first inner list is the
    /// partition key (composite when it has more than one column); each
    /// subsequent list contributes clustering columns.
    #[serde(rename = "primaryKey", default, skip_serializing_if = "Vec::is_empty")]
    pub primary_key: Vec<Vec<String>>,
    /// Clustering order.
    #[serde(rename = "clusteringOrder", skip_serializing_if = "Option::is_none")]
    pub clustering_order: Option<CassandraClusteringOrder>,
    /// Columns, in order.
    #[serde(default)]
    pub columns: Vec<CassandraColumn>,
    /// Table properties.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<CassandraTableProperties>,
    /// When true, the table should be dropped.
    #[serde(rename = "isDeleted", skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,
}

/// Clustering order for one clustering column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CassandraClusteringOrder {
    /// The clustering column.
    pub column: String,
    /// Descending when true; ascending otherwise.
    #[serde(rename = "isDescending", skip_serializing_if = "Option::is_none")]
    pub is_descending: Option<bool>,
}

/// A declared Cassandra column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CassandraColumn {
    /// Column name.
    pub name: String,
    /// CQL type; case-folded and validated before diffing.
    #[serde(rename = "type")]
    pub column_type: String,
    /// Whether the column is static.
    #[serde(rename = "isStatic", skip_serializing_if = "Option::is_none")]
    pub is_static: Option<bool>,
}

/// Cassandra table properties.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CassandraTableProperties {
    #[serde(rename = "bloomFilterFPChance", skip_serializing_if = "Option::is_none")]
    pub bloom_filter_fp_chance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caching: Option<std::collections::BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(rename = "gcGraceSeconds", skip_serializing_if = "Option::is_none")]
    pub gc_grace_seconds: Option<i64>,
    #[serde(rename = "defaultTTL", skip_serializing_if = "Option::is_none")]
    pub default_ttl: Option<i64>,
}

/// A declared Cassandra user-defined type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CassandraDataTypeSchema {
    /// Fields of the type, in order.
    #[serde(default)]
    pub fields: Vec<CassandraField>,
    /// When true, the type should be dropped.
    #[serde(rename = "isDeleted", skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,
}

/// One field of a user-defined type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CassandraField {
    /// Field name.
    pub name: String,
    /// Field CQL type.
    #[serde(rename = "type")]
    pub field_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_primary_key_yaml() {
        let yaml = r#"
primaryKey:
  - [a, b]
  - [c]
columns:
  - name: a
    type: int
  - name: b
    type: int
  - name: c
    type: int
"#;
        let schema: CassandraTableSchema = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(schema.primary_key.len(), 2);
        assert_eq!(schema.primary_key[0], vec!["a".to_string(), "b".to_string()]);
        assert_eq!(schema.primary_key[1], vec!["c".to_string()]);
    }
}
