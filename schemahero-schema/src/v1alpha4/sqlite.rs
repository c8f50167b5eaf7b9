//! SQLite and RQLite table schemas.

use serde::{Deserialize, Serialize};

use crate::model::{ColumnAttributes, ColumnConstraints};

use super::common::{TableForeignKey, TableIndex};

/// Sentinel carried through the declarative layer to preserve the difference
/// between "no default" and "default of empty string" across YAML round-trip.
pub const EMPTY_STRING_DEFAULT_SENTINEL: &str = "__SCHEMAHERO_EMPTY_STRING_DEFAULT__";

/// A declared SQLite table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SqliteTableSchema {
    /// Primary key columns, in order.
    #[serde(rename = "primaryKey", default, skip_serializing_if = "Vec::is_empty")]
    pub primary_key: Vec<String>,
    /// Foreign keys.
    #[serde(rename = "foreignKeys", default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<TableForeignKey>,
    /// Indexes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<TableIndex>,
    /// Columns, in order.
    #[serde(default)]
    pub columns: Vec<SqliteTableColumn>,
    /// When true, the table should be dropped.
    #[serde(rename = "isDeleted", skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,
}

/// A declared RQLite table. RQLite reuses the SQLite type rules and adds
/// the `strict` table flag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RqliteTableSchema {
    /// Primary key columns, in order.
    #[serde(rename = "primaryKey", default, skip_serializing_if = "Vec::is_empty")]
    pub primary_key: Vec<String>,
    /// Foreign keys.
    #[serde(rename = "foreignKeys", default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<TableForeignKey>,
    /// Indexes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<TableIndex>,
    /// Columns, in order.
    #[serde(default)]
    pub columns: Vec<SqliteTableColumn>,
    /// When true, columns must use one of the five storage-class types.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
    /// When true, the table should be dropped.
    #[serde(rename = "isDeleted", skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,
}

impl RqliteTableSchema {
    /// View this schema as a plain SQLite schema so the shared planner can
    /// run against it. The `strict` flag is validated separately.
    pub fn as_sqlite(&self) -> SqliteTableSchema {
        SqliteTableSchema {
            primary_key: self.primary_key.clone(),
            foreign_keys: self.foreign_keys.clone(),
            indexes: self.indexes.clone(),
            columns: self.columns.clone(),
            is_deleted: self.is_deleted,
        }
    }
}

/// A declared SQLite column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SqliteTableColumn {
    /// Column name.
    pub name: String,
    /// Column type as written; validated against the affinity whitelist.
    #[serde(rename = "type")]
    pub column_type: String,
    /// Constraints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<ColumnConstraints>,
    /// Attributes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<ColumnAttributes>,
    /// Default value. The empty-string sentinel decodes to a default of `''`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl SqliteTableColumn {
    /// The effective default, decoding the empty-string sentinel.
    pub fn effective_default(&self) -> Option<String> {
        self.default.as_ref().map(|d| {
            if d == EMPTY_STRING_DEFAULT_SENTINEL {
                String::new()
            } else {
                d.clone()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_string_sentinel_decodes() {
        let col = SqliteTableColumn {
            name: "note".to_string(),
            column_type: "text".to_string(),
            default: Some(EMPTY_STRING_DEFAULT_SENTINEL.to_string()),
            ..Default::default()
        };
        assert_eq!(col.effective_default(), Some(String::new()));

        let no_default = SqliteTableColumn {
            default: None,
            ..col.clone()
        };
        assert_eq!(no_default.effective_default(), None);
    }

    #[test]
    fn test_rqlite_as_sqlite() {
        let rqlite = RqliteTableSchema {
            primary_key: vec!["id".to_string()],
            strict: Some(true),
            columns: vec![SqliteTableColumn {
                name: "id".to_string(),
                column_type: "integer".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let sqlite = rqlite.as_sqlite();
        assert_eq!(sqlite.primary_key, vec!["id".to_string()]);
        assert_eq!(sqlite.columns.len(), 1);
    }
}
