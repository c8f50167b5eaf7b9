//! MySQL table schema.

use serde::{Deserialize, Serialize};

use crate::model::{ColumnAttributes, ColumnConstraints};

use super::common::{TableForeignKey, TableIndex};

/// A declared MySQL table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MysqlTableSchema {
    /// Table default character set. Columns without an explicit charset
    /// inherit this before diffing.
    #[serde(rename = "defaultCharset", skip_serializing_if = "Option::is_none")]
    pub default_charset: Option<String>,
    /// Table collation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collation: Option<String>,
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
    pub columns: Vec<MysqlTableColumn>,
    /// When true, the table should be dropped.
    #[serde(rename = "isDeleted", skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,
}

/// A declared MySQL column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MysqlTableColumn {
    /// Column name.
    pub name: String,
    /// Column type as written; normalized before diffing.
    #[serde(rename = "type")]
    pub column_type: String,
    /// Constraints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<ColumnConstraints>,
    /// Attributes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<ColumnAttributes>,
    /// Default value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Column character set; inherits the table default when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    /// Column collation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collation: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mysql_schema_yaml() {
        let yaml = r#"
defaultCharset: utf8mb4
primaryKey: [id]
columns:
  - name: id
    type: int
    attributes:
      autoIncrement: true
  - name: email
    type: varchar(255)
    charset: latin1
"#;
        let schema: MysqlTableSchema = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(schema.default_charset.as_deref(), Some("utf8mb4"));
        assert_eq!(schema.columns[1].charset.as_deref(), Some("latin1"));
        assert_eq!(
            schema.columns[0]
                .attributes
                .as_ref()
                .unwrap()
                .auto_increment,
            Some(true)
        );
    }
}
