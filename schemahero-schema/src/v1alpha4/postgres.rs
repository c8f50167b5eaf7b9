//! PostgreSQL table, view, function and extension schemas.
//!
//! CockroachDB declarations reuse these types; the wire protocol and
//! catalog are close enough that the planner is shared.

use serde::{Deserialize, Serialize};

use crate::model::{ColumnAttributes, ColumnConstraints};

use super::common::{TableForeignKey, TableIndex};

/// A declared PostgreSQL table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostgresTableSchema {
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
    pub columns: Vec<PostgresTableColumn>,
    /// When true, the table should be dropped.
    #[serde(rename = "isDeleted", skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,
}

/// A declared PostgreSQL column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostgresTableColumn {
    /// Column name.
    pub name: String,
    /// Column type as written by the user; normalized before diffing.
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
}

/// A declared PostgreSQL view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostgresViewSchema {
    /// The SELECT that defines the view.
    pub query: String,
    /// Whether the view is materialized.
    #[serde(rename = "isMaterialized", skip_serializing_if = "Option::is_none")]
    pub is_materialized: Option<bool>,
    /// When true, the view should be dropped.
    #[serde(rename = "isDeleted", skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,
}

/// A declared PostgreSQL function.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostgresFunctionSchema {
    /// Language the function body is written in (default plpgsql).
    #[serde(default = "default_lang")]
    pub lang: String,
    /// Function parameters, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<PostgresFunctionParam>,
    /// Return type; None for void.
    #[serde(rename = "returns", skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    /// Whether the function returns a set.
    #[serde(rename = "returnSet", skip_serializing_if = "Option::is_none")]
    pub return_set: Option<bool>,
    /// The function body.
    #[serde(rename = "as")]
    pub body: String,
    /// When true, the function should be dropped.
    #[serde(rename = "isDeleted", skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,
}

fn default_lang() -> String {
    "plpgsql".to_string()
}

/// A parameter of a declared function.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostgresFunctionParam {
    /// Parameter mode (IN, OUT, INOUT); IN when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Parameter name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Parameter type.
    #[serde(rename = "type")]
    pub param_type: String,
}

/// A declared PostgreSQL extension.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostgresDatabaseExtension {
    /// Extension name, e.g. `postgis`.
    pub name: String,
    /// Specific version; latest when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_type_field_renames() {
        let yaml = "name: id\ntype: character varying (255)\n";
        let col: PostgresTableColumn = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(col.column_type, "character varying (255)");
    }

    #[test]
    fn test_function_defaults() {
        let yaml = "as: |\n  begin return 1; end;\n";
        let f: PostgresFunctionSchema = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(f.lang, "plpgsql");
        assert!(f.params.is_empty());
    }
}
