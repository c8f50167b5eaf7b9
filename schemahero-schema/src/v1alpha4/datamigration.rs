//! The DataMigration resource: row-level operations against an existing
//! table. Static and calculated updates and type transforms are modeled;
//! anything richer goes through guarded custom SQL.

use serde::{Deserialize, Serialize};

use crate::error::{SchemaError, SchemaResult};

/// A declared data migration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataMigration {
    /// Resource name; echoed in the generated statement comments.
    pub name: String,
    /// Resource namespace.
    #[serde(default)]
    pub namespace: String,
    /// User intent.
    pub spec: DataMigrationSpec,
}

/// Spec of a data migration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataMigrationSpec {
    /// Logical database name.
    pub database: String,
    /// Target table.
    #[serde(rename = "tableName")]
    pub table_name: String,
    /// Operations, applied in order.
    #[serde(default)]
    pub operations: Vec<DataMigrationOperation>,
}

/// One row-level operation. Exactly one of the branches is populated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataMigrationOperation {
    /// Static column updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<StaticUpdate>,
    /// Expression-driven updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculate: Option<CalculatedUpdate>,
    /// Type transitions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub convert: Option<TransformUpdate>,
    /// Guarded custom SQL.
    #[serde(rename = "customSql", skip_serializing_if = "Option::is_none")]
    pub custom_sql: Option<CustomSql>,
}

impl DataMigrationOperation {
    /// Verify the one-of invariant.
    pub fn validate(&self, migration: &str, index: usize) -> SchemaResult<()> {
        let populated = [
            self.update.is_some(),
            self.calculate.is_some(),
            self.convert.is_some(),
            self.custom_sql.is_some(),
        ]
        .iter()
        .filter(|p| **p)
        .count();
        if populated != 1 {
            return Err(SchemaError::validation(
                migration,
                format!("operation {index} must set exactly one of update, calculate, convert, customSql"),
            ));
        }
        Ok(())
    }
}

/// `UPDATE {table} SET col = literal [, ...] [WHERE ...]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticUpdate {
    /// Column/literal pairs.
    pub set: Vec<ColumnValue>,
    /// Optional WHERE clause, inserted verbatim.
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<String>,
}

/// A column and a literal value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnValue {
    /// Column name.
    pub column: String,
    /// Literal value; encoded with the engine's default-value rules.
    pub value: String,
}

/// `UPDATE {table} SET col = expression [, ...] [WHERE ...]`. The
/// expression is inserted verbatim; the user is responsible for its
/// correctness.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalculatedUpdate {
    /// Column/expression pairs.
    pub set: Vec<ColumnExpression>,
    /// Optional WHERE clause.
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<String>,
}

/// A column and an expression.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnExpression {
    /// Column name.
    pub column: String,
    /// SQL expression, verbatim.
    pub expression: String,
}

/// A type transition on one column. Exactly one transform kind is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformUpdate {
    /// Column to transform.
    pub column: String,
    /// `col AT TIME ZONE '{from}' AT TIME ZONE '{to}'`.
    #[serde(rename = "timezoneConvert", skip_serializing_if = "Option::is_none")]
    pub timezone_convert: Option<TimezoneConvert>,
    /// `col::{target}`.
    #[serde(rename = "typeCast", skip_serializing_if = "Option::is_none")]
    pub type_cast: Option<String>,
    /// UPPER / LOWER / TRIM.
    #[serde(rename = "formatChange", skip_serializing_if = "Option::is_none")]
    pub format_change: Option<FormatChange>,
    /// replace / substring.
    #[serde(rename = "stringTransform", skip_serializing_if = "Option::is_none")]
    pub string_transform: Option<StringTransform>,
}

/// Timezone conversion parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimezoneConvert {
    /// Source timezone.
    pub from: String,
    /// Target timezone.
    pub to: String,
}

/// Format transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatChange {
    /// `UPPER(col)`.
    Uppercase,
    /// `LOWER(col)`.
    Lowercase,
    /// `TRIM(col)`.
    Trim,
}

/// String transforms. Exactly one branch is populated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StringTransform {
    /// `replace(col, old, new)`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace: Option<ReplaceTransform>,
    /// `substring(col, start[, length])`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substring: Option<SubstringTransform>,
}

/// Parameters for `replace`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplaceTransform {
    /// Substring to replace.
    pub old: String,
    /// Replacement.
    pub new: String,
}

/// Parameters for `substring`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubstringTransform {
    /// 1-based start position.
    pub start: i64,
    /// Optional length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<i64>,
}

/// Custom SQL passed through after a conservative guard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomSql {
    /// The statement.
    pub sql: String,
    /// When true, the guard rejects destructive statements.
    #[serde(default)]
    pub validate: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_one_of_invariant() {
        let empty = DataMigrationOperation::default();
        assert!(empty.validate("m", 0).is_err());

        let ok = DataMigrationOperation {
            update: Some(StaticUpdate {
                set: vec![ColumnValue {
                    column: "a".to_string(),
                    value: "1".to_string(),
                }],
                where_clause: None,
            }),
            ..Default::default()
        };
        assert!(ok.validate("m", 0).is_ok());

        let both = DataMigrationOperation {
            custom_sql: Some(CustomSql {
                sql: "UPDATE t SET a = 1".to_string(),
                validate: true,
            }),
            ..ok
        };
        assert!(both.validate("m", 1).is_err());
    }

    #[test]
    fn test_transform_yaml() {
        let yaml = r#"
column: created_at
timezoneConvert:
  from: UTC
  to: America/New_York
"#;
        let t: TransformUpdate = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(t.column, "created_at");
        assert_eq!(t.timezone_convert.as_ref().unwrap().from, "UTC");
    }
}
