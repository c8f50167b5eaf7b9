//! Normalized introspection model.
//!
//! Connectors read the live catalog into these engine-agnostic values; the
//! diff planners compare them against the declared schema. Equality on
//! foreign keys, indexes and key constraints follows the tolerant rules the
//! planners depend on: generated names match unspecified names, and unset
//! tri-state booleans compare equal to `false`.

use serde::{Deserialize, Serialize};

/// Compare two tri-state booleans, treating unset as `false`.
///
/// A column with no explicit not-null constraint matches one declared
/// `notNull: false`.
pub fn bools_equal(a: Option<bool>, b: Option<bool>) -> bool {
    a.unwrap_or(false) == b.unwrap_or(false)
}

/// True when the tri-state boolean is explicitly set and true.
pub fn is_set(b: Option<bool>) -> bool {
    b.unwrap_or(false)
}

/// Constraints attached to a single column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnConstraints {
    /// Whether the column rejects NULL. Unset is equivalent to false.
    #[serde(rename = "notNull", skip_serializing_if = "Option::is_none")]
    pub not_null: Option<bool>,
}

/// Engine attributes attached to a single column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnAttributes {
    /// Whether the column auto-increments. Unset is equivalent to false.
    #[serde(rename = "autoIncrement", skip_serializing_if = "Option::is_none")]
    pub auto_increment: Option<bool>,
}

/// A normalized column as read from the live catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Canonical data type (post type-normalization).
    #[serde(rename = "dataType")]
    pub data_type: String,
    /// Whether this is an array type (Postgres `_` udt prefix).
    #[serde(rename = "isArray", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_array: bool,
    /// Default value, unquoted and uncast.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Column character set (MySQL).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    /// Column collation (MySQL).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collation: Option<String>,
    /// Whether the column is static (Cassandra).
    #[serde(rename = "isStatic", skip_serializing_if = "Option::is_none")]
    pub is_static: Option<bool>,
    /// Column constraints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<ColumnConstraints>,
    /// Column attributes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<ColumnAttributes>,
}

impl Column {
    /// Whether the column carries an explicit NOT NULL constraint.
    pub fn is_not_null(&self) -> bool {
        self.constraints
            .as_ref()
            .map(|c| is_set(c.not_null))
            .unwrap_or(false)
    }

    /// Whether the column auto-increments.
    pub fn is_auto_increment(&self) -> bool {
        self.attributes
            .as_ref()
            .map(|a| is_set(a.auto_increment))
            .unwrap_or(false)
    }

    /// Tri-state not-null value (None when no constraints block is present).
    pub fn not_null(&self) -> Option<bool> {
        self.constraints.as_ref().and_then(|c| c.not_null)
    }
}

/// A foreign key as read from the live catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Constraint name. Empty when the catalog generated one.
    pub name: String,
    /// Referenced (parent) table.
    #[serde(rename = "parentTable")]
    pub parent_table: String,
    /// Columns on the child (owning) table.
    #[serde(rename = "childColumns")]
    pub child_columns: Vec<String>,
    /// Columns on the parent table.
    #[serde(rename = "parentColumns")]
    pub parent_columns: Vec<String>,
    /// ON DELETE action, as the catalog reports it.
    #[serde(rename = "onDelete", default)]
    pub on_delete: String,
}

impl ForeignKey {
    /// Tolerant equality: compares the child column set, parent column set
    /// and parent table. The name is ignored, and `on_delete` is ignored
    /// when either side left it unset; `NO ACTION` matches unset.
    pub fn equals(&self, other: &ForeignKey) -> bool {
        if self.parent_table != other.parent_table {
            return false;
        }
        if !same_column_set(&self.child_columns, &other.child_columns) {
            return false;
        }
        if !same_column_set(&self.parent_columns, &other.parent_columns) {
            return false;
        }
        on_delete_equals(&self.on_delete, &other.on_delete)
    }
}

fn on_delete_equals(a: &str, b: &str) -> bool {
    let norm = |s: &str| {
        let up = s.trim().to_uppercase();
        if up.is_empty() || up == "NO ACTION" {
            String::new()
        } else {
            up
        }
    };
    norm(a) == norm(b)
}

fn same_column_set(a: &[String], b: &[String]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().all(|col| b.contains(col))
}

/// An index as read from the live catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Index {
    /// Index name. Empty when generated.
    pub name: String,
    /// Indexed columns, in creation order.
    pub columns: Vec<String>,
    /// Whether the index enforces uniqueness. Unset is equivalent to false.
    #[serde(rename = "isUnique", skip_serializing_if = "Option::is_none")]
    pub is_unique: Option<bool>,
}

impl Index {
    /// Tolerant equality: same unique flag and same column set. Column
    /// order is irrelevant for uniqueness semantics but preserved for
    /// creation.
    pub fn equals(&self, other: &Index) -> bool {
        bools_equal(self.is_unique, other.is_unique)
            && same_column_set(&self.columns, &other.columns)
    }
}

/// A primary key or ordinary key constraint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyConstraint {
    /// Constraint name. None when generated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Key columns, in order.
    pub columns: Vec<String>,
    /// Whether this is the primary key.
    #[serde(rename = "isPrimary", default)]
    pub is_primary: bool,
}

impl KeyConstraint {
    /// Primary-key equality ignores the name; ordinary-key equality keeps
    /// column order (composite keys are order-sensitive for lookups).
    pub fn equals(&self, other: &KeyConstraint) -> bool {
        if self.is_primary != other.is_primary {
            return false;
        }
        if self.is_primary {
            return self.columns == other.columns;
        }
        self.name == other.name && self.columns == other.columns
    }

    /// The generated primary key name for a table: `{table}_pkey`.
    pub fn generated_pk_name(table: &str) -> String {
        format!("{table}_pkey")
    }
}

/// A whole table as read from the live catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiveTable {
    /// Table name.
    pub name: String,
    /// Columns, in ordinal order.
    pub columns: Vec<Column>,
    /// The primary key, when one exists.
    #[serde(rename = "primaryKey", skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<KeyConstraint>,
    /// Foreign keys.
    #[serde(rename = "foreignKeys", default)]
    pub foreign_keys: Vec<ForeignKey>,
    /// Indexes, excluding the one backing the primary key.
    #[serde(default)]
    pub indexes: Vec<Index>,
}

impl LiveTable {
    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// The generated name for an unnamed foreign key:
/// `{table}_{col1}_{col2}_..._fkey`.
pub fn generate_fk_name(table: &str, child_columns: &[String]) -> String {
    format!("{}_{}_fkey", table, child_columns.join("_"))
}

/// The generated name for an unnamed index: `idx_{table}_{col1}_{col2}_...`,
/// truncated at the engine identifier limit at a column-segment boundary.
pub fn generate_index_name(table: &str, columns: &[String], max_len: usize) -> String {
    let full = format!("idx_{}_{}", table, columns.join("_"));
    if full.len() <= max_len {
        return full;
    }
    // Drop whole trailing column segments until the name fits.
    let mut cols = columns.to_vec();
    while cols.len() > 1 {
        cols.pop();
        let candidate = format!("idx_{}_{}", table, cols.join("_"));
        if candidate.len() <= max_len {
            return candidate;
        }
    }
    let mut truncated = full;
    truncated.truncate(max_len);
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bools_equal_treats_unset_as_false() {
        assert!(bools_equal(None, None));
        assert!(bools_equal(None, Some(false)));
        assert!(bools_equal(Some(false), None));
        assert!(bools_equal(Some(true), Some(true)));
        assert!(!bools_equal(None, Some(true)));
        assert!(!bools_equal(Some(true), Some(false)));
    }

    #[test]
    fn test_foreign_key_tolerant_equality() {
        let declared = ForeignKey {
            name: String::new(),
            parent_table: "users".to_string(),
            child_columns: vec!["user_id".to_string()],
            parent_columns: vec!["id".to_string()],
            on_delete: "cascade".to_string(),
        };
        let live = ForeignKey {
            name: "orders_user_id_fkey".to_string(),
            parent_table: "users".to_string(),
            child_columns: vec!["user_id".to_string()],
            parent_columns: vec!["id".to_string()],
            on_delete: "CASCADE".to_string(),
        };
        assert!(declared.equals(&live));
    }

    #[test]
    fn test_foreign_key_unset_on_delete_matches_no_action() {
        let declared = ForeignKey {
            parent_table: "users".to_string(),
            child_columns: vec!["user_id".to_string()],
            parent_columns: vec!["id".to_string()],
            ..Default::default()
        };
        let live = ForeignKey {
            name: "fk".to_string(),
            parent_table: "users".to_string(),
            child_columns: vec!["user_id".to_string()],
            parent_columns: vec!["id".to_string()],
            on_delete: "NO ACTION".to_string(),
        };
        assert!(declared.equals(&live));

        let live_cascade = ForeignKey {
            on_delete: "CASCADE".to_string(),
            ..live
        };
        assert!(!declared.equals(&live_cascade));
    }

    #[test]
    fn test_index_equality_ignores_column_order() {
        let a = Index {
            name: "idx_a".to_string(),
            columns: vec!["one".to_string(), "two".to_string()],
            is_unique: Some(true),
        };
        let b = Index {
            name: "idx_b".to_string(),
            columns: vec!["two".to_string(), "one".to_string()],
            is_unique: Some(true),
        };
        assert!(a.equals(&b));

        let c = Index {
            is_unique: None,
            ..b.clone()
        };
        assert!(!a.equals(&c));
    }

    #[test]
    fn test_primary_key_equality_ignores_name_keeps_order() {
        let a = KeyConstraint {
            name: Some("users_pkey".to_string()),
            columns: vec!["tenant".to_string(), "id".to_string()],
            is_primary: true,
        };
        let b = KeyConstraint {
            name: None,
            columns: vec!["tenant".to_string(), "id".to_string()],
            is_primary: true,
        };
        assert!(a.equals(&b));

        let reordered = KeyConstraint {
            columns: vec!["id".to_string(), "tenant".to_string()],
            ..b
        };
        assert!(!a.equals(&reordered));
    }

    #[test]
    fn test_generated_names() {
        assert_eq!(KeyConstraint::generated_pk_name("users"), "users_pkey");
        assert_eq!(
            generate_fk_name("orders", &["user_id".to_string(), "tenant".to_string()]),
            "orders_user_id_tenant_fkey"
        );
        assert_eq!(
            generate_index_name("users", &["email".to_string()], 64),
            "idx_users_email"
        );
    }

    #[test]
    fn test_index_name_truncates_at_segment_boundary() {
        let table = "a_table_with_quite_a_long_name_for_testing";
        let cols = vec![
            "first_column_name".to_string(),
            "second_column_name".to_string(),
        ];
        let name = generate_index_name(table, &cols, 64);
        assert!(name.len() <= 64);
        assert_eq!(name, format!("idx_{}_first_column_name", table));
    }
}
