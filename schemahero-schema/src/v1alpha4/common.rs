//! Shared building blocks for the engine-keyed table schemas.

use serde::{Deserialize, Serialize};

use crate::model::{generate_fk_name, ForeignKey};

/// A declared foreign key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableForeignKey {
    /// Columns on this table.
    pub columns: Vec<String>,
    /// The referenced table and columns.
    pub references: ForeignKeyReferences,
    /// Constraint name; generated when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// ON DELETE action; engine default when omitted.
    #[serde(rename = "onDelete", skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<String>,
}

/// Referenced side of a foreign key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForeignKeyReferences {
    /// Parent table.
    pub table: String,
    /// Parent columns.
    pub columns: Vec<String>,
}

impl TableForeignKey {
    /// The constraint name: the declared one, else the generated
    /// `{table}_{cols}_fkey` form.
    pub fn constraint_name(&self, table: &str) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => generate_fk_name(table, &self.columns),
        }
    }

    /// Convert to the normalized model for comparison against the catalog.
    pub fn to_model(&self, table: &str) -> ForeignKey {
        ForeignKey {
            name: self.constraint_name(table),
            parent_table: self.references.table.clone(),
            child_columns: self.columns.clone(),
            parent_columns: self.references.columns.clone(),
            on_delete: self.on_delete.clone().unwrap_or_default(),
        }
    }
}

/// A declared index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableIndex {
    /// Indexed columns, in order.
    pub columns: Vec<String>,
    /// Index name; generated when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Whether the index enforces uniqueness.
    #[serde(rename = "isUnique", skip_serializing_if = "Option::is_none")]
    pub is_unique: Option<bool>,
}

impl TableIndex {
    /// The index name: the declared one, else `idx_{table}_{cols}` truncated
    /// at `max_len` on a column-segment boundary.
    pub fn index_name(&self, table: &str, max_len: usize) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => crate::model::generate_index_name(table, &self.columns, max_len),
        }
    }

    /// Convert to the normalized model for comparison against the catalog.
    pub fn to_model(&self, table: &str, max_len: usize) -> crate::model::Index {
        crate::model::Index {
            name: self.index_name(table, max_len),
            columns: self.columns.clone(),
            is_unique: self.is_unique,
        }
    }
}
