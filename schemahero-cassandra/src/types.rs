//! CQL type normalization.
//!
//! Declared types are case-folded before diffing. Collection types
//! (`list<T>`, `set<T>`, `map<K,V>`) are decomposed and each parameter is
//! validated against the scalar whitelist.

use crate::error::{CassandraError, CassandraResult};

/// Scalar CQL types accepted as-is and as collection parameters.
const SCALAR_TYPES: &[&str] = &[
    "ascii",
    "bigint",
    "blob",
    "boolean",
    "counter",
    "date",
    "decimal",
    "double",
    "duration",
    "float",
    "inet",
    "int",
    "smallint",
    "text",
    "time",
    "timestamp",
    "timeuuid",
    "tinyint",
    "uuid",
    "varchar",
    "varint",
];

/// A normalized CQL type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedType {
    /// The canonical, lowercased type expression.
    pub data_type: String,
}

impl NormalizedType {
    fn new(data_type: impl Into<String>) -> Self {
        Self {
            data_type: data_type.into(),
        }
    }
}

fn is_scalar(name: &str) -> bool {
    SCALAR_TYPES.contains(&name)
}

/// A bare identifier that is not a built-in scalar refers to a
/// user-defined type.
fn is_udt_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn validate_parameter(column: &str, requested: &str, param: &str) -> CassandraResult<()> {
    if is_scalar(param) {
        Ok(())
    } else {
        Err(CassandraError::unsupported_type(column, requested))
    }
}

/// Normalize a declared CQL type for the named column.
///
/// Case-folds the expression, decomposes collections, and rejects
/// parameters outside the scalar whitelist.
pub fn normalize_column_type(column: &str, requested: &str) -> CassandraResult<NormalizedType> {
    let lowered = requested.trim().to_lowercase();
    let collapsed: String = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return Err(CassandraError::validation(format!(
            "column {} has no type",
            column
        )));
    }

    if let Some(inner) = parameterized(&collapsed, "list") {
        let inner = inner.trim();
        validate_parameter(column, requested, inner)?;
        return Ok(NormalizedType::new(format!("list<{}>", inner)));
    }
    if let Some(inner) = parameterized(&collapsed, "set") {
        let inner = inner.trim();
        validate_parameter(column, requested, inner)?;
        return Ok(NormalizedType::new(format!("set<{}>", inner)));
    }
    if let Some(inner) = parameterized(&collapsed, "map") {
        let mut params = inner.splitn(2, ',');
        let key = params.next().unwrap_or("").trim();
        let value = params
            .next()
            .ok_or_else(|| CassandraError::unsupported_type(column, requested))?
            .trim();
        validate_parameter(column, requested, key)?;
        validate_parameter(column, requested, value)?;
        return Ok(NormalizedType::new(format!("map<{}, {}>", key, value)));
    }

    if is_scalar(&collapsed) || is_udt_name(&collapsed) {
        return Ok(NormalizedType::new(collapsed));
    }

    Err(CassandraError::unsupported_type(column, requested))
}

/// Extract the parameter list of `keyword<...>`, if the expression is one.
fn parameterized<'a>(expr: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = expr.strip_prefix(keyword)?.trim_start();
    let inner = rest.strip_prefix('<')?;
    inner.strip_suffix('>')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scalars_are_case_folded() {
        let normalized = normalize_column_type("a", "TEXT").unwrap();
        assert_eq!(normalized.data_type, "text");
        let normalized = normalize_column_type("a", "TimeUUID").unwrap();
        assert_eq!(normalized.data_type, "timeuuid");
    }

    #[test]
    fn canonical_types_are_stable() {
        for data_type in ["int", "list<uuid>", "map<text, inet>"] {
            let normalized = normalize_column_type("a", data_type).unwrap();
            assert_eq!(normalized.data_type, data_type);
        }
    }

    #[test]
    fn collections_are_decomposed() {
        let normalized = normalize_column_type("a", "List< Text >").unwrap();
        assert_eq!(normalized.data_type, "list<text>");
        let normalized = normalize_column_type("a", "MAP<int,TIMEUUID>").unwrap();
        assert_eq!(normalized.data_type, "map<int, timeuuid>");
        let normalized = normalize_column_type("a", "set<inet>").unwrap();
        assert_eq!(normalized.data_type, "set<inet>");
    }

    #[test]
    fn collection_parameters_are_validated() {
        assert!(matches!(
            normalize_column_type("a", "list<list<int>>"),
            Err(CassandraError::UnsupportedType { .. })
        ));
        assert!(matches!(
            normalize_column_type("a", "map<sprocket, int>"),
            Err(CassandraError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn udt_names_pass_through() {
        let normalized = normalize_column_type("a", "Address_v2").unwrap();
        assert_eq!(normalized.data_type, "address_v2");
    }

    #[test]
    fn empty_type_is_a_validation_error() {
        assert!(matches!(
            normalize_column_type("a", "   "),
            Err(CassandraError::Validation(_))
        ));
    }
}
