//! Type validation for SQLite.
//!
//! SQLite's affinity rules accept many spellings, so types are kept as
//! written (lowercased, spaces collapsed) and only validated against a
//! whitelist. Strict tables additionally require one of the five storage
//! classes.

use crate::error::{SqliteError, SqliteResult};

/// Base type spellings SQLite accepts. Parameters are allowed where the
/// spelling usually carries them and are preserved as written.
const KNOWN_TYPES: &[&str] = &[
    "int",
    "integer",
    "tinyint",
    "smallint",
    "mediumint",
    "bigint",
    "unsigned big int",
    "int2",
    "int8",
    "character",
    "varchar",
    "varying character",
    "nchar",
    "native character",
    "nvarchar",
    "text",
    "clob",
    "blob",
    "real",
    "double",
    "double precision",
    "float",
    "numeric",
    "decimal",
    "boolean",
    "date",
    "datetime",
    "timestamp",
];

/// The storage classes permitted in a strict table.
const STRICT_TYPES: &[&str] = &["int", "integer", "real", "text", "blob", "any"];

/// Validate a declared SQLite type and return its normalized spelling.
///
/// `strict` enforces the storage-class restriction RQLite strict tables
/// carry.
pub fn normalize_column_type(column: &str, requested: &str, strict: bool) -> SqliteResult<String> {
    let lowered = collapse_spaces(&requested.trim().to_lowercase());
    if lowered.is_empty() {
        return Err(SqliteError::unsupported_type(column, requested));
    }

    let base = match lowered.find('(') {
        Some(open) => {
            if !lowered.ends_with(')') {
                return Err(SqliteError::unsupported_type(column, requested));
            }
            lowered[..open].trim().to_string()
        }
        None => lowered.clone(),
    };

    if strict {
        if !STRICT_TYPES.contains(&base.as_str()) {
            return Err(SqliteError::unsupported_type(column, requested));
        }
        return Ok(lowered);
    }

    if !KNOWN_TYPES.contains(&base.as_str()) && !STRICT_TYPES.contains(&base.as_str()) {
        return Err(SqliteError::unsupported_type(column, requested));
    }
    Ok(lowered)
}

/// Normalize a type spelling read from the live catalog. Live types are
/// not validated; tables created outside the declarative layer may use
/// spellings the whitelist rejects.
pub fn normalize_live_type(raw: &str) -> String {
    collapse_spaces(&raw.trim().to_lowercase())
}

fn collapse_spaces(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
