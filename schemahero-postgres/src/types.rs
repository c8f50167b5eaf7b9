//! Type normalization for the PostgreSQL family.
//!
//! User-written types are rewritten to a canonical per-engine form so that
//! diffing is string-comparable: aliases are expanded (`int8` -> `bigint`,
//! `varchar(10)` -> `character varying (10)`), missing parameters get their
//! defaults, and `timestamp`/`time` normalize the "without time zone"
//! clause so the two spellings compare equal.

use crate::error::{PostgresError, PostgresResult};

/// A normalized column type.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedType {
    /// Canonical type string.
    pub data_type: String,
    /// Whether the declaration carried a `[]` array suffix.
    pub is_array: bool,
}

/// Types that pass through unchanged, with no parameters.
const UNPARAMETERIZED_TYPES: &[&str] = &[
    "bigint",
    "bigserial",
    "boolean",
    "box",
    "bytea",
    "cidr",
    "circle",
    "date",
    "double precision",
    "inet",
    "integer",
    "json",
    "jsonb",
    "line",
    "lseg",
    "macaddr",
    "macaddr8",
    "money",
    "path",
    "pg_lsn",
    "point",
    "polygon",
    "real",
    "serial",
    "smallint",
    "smallserial",
    "text",
    "tsquery",
    "tsvector",
    "txid_snapshot",
    "uuid",
    "xml",
    "bit varying",
    "numeric",
];

/// Expand a whole-string alias to its canonical spelling.
pub(crate) fn unalias(requested: &str) -> &str {
    match requested {
        "int8" => "bigint",
        "int4" | "int" => "integer",
        "int2" => "smallint",
        "float8" => "double precision",
        "float4" => "real",
        "serial8" => "bigserial",
        "serial4" => "serial",
        "serial2" => "smallserial",
        "bool" => "boolean",
        "char" => "character",
        "varchar" => "character varying",
        "varbit" => "bit varying",
        "dec" | "decimal" => "numeric",
        "timestamptz" => "timestamp with time zone",
        "timetz" => "time with time zone",
        other => other,
    }
}

/// Normalize a user-written Postgres type to its canonical form.
///
/// Fails with an unsupported-type error naming `column` when the type
/// string cannot be normalized.
pub fn normalize_column_type(column: &str, requested: &str) -> PostgresResult<NormalizedType> {
    let trimmed = requested.trim();
    let (base_str, is_array) = match trimmed.strip_suffix("[]") {
        Some(stripped) => (stripped.trim(), true),
        None => (trimmed, false),
    };
    let lowered = collapse_spaces(&base_str.to_lowercase());

    let data_type = normalize_inner(column, &lowered)?;
    Ok(NormalizedType {
        data_type,
        is_array,
    })
}

fn normalize_inner(column: &str, lowered: &str) -> PostgresResult<String> {
    let unaliased = unalias(lowered);

    if UNPARAMETERIZED_TYPES.contains(&unaliased) {
        return Ok(unaliased.to_string());
    }

    // Unparameterized forms with defaults or clause normalization.
    match unaliased {
        "bit" => return Ok("bit (1)".to_string()),
        "character" => return Ok("character (1)".to_string()),
        "character varying" => return Ok("character varying (1)".to_string()),
        "timestamp" | "timestamp without time zone" => {
            return Ok("timestamp without time zone".to_string())
        }
        "timestamp with time zone" => return Ok("timestamp with time zone".to_string()),
        "time" | "time without time zone" => return Ok("time without time zone".to_string()),
        "time with time zone" => return Ok("time with time zone".to_string()),
        _ => {}
    }

    // Parameterized: `base (params) [suffix]`.
    let Some(open) = unaliased.find('(') else {
        return Err(PostgresError::unsupported_type(column, unaliased));
    };
    let Some(close) = unaliased.rfind(')') else {
        return Err(PostgresError::unsupported_type(column, unaliased));
    };
    let base = unalias(unaliased[..open].trim());
    let params: Vec<String> = unaliased[open + 1..close]
        .split(',')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    let suffix = unaliased[close + 1..].trim();

    if params.iter().any(|p| p.parse::<i64>().is_err()) {
        return Err(PostgresError::unsupported_type(column, unaliased));
    }

    let rendered = match (base, params.len()) {
        ("character varying", 1) => format!("character varying ({})", params[0]),
        ("bit varying", 1) => format!("bit varying ({})", params[0]),
        ("bit", 1) => format!("bit ({})", params[0]),
        ("character", 1) => format!("character ({})", params[0]),
        ("numeric", 1) => format!("numeric ({})", params[0]),
        ("numeric", 2) => format!("numeric ({}, {})", params[0], params[1]),
        ("timestamp", 1) | ("timestamp without time zone", 1) => {
            if suffix == "with time zone" {
                format!("timestamp ({}) with time zone", params[0])
            } else {
                format!("timestamp ({}) without time zone", params[0])
            }
        }
        ("timestamp with time zone", 1) => {
            format!("timestamp ({}) with time zone", params[0])
        }
        ("time", 1) | ("time without time zone", 1) => {
            if suffix == "with time zone" {
                format!("time ({}) with time zone", params[0])
            } else {
                format!("time ({}) without time zone", params[0])
            }
        }
        ("time with time zone", 1) => format!("time ({}) with time zone", params[0]),
        _ => return Err(PostgresError::unsupported_type(column, unaliased)),
    };
    Ok(rendered)
}

fn collapse_spaces(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canon(t: &str) -> String {
        normalize_column_type("c", t).unwrap().data_type
    }

    #[test]
    fn test_integer_aliases() {
        assert_eq!(canon("int8"), "bigint");
        assert_eq!(canon("int4"), "integer");
        assert_eq!(canon("int"), "integer");
        assert_eq!(canon("int2"), "smallint");
        assert_eq!(canon("float8"), "double precision");
        assert_eq!(canon("float4"), "real");
        assert_eq!(canon("serial8"), "bigserial");
        assert_eq!(canon("serial4"), "serial");
        assert_eq!(canon("serial2"), "smallserial");
        assert_eq!(canon("bool"), "boolean");
    }

    #[test]
    fn test_parameterized_rewrites() {
        assert_eq!(canon("varchar(10)"), "character varying (10)");
        assert_eq!(canon("varbit(3)"), "bit varying (3)");
        assert_eq!(canon("decimal(10,5)"), "numeric (10, 5)");
        assert_eq!(canon("numeric(5)"), "numeric (5)");
        assert_eq!(canon("char(4)"), "character (4)");
        assert_eq!(canon("bit(2)"), "bit (2)");
    }

    #[test]
    fn test_parameter_defaults() {
        assert_eq!(canon("bit"), "bit (1)");
        assert_eq!(canon("character"), "character (1)");
        assert_eq!(canon("varchar"), "character varying (1)");
        assert_eq!(canon("character varying"), "character varying (1)");
        assert_eq!(canon("numeric"), "numeric");
    }

    #[test]
    fn test_time_zone_clause_normalization() {
        assert_eq!(canon("timestamptz"), "timestamp with time zone");
        assert_eq!(canon("timestamp"), "timestamp without time zone");
        assert_eq!(
            canon("timestamp without time zone"),
            "timestamp without time zone"
        );
        assert_eq!(canon("timetz"), "time with time zone");
        assert_eq!(canon("time"), "time without time zone");
        assert_eq!(canon("timetz(2)"), "time (2) with time zone");
        assert_eq!(
            canon("timestamp (3) with time zone"),
            "timestamp (3) with time zone"
        );
        assert_eq!(canon("timestamp(3)"), "timestamp (3) without time zone");
    }

    #[test]
    fn test_canonical_forms_are_fixed_points() {
        for t in [
            "bigint",
            "boolean",
            "character varying (10)",
            "numeric (10, 5)",
            "timestamp with time zone",
            "time (2) with time zone",
            "jsonb",
            "uuid",
            "cidr",
        ] {
            assert_eq!(canon(t), t);
        }
    }

    #[test]
    fn test_array_suffix() {
        let n = normalize_column_type("tags", "text[]").unwrap();
        assert!(n.is_array);
        assert_eq!(n.data_type, "text");
    }

    #[test]
    fn test_unsupported_type_fails_with_column() {
        let err = normalize_column_type("age", "midint").unwrap_err();
        assert!(err.to_string().contains("age"));

        let err = normalize_column_type("a", "varchar(x)").unwrap_err();
        assert!(err.to_string().contains("a"));
    }
}
