//! Type normalization for MySQL.
//!
//! Canonical forms carry a space before the parameter list (`int (11)`)
//! so the catalog's `COLUMN_TYPE` and user-written types compare equal
//! after normalization. Long text and blob variants drop the spurious
//! lengths the catalog reports.

use crate::error::{MysqlError, MysqlResult};

/// A normalized column type.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedType {
    /// Canonical type string.
    pub data_type: String,
}

/// Types that pass through unchanged, keeping any written parameters.
const UNPARAMETERIZED_TYPES: &[&str] = &[
    "float",
    "double",
    "date",
    "year",
    "json",
    "geometry",
    "point",
    "linestring",
    "polygon",
];

/// Long text/blob variants whose catalog-reported lengths are dropped.
const LENGTHLESS_TYPES: &[&str] = &[
    "tinytext",
    "text",
    "mediumtext",
    "longtext",
    "tinyblob",
    "blob",
    "mediumblob",
    "longblob",
];

/// Types that require an explicit length parameter.
const LENGTH_REQUIRED_TYPES: &[&str] = &["varchar", "varbinary"];

/// Types that accept a single optional length.
const OPTIONAL_LENGTH_TYPES: &[&str] = &[
    "tinyint",
    "smallint",
    "mediumint",
    "bigint",
    "binary",
    "character",
    "bit",
];

/// Types that accept an optional fractional-seconds precision in [0, 6].
const FSP_TYPES: &[&str] = &["datetime", "timestamp", "time"];

fn unalias(requested: &str) -> &str {
    match requested {
        "bool" | "boolean" => "tinyint",
        "integer" | "int" => "int",
        "dec" | "numeric" => "decimal",
        "double precision" => "double",
        "char" => "character",
        other => other,
    }
}

/// Normalize a user-written MySQL type to its canonical form.
pub fn normalize_column_type(column: &str, requested: &str) -> MysqlResult<NormalizedType> {
    let lowered = collapse_spaces(&requested.trim().to_lowercase());

    // enum/set carry value lists that must not be rewritten.
    if lowered.starts_with("enum(")
        || lowered.starts_with("enum (")
        || lowered.starts_with("set(")
        || lowered.starts_with("set (")
    {
        return Ok(NormalizedType {
            data_type: requested.trim().to_string(),
        });
    }

    let (base, params) = split_parameters(column, &lowered)?;
    let base = unalias(&base);

    let data_type = match base {
        // bool and bare int carry fixed display widths.
        "tinyint" if lowered.starts_with("bool") => "tinyint (1)".to_string(),
        "int" => match params.len() {
            0 => "int (11)".to_string(),
            1 => format!("int ({})", params[0]),
            _ => return Err(MysqlError::unsupported_type(column, requested)),
        },
        "decimal" => match params.len() {
            0 => "decimal (10, 0)".to_string(),
            1 => format!("decimal ({}, 0)", params[0]),
            2 => format!("decimal ({}, {})", params[0], params[1]),
            _ => return Err(MysqlError::unsupported_type(column, requested)),
        },
        t if LENGTHLESS_TYPES.contains(&t) => {
            if params.len() > 1 {
                return Err(MysqlError::unsupported_type(column, requested));
            }
            t.to_string()
        }
        t if FSP_TYPES.contains(&t) => match params.len() {
            0 => t.to_string(),
            1 => {
                let fsp: i64 = params[0]
                    .parse()
                    .map_err(|_| MysqlError::unsupported_type(column, requested))?;
                if !(0..=6).contains(&fsp) {
                    return Err(MysqlError::unsupported_type(column, requested));
                }
                format!("{t} ({fsp})")
            }
            _ => return Err(MysqlError::unsupported_type(column, requested)),
        },
        t if LENGTH_REQUIRED_TYPES.contains(&t) => match params.len() {
            1 => format!("{t} ({})", params[0]),
            _ => return Err(MysqlError::unsupported_type(column, requested)),
        },
        t if OPTIONAL_LENGTH_TYPES.contains(&t) => match params.len() {
            0 if t == "character" => "character (1)".to_string(),
            0 if t == "bit" => "bit (1)".to_string(),
            0 => t.to_string(),
            1 => format!("{t} ({})", params[0]),
            _ => return Err(MysqlError::unsupported_type(column, requested)),
        },
        t if UNPARAMETERIZED_TYPES.contains(&t) => match params.len() {
            0 => t.to_string(),
            1 => format!("{t} ({})", params[0]),
            2 => format!("{t} ({}, {})", params[0], params[1]),
            _ => return Err(MysqlError::unsupported_type(column, requested)),
        },
        _ => return Err(MysqlError::unsupported_type(column, requested)),
    };

    Ok(NormalizedType { data_type })
}

fn split_parameters(column: &str, lowered: &str) -> MysqlResult<(String, Vec<String>)> {
    let Some(open) = lowered.find('(') else {
        return Ok((lowered.to_string(), Vec::new()));
    };
    let Some(close) = lowered.rfind(')') else {
        return Err(MysqlError::unsupported_type(column, lowered));
    };
    let base = lowered[..open].trim().to_string();
    let params: Vec<String> = lowered[open + 1..close]
        .split(',')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    if params.iter().any(|p| p.parse::<i64>().is_err()) {
        return Err(MysqlError::unsupported_type(column, lowered));
    }
    Ok((base, params))
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
    fn test_boolean_and_int_widths() {
        assert_eq!(canon("bool"), "tinyint (1)");
        assert_eq!(canon("boolean"), "tinyint (1)");
        assert_eq!(canon("int"), "int (11)");
        assert_eq!(canon("integer"), "int (11)");
        assert_eq!(canon("int(11)"), "int (11)");
    }

    #[test]
    fn test_decimal_defaults() {
        assert_eq!(canon("decimal"), "decimal (10, 0)");
        assert_eq!(canon("dec"), "decimal (10, 0)");
        assert_eq!(canon("numeric"), "decimal (10, 0)");
        assert_eq!(canon("decimal(8)"), "decimal (8, 0)");
        assert_eq!(canon("decimal(8,2)"), "decimal (8, 2)");
    }

    #[test]
    fn test_double_precision_alias() {
        assert_eq!(canon("double precision"), "double");
        assert_eq!(canon("double"), "double");
    }

    #[test]
    fn test_character_types() {
        assert_eq!(canon("char(4)"), "character (4)");
        assert_eq!(canon("char"), "character (1)");
        assert_eq!(canon("varchar(255)"), "varchar (255)");
        assert!(normalize_column_type("c", "varchar").is_err());
    }

    #[test]
    fn test_text_lengths_are_stripped() {
        assert_eq!(canon("text"), "text");
        assert_eq!(canon("text (65535)"), "text");
        assert_eq!(canon("longtext(4294967295)"), "longtext");
        assert_eq!(canon("blob (65535)"), "blob");
    }

    #[test]
    fn test_fractional_seconds_precision() {
        assert_eq!(canon("datetime"), "datetime");
        assert_eq!(canon("datetime(6)"), "datetime (6)");
        assert_eq!(canon("timestamp(0)"), "timestamp (0)");
        assert!(normalize_column_type("c", "datetime(7)").is_err());
        assert!(normalize_column_type("c", "timestamp(-1)").is_err());
    }

    #[test]
    fn test_enum_passes_through() {
        assert_eq!(canon("enum('A','B')"), "enum('A','B')");
    }

    #[test]
    fn test_unsupported_type_names_the_column() {
        let err = normalize_column_type("age", "midint").unwrap_err();
        assert!(err.to_string().contains("age"));
    }
}
