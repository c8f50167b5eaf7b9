//! Spec digests.
//!
//! `status.lastPlannedSpecDigest` is a SHA-256 over a canonical encoding of
//! the spec alone. The canonical form is the serde_json encoding of the
//! typed spec struct: field order is fixed by the struct definition, so
//! reordering keys in the YAML source cannot perturb the digest, while
//! column order lives in a Vec and remains semantic.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::SchemaResult;

/// Compute the hex-encoded SHA-256 digest of a spec.
pub fn spec_digest<T: Serialize>(spec: &T) -> SchemaResult<String> {
    let encoded = serde_json::to_vec(spec)?;
    let mut hasher = Sha256::new();
    hasher.update(&encoded);
    Ok(hex::encode(hasher.finalize()))
}

/// The short form of a digest used in Migration names: the first 7 hex chars.
pub fn short_digest(digest: &str) -> &str {
    &digest[..digest.len().min(7)]
}

/// Hex-encoded SHA-256 of an arbitrary byte string. Used for the
/// content-derived temporary table name in the SQLite rebuild procedure.
pub fn content_digest(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Spec {
        name: String,
        columns: Vec<String>,
    }

    #[test]
    fn test_digest_is_stable() {
        let spec = Spec {
            name: "users".to_string(),
            columns: vec!["id".to_string(), "email".to_string()],
        };
        let a = spec_digest(&spec).unwrap();
        let b = spec_digest(&spec).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_digest_is_column_order_sensitive() {
        let a = spec_digest(&Spec {
            name: "users".to_string(),
            columns: vec!["id".to_string(), "email".to_string()],
        })
        .unwrap();
        let b = spec_digest(&Spec {
            name: "users".to_string(),
            columns: vec!["email".to_string(), "id".to_string()],
        })
        .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_short_digest() {
        let d = "0123456789abcdef";
        assert_eq!(short_digest(d), "0123456");
    }
}
