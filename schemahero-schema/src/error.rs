//! Error types for schema resources.

use thiserror::Error;

/// Result type alias for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur while loading or validating declared objects.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// YAML parse error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON encoding error (digest canonicalization).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unknown or unsupported apiVersion.
    #[error("Unsupported apiVersion '{0}'")]
    UnsupportedApiVersion(String),

    /// Unknown resource kind.
    #[error("Unknown kind '{0}'")]
    UnknownKind(String),

    /// A declared object failed validation.
    #[error("Validation error for '{object}': {message}")]
    Validation {
        /// Object identity (database/name).
        object: String,
        /// What failed.
        message: String,
    },

    /// Engine exclusivity was violated (programming or authoring error).
    #[error("Table '{0}' must populate exactly one engine schema, found {1}")]
    EngineExclusivity(String, usize),

    /// An illegal migration phase transition was requested.
    #[error("Migration '{migration}' cannot transition from {from} to {to}")]
    PhaseTransition {
        /// Migration name.
        migration: String,
        /// Current phase.
        from: String,
        /// Requested phase.
        to: String,
    },
}

impl SchemaError {
    /// Create a validation error.
    pub fn validation(object: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            object: object.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = SchemaError::validation("default/users", "empty column name");
        let msg = err.to_string();
        assert!(msg.contains("default/users"));
        assert!(msg.contains("empty column name"));
    }
}
