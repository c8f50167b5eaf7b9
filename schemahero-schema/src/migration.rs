//! The Migration resource.
//!
//! A Migration is the persisted artifact representing one planned change set
//! for one declared object. It advances through a DAG of phases:
//! `planned -> {approved, rejected, invalidated}` and only `approved` may
//! reach `executed`; an `approved` plan that was never executed may still be
//! invalidated by a re-plan. `invalidated`, `rejected` and `executed` are
//! terminal; a fresh plan is always a new Migration.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{SchemaError, SchemaResult};

/// Phase of a Migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// A plan has been produced and awaits review.
    Planned,
    /// A newer plan superseded this one before it was approved.
    Invalidated,
    /// An operator approved the plan for execution.
    Approved,
    /// An operator rejected the plan.
    Rejected,
    /// The statements were executed against the live database.
    Executed,
}

impl Phase {
    /// Whether a transition from `self` to `to` is legal.
    pub fn can_transition_to(self, to: Phase) -> bool {
        matches!(
            (self, to),
            (Phase::Planned, Phase::Approved)
                | (Phase::Planned, Phase::Rejected)
                | (Phase::Planned, Phase::Invalidated)
                | (Phase::Approved, Phase::Executed)
                | (Phase::Approved, Phase::Invalidated)
        )
    }

    /// Whether this phase admits no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Invalidated | Phase::Rejected | Phase::Executed)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::Planned => "planned",
            Phase::Invalidated => "invalidated",
            Phase::Approved => "approved",
            Phase::Rejected => "rejected",
            Phase::Executed => "executed",
        };
        f.write_str(s)
    }
}

/// Spec of a Migration resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationSpec {
    /// Name of the declared table this Migration targets.
    #[serde(rename = "tableName")]
    pub table_name: String,
    /// Namespace of the declared table.
    #[serde(rename = "tableNamespace", default)]
    pub table_namespace: String,
    /// Statements produced at plan time, one complete SQL statement each.
    #[serde(rename = "generatedDDL", default)]
    pub generated_ddl: Vec<String>,
    /// Optional human-edited replacement for the generated statements.
    #[serde(rename = "editedDDL", skip_serializing_if = "Option::is_none")]
    pub edited_ddl: Option<Vec<String>>,
}

/// Status of a Migration resource, with unix-nano timestamps for each
/// phase transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationStatus {
    /// Current phase.
    pub phase: Phase,
    /// When the plan was produced.
    #[serde(rename = "plannedAt", skip_serializing_if = "Option::is_none")]
    pub planned_at: Option<i64>,
    /// When the plan was invalidated.
    #[serde(rename = "invalidatedAt", skip_serializing_if = "Option::is_none")]
    pub invalidated_at: Option<i64>,
    /// When the plan was approved.
    #[serde(rename = "approvedAt", skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<i64>,
    /// When the plan was rejected.
    #[serde(rename = "rejectedAt", skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<i64>,
    /// When the statements were executed.
    #[serde(rename = "executedAt", skip_serializing_if = "Option::is_none")]
    pub executed_at: Option<i64>,
    /// The statement that failed during execution, if any.
    #[serde(rename = "failedStatement", skip_serializing_if = "Option::is_none")]
    pub failed_statement: Option<String>,
    /// The execution error, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Default for MigrationStatus {
    fn default() -> Self {
        Self {
            phase: Phase::Planned,
            planned_at: None,
            invalidated_at: None,
            approved_at: None,
            rejected_at: None,
            executed_at: None,
            failed_statement: None,
            error: None,
        }
    }
}

/// A Migration resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Migration {
    /// Resource name: `{object}-{digest[:7]}-{unix_nano}`.
    pub name: String,
    /// Spec: the plan.
    pub spec: MigrationSpec,
    /// Status: phase and transition timestamps.
    #[serde(default)]
    pub status: MigrationStatus,
}

impl Migration {
    /// Create a new Migration in the `planned` phase.
    pub fn planned(
        object_name: &str,
        namespace: &str,
        spec_digest: &str,
        generated_ddl: Vec<String>,
    ) -> Self {
        let now = unix_nano_now();
        let short = crate::digest::short_digest(spec_digest);
        Self {
            name: format!("{object_name}-{short}-{now}"),
            spec: MigrationSpec {
                table_name: object_name.to_string(),
                table_namespace: namespace.to_string(),
                generated_ddl,
                edited_ddl: None,
            },
            status: MigrationStatus {
                phase: Phase::Planned,
                planned_at: Some(now),
                ..Default::default()
            },
        }
    }

    /// Transition to a new phase, stamping the transition timestamp.
    ///
    /// Fails when the transition is not an edge of the phase DAG.
    pub fn transition(&mut self, to: Phase) -> SchemaResult<()> {
        let from = self.status.phase;
        if !from.can_transition_to(to) {
            return Err(SchemaError::PhaseTransition {
                migration: self.name.clone(),
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        let now = unix_nano_now();
        match to {
            Phase::Planned => self.status.planned_at = Some(now),
            Phase::Invalidated => self.status.invalidated_at = Some(now),
            Phase::Approved => self.status.approved_at = Some(now),
            Phase::Rejected => self.status.rejected_at = Some(now),
            Phase::Executed => self.status.executed_at = Some(now),
        }
        self.status.phase = to;
        Ok(())
    }

    /// The statements to execute: the edited DDL when present, otherwise the
    /// generated DDL.
    pub fn statements(&self) -> &[String] {
        match &self.spec.edited_ddl {
            Some(edited) => edited,
            None => &self.spec.generated_ddl,
        }
    }
}

/// Current time in unix nanoseconds.
pub fn unix_nano_now() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_dag() {
        assert!(Phase::Planned.can_transition_to(Phase::Approved));
        assert!(Phase::Planned.can_transition_to(Phase::Rejected));
        assert!(Phase::Planned.can_transition_to(Phase::Invalidated));
        assert!(Phase::Approved.can_transition_to(Phase::Executed));
        assert!(Phase::Approved.can_transition_to(Phase::Invalidated));

        assert!(!Phase::Planned.can_transition_to(Phase::Executed));
        assert!(!Phase::Invalidated.can_transition_to(Phase::Approved));
        assert!(!Phase::Executed.can_transition_to(Phase::Planned));
        assert!(!Phase::Rejected.can_transition_to(Phase::Executed));
    }

    #[test]
    fn test_invalidated_is_terminal() {
        assert!(Phase::Invalidated.is_terminal());
        assert!(Phase::Rejected.is_terminal());
        assert!(Phase::Executed.is_terminal());
        assert!(!Phase::Planned.is_terminal());
        assert!(!Phase::Approved.is_terminal());
    }

    #[test]
    fn test_migration_name_shape() {
        let m = Migration::planned(
            "users",
            "default",
            "0123456789abcdef",
            vec!["create table \"users\" ()".to_string()],
        );
        assert!(m.name.starts_with("users-0123456-"));
        assert_eq!(m.status.phase, Phase::Planned);
        assert!(m.status.planned_at.is_some());
    }

    #[test]
    fn test_transition_stamps_timestamps() {
        let mut m = Migration::planned("users", "default", "abcdef0", vec![]);
        m.transition(Phase::Approved).unwrap();
        assert!(m.status.approved_at.is_some());
        m.transition(Phase::Executed).unwrap();
        assert!(m.status.executed_at.is_some());
        assert_eq!(m.status.phase, Phase::Executed);
    }

    #[test]
    fn test_illegal_transition_fails() {
        let mut m = Migration::planned("users", "default", "abcdef0", vec![]);
        let err = m.transition(Phase::Executed).unwrap_err();
        assert!(err.to_string().contains("planned"));
        assert!(err.to_string().contains("executed"));
    }

    #[test]
    fn test_edited_ddl_wins() {
        let mut m = Migration::planned(
            "users",
            "default",
            "abcdef0",
            vec!["generated".to_string()],
        );
        assert_eq!(m.statements(), ["generated".to_string()]);
        m.spec.edited_ddl = Some(vec!["edited".to_string()]);
        assert_eq!(m.statements(), ["edited".to_string()]);
    }
}
