//! The plan/approve/apply reconciliation loop.
//!
//! One call handles one declared object. Planning persists a Migration
//! and never touches the live database beyond introspection; applying is
//! a separate pass triggered by the Migration reaching `approved`.

use std::time::Duration;

use schemahero_schema::digest::spec_digest;
use schemahero_schema::migration::{Migration, Phase};
use schemahero_schema::v1alpha4::Table;
use tracing::{info, warn};

use crate::database::SchemaConnection;
use crate::error::{ReconcileError, ReconcileResult};
use crate::plan;
use crate::store::StateStore;

/// What one reconciliation call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The spec digest matched the last plan; nothing to do.
    Skipped,
    /// A fresh plan was empty; the live state already converges.
    Converged,
    /// A Migration was created and awaits review. Carries its name.
    Planned(String),
    /// A prerequisite is unmet; retry after the given backoff.
    Requeue(Duration),
    /// The approved statements were executed.
    Applied,
    /// The Migration was already executed; applying again is a no-op.
    AlreadyExecuted,
    /// The Migration is not approved; nothing was executed.
    NotApproved,
}

/// Exponential backoff for cooperative requeues, capped at one minute.
pub fn backoff(attempt: u32) -> Duration {
    let seconds = 1u64 << attempt.min(6);
    Duration::from_secs(seconds.min(60))
}

/// Reconciles declared objects against their live databases, persisting
/// Migrations through the state store.
pub struct Reconciler<S> {
    store: S,
}

impl<S: StateStore> Reconciler<S> {
    /// Create a reconciler over a state store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    async fn has_outstanding_plan(&self, object: &str) -> ReconcileResult<bool> {
        Ok(self
            .store
            .migrations_for(object)
            .await?
            .iter()
            .any(|m| m.status.phase == Phase::Planned))
    }

    /// Reconcile one declared table: gate on `requires`, skip when the
    /// spec digest is unchanged, otherwise plan against fresh
    /// introspection and persist a Migration.
    pub async fn reconcile_table(
        &self,
        conn: &mut SchemaConnection,
        table: &Table,
        attempt: u32,
    ) -> ReconcileResult<Outcome> {
        let object = &table.spec.name;

        for prerequisite in &table.spec.requires {
            if self.has_outstanding_plan(prerequisite).await? {
                let delay = backoff(attempt);
                info!(
                    table = %object,
                    requires = %prerequisite,
                    delay_secs = delay.as_secs(),
                    "prerequisite has an outstanding plan, requeueing"
                );
                return Ok(Outcome::Requeue(delay));
            }
        }

        let digest = spec_digest(&table.spec)?;
        if self.store.last_planned_digest(object).await?.as_deref() == Some(digest.as_str()) {
            let latest_invalidated = self
                .store
                .migrations_for(object)
                .await?
                .last()
                .map(|m| m.status.phase == Phase::Invalidated)
                .unwrap_or(false);
            if !latest_invalidated {
                return Ok(Outcome::Skipped);
            }
        }

        let statements = plan::plan_table(conn, table).await?;
        if statements.is_empty() {
            self.store.set_last_planned_digest(object, &digest).await?;
            return Ok(Outcome::Converged);
        }

        // A fresh plan supersedes every plan that never executed.
        for mut migration in self.store.migrations_for(object).await? {
            if matches!(migration.status.phase, Phase::Planned | Phase::Approved) {
                migration.transition(Phase::Invalidated)?;
                self.store.put_migration(migration).await?;
            }
        }

        let migration = Migration::planned(object, &table.namespace, &digest, statements);
        let name = migration.name.clone();
        info!(table = %object, migration = %name, "planned migration");
        self.store.put_migration(migration).await?;
        self.store.set_last_planned_digest(object, &digest).await?;
        Ok(Outcome::Planned(name))
    }

    /// Mark a planned Migration approved.
    pub async fn approve_migration(&self, name: &str) -> ReconcileResult<()> {
        let mut migration = self
            .store
            .get_migration(name)
            .await?
            .ok_or_else(|| ReconcileError::MigrationNotFound(name.to_string()))?;
        migration.transition(Phase::Approved)?;
        self.store.put_migration(migration).await
    }

    /// Mark a planned Migration rejected.
    pub async fn reject_migration(&self, name: &str) -> ReconcileResult<()> {
        let mut migration = self
            .store
            .get_migration(name)
            .await?
            .ok_or_else(|| ReconcileError::MigrationNotFound(name.to_string()))?;
        migration.transition(Phase::Rejected)?;
        self.store.put_migration(migration).await
    }

    /// Execute an approved Migration's statements, using the edited DDL
    /// when present. A failure records the failing statement on the
    /// Migration and leaves it `approved` for operator intervention.
    pub async fn apply_migration(
        &self,
        conn: &mut SchemaConnection,
        name: &str,
    ) -> ReconcileResult<Outcome> {
        let mut migration = self
            .store
            .get_migration(name)
            .await?
            .ok_or_else(|| ReconcileError::MigrationNotFound(name.to_string()))?;

        match migration.status.phase {
            Phase::Executed => return Ok(Outcome::AlreadyExecuted),
            Phase::Approved => {}
            _ => return Ok(Outcome::NotApproved),
        }

        let statements = migration.statements().to_vec();
        match conn.deploy_statements(&statements).await {
            Ok(()) => {
                migration.transition(Phase::Executed)?;
                migration.status.failed_statement = None;
                migration.status.error = None;
                self.store.put_migration(migration).await?;
                Ok(Outcome::Applied)
            }
            Err(err) => {
                warn!(migration = %name, error = %err, "apply failed");
                migration.status.failed_statement =
                    err.failing_statement().map(str::to_string);
                migration.status.error = Some(err.to_string());
                self.store.put_migration(migration).await?;
                Err(err)
            }
        }
    }
}
