//! Control-plane state access.
//!
//! The reconciler reads and writes object status and Migrations through
//! this trait. The in-memory implementation backs tests and the
//! standalone CLI path; a controller deployment supplies its own.

use std::collections::HashMap;

use schemahero_schema::migration::Migration;
use tokio::sync::RwLock;

use crate::error::ReconcileResult;

/// Persistence seam for reconciliation state.
///
/// Writes are last-writer-wins; per-object serialization is the
/// caller's responsibility.
#[async_trait::async_trait]
pub trait StateStore: Send + Sync {
    /// The spec digest recorded at the last plan for this object.
    async fn last_planned_digest(&self, object: &str) -> ReconcileResult<Option<String>>;

    /// Record the spec digest of the latest plan.
    async fn set_last_planned_digest(&self, object: &str, digest: &str) -> ReconcileResult<()>;

    /// All Migrations targeting one object, oldest first.
    async fn migrations_for(&self, object: &str) -> ReconcileResult<Vec<Migration>>;

    /// Fetch one Migration by name.
    async fn get_migration(&self, name: &str) -> ReconcileResult<Option<Migration>>;

    /// Persist a Migration, replacing any prior version of the same name.
    async fn put_migration(&self, migration: Migration) -> ReconcileResult<()>;
}

#[derive(Default)]
struct InMemoryState {
    digests: HashMap<String, String>,
    // Insertion-ordered per object.
    migrations: Vec<Migration>,
}

/// An in-process [`StateStore`].
#[derive(Default)]
pub struct InMemoryStateStore {
    state: RwLock<InMemoryState>,
}

impl InMemoryStateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl StateStore for InMemoryStateStore {
    async fn last_planned_digest(&self, object: &str) -> ReconcileResult<Option<String>> {
        Ok(self.state.read().await.digests.get(object).cloned())
    }

    async fn set_last_planned_digest(&self, object: &str, digest: &str) -> ReconcileResult<()> {
        self.state
            .write()
            .await
            .digests
            .insert(object.to_string(), digest.to_string());
        Ok(())
    }

    async fn migrations_for(&self, object: &str) -> ReconcileResult<Vec<Migration>> {
        Ok(self
            .state
            .read()
            .await
            .migrations
            .iter()
            .filter(|m| m.spec.table_name == object)
            .cloned()
            .collect())
    }

    async fn get_migration(&self, name: &str) -> ReconcileResult<Option<Migration>> {
        Ok(self
            .state
            .read()
            .await
            .migrations
            .iter()
            .find(|m| m.name == name)
            .cloned())
    }

    async fn put_migration(&self, migration: Migration) -> ReconcileResult<()> {
        let mut state = self.state.write().await;
        match state.migrations.iter_mut().find(|m| m.name == migration.name) {
            Some(existing) => *existing = migration,
            None => state.migrations.push(migration),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_replaces_by_name() {
        let store = InMemoryStateStore::new();
        let mut m = Migration::planned("users", "", "abcdef01", vec!["a".to_string()]);
        store.put_migration(m.clone()).await.unwrap();
        m.spec.generated_ddl = vec!["b".to_string()];
        store.put_migration(m.clone()).await.unwrap();

        let migrations = store.migrations_for("users").await.unwrap();
        assert_eq!(migrations.len(), 1);
        assert_eq!(migrations[0].spec.generated_ddl, vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn digest_roundtrip() {
        let store = InMemoryStateStore::new();
        assert!(store.last_planned_digest("users").await.unwrap().is_none());
        store.set_last_planned_digest("users", "deadbeef").await.unwrap();
        assert_eq!(
            store.last_planned_digest("users").await.unwrap().as_deref(),
            Some("deadbeef")
        );
    }
}
