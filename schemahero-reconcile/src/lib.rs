//! Reconciliation core: binds declared objects to live databases, plans
//! convergence DDL, and drives the plan/approve/apply Migration
//! lifecycle. Also hosts the data-migration planner, the offline
//! fixtures path, and YAML generation from live schemas.

pub mod database;
pub mod datamigration;
pub mod error;
pub mod generate;
pub mod plan;
pub mod reconcile;
pub mod store;

pub use database::{ConnectionInfo, Database, SchemaConnection};
pub use datamigration::plan_data_migration;
pub use error::{ReconcileError, ReconcileResult};
pub use generate::{kustomization_yaml, render_live_table, table_file_name};
pub use plan::{
    plan_datatype, plan_extension, plan_function, plan_table, plan_table_fixture, plan_view,
};
pub use reconcile::{backoff, Outcome, Reconciler};
pub use store::{InMemoryStateStore, StateStore};
