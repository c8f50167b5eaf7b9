//! # schemahero-sqlite
//!
//! SQLite support for SchemaHero: pragma-based introspection, affinity
//! type validation and DDL planning.
//!
//! SQLite cannot modify a column in place, so the planner falls back to
//! a content-addressed table rebuild (rename, recreate, copy, drop)
//! whenever a primary key, foreign key, existing column or
//! constraint-backing index changes. The RQLite crate reuses this
//! planner with the transaction wrapper disabled.

pub mod connection;
pub mod ddl;
pub mod error;
pub mod introspect;
pub mod plan;
pub mod types;

pub use connection::SqliteConnection;
pub use error::{SqliteError, SqliteResult};
pub use plan::{plan_seed_data, plan_table, SqliteLiveTable};
pub use types::{normalize_column_type, normalize_live_type};
