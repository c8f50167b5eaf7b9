//! # schemahero-rqlite
//!
//! RQLite support for SchemaHero. Planning reuses the SQLite planner
//! (strict-table validation included); execution and introspection go
//! through the rqlite HTTP API, with composite plans applied as one
//! transactional batch.

pub mod connection;
pub mod error;
pub mod introspect;
pub mod plan;

pub use connection::RqliteConnection;
pub use error::{RqliteError, RqliteResult};
pub use plan::{plan_seed_data, plan_table};
