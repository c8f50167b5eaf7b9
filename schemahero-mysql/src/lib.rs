//! # schemahero-mysql
//!
//! MySQL support for SchemaHero: type normalization, catalog
//! introspection and DDL planning.
//!
//! Canonical MySQL types carry display widths (`int (11)`, `tinyint (1)`)
//! so the catalog's `COLUMN_TYPE` and user-written types compare equal.
//! Connection strings are rewritten to force `multiStatements=true`.

pub mod config;
pub mod connection;
pub mod ddl;
pub mod error;
pub mod introspect;
pub mod plan;
pub mod types;

pub use config::{rewrite_uri, MysqlConfig};
pub use connection::MysqlConnection;
pub use error::{MysqlError, MysqlResult};
pub use plan::{plan_seed_data, plan_table};
pub use types::{normalize_column_type, NormalizedType};
