//! # schemahero-postgres
//!
//! PostgreSQL and CockroachDB support for SchemaHero: type normalization,
//! catalog introspection and DDL planning.
//!
//! This crate provides:
//! - Canonical type normalization (`int8` -> `bigint`, parameter defaults)
//! - Introspection of `information_schema`/`pg_catalog` into the
//!   normalized model
//! - Pure diff planning that emits ordered DDL statements
//! - A pooled connection wrapper using `deadpool-postgres`
//!
//! ## Example
//!
//! ```rust,ignore
//! use schemahero_postgres::{plan_table, PostgresConnection};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let conn = PostgresConnection::connect("postgres://localhost/app").await?;
//!     let live = conn.introspect_table("users").await?;
//!     let statements = plan_table("users", &declared, live.as_ref())?;
//!     conn.deploy_statements(&statements).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod connection;
pub mod ddl;
pub mod error;
pub mod introspect;
pub mod plan;
pub mod types;

pub use config::PostgresConfig;
pub use connection::PostgresConnection;
pub use error::{PostgresError, PostgresResult};
pub use plan::{plan_extension, plan_function, plan_seed_data, plan_table, plan_view};
pub use types::{normalize_column_type, NormalizedType};
