//! Cassandra support: CQL type normalization, `system_schema`
//! introspection, and schema planning for tables and user-defined types.

pub mod config;
pub mod connection;
pub mod ddl;
pub mod error;
pub mod introspect;
pub mod plan;
pub mod types;

pub use config::CassandraConfig;
pub use connection::CassandraConnection;
pub use error::{CassandraError, CassandraResult};
pub use plan::{
    plan_table, plan_type, CassandraLiveColumn, CassandraLiveTable, CassandraLiveType,
};
pub use types::{normalize_column_type, NormalizedType};
