//! TimescaleDB support on top of the PostgreSQL connector: hypertable
//! registration, compression and retention policies, and continuous
//! aggregate views.

pub mod ddl;
pub mod error;
pub mod introspect;
pub mod plan;

pub use error::{TimescaleError, TimescaleResult};
pub use introspect::hypertable_state;
pub use plan::{plan_seed_data, plan_table, plan_view, HypertableState};

// Connectivity is the Postgres connector's; TimescaleDB only adds
// planning and policy introspection.
pub use schemahero_postgres::{PostgresConfig, PostgresConnection};
