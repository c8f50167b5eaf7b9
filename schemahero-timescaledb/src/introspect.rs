//! Hypertable state introspection.
//!
//! Reads the `timescaledb_information` views to decide which timescale
//! calls a plan still has to emit.

use schemahero_postgres::error::PostgresError;
use schemahero_postgres::PostgresConnection;

use crate::error::TimescaleResult;
use crate::plan::HypertableState;

const HYPERTABLE: &str = "select compression_enabled \
     from timescaledb_information.hypertables where hypertable_name = $1";

const POLICY_JOBS: &str = "select proc_name \
     from timescaledb_information.jobs where hypertable_name = $1";

/// Read the hypertable state for one table. A table missing from
/// `timescaledb_information.hypertables` yields the all-false state.
pub async fn hypertable_state(
    conn: &PostgresConnection,
    table: &str,
) -> TimescaleResult<HypertableState> {
    let rows = conn.query(HYPERTABLE, &[&table]).await?;
    let row = match rows.first() {
        Some(row) => row,
        None => return Ok(HypertableState::default()),
    };
    let compression_enabled: bool = row.try_get(0).map_err(PostgresError::from)?;

    let mut state = HypertableState {
        is_hypertable: true,
        compression_enabled,
        has_compression_policy: false,
        has_retention_policy: false,
    };
    for row in conn.query(POLICY_JOBS, &[&table]).await? {
        let proc_name: String = row.try_get(0).map_err(PostgresError::from)?;
        match proc_name.as_str() {
            "policy_compression" => state.has_compression_policy = true,
            "policy_retention" => state.has_retention_policy = true,
            _ => {}
        }
    }
    Ok(state)
}
