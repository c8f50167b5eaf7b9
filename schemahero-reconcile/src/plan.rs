//! Engine dispatch for planning declared objects.
//!
//! Each function introspects the relevant live object through the open
//! connection, calls the engine planner, and returns the statement list.
//! Plans are always computed against fresh introspection; an aborted
//! apply simply re-plans against the new live state next time.

use schemahero_schema::v1alpha4::{DataType, DatabaseExtension, Function, Table, View};
use schemahero_schema::Engine;

use crate::database::SchemaConnection;
use crate::error::{ReconcileError, ReconcileResult};

fn engine_mismatch(object: &str, declared: Engine, actual: Engine) -> ReconcileError {
    ReconcileError::EngineMismatch {
        object: object.to_string(),
        declared: declared.to_string(),
        actual: actual.to_string(),
    }
}

/// Whether a connection of engine `actual` can serve objects declared
/// for `declared`. CockroachDB objects plan through the Postgres
/// connector.
fn compatible(declared: Engine, actual: Engine) -> bool {
    match declared {
        Engine::Cockroachdb => matches!(actual, Engine::Postgres | Engine::Cockroachdb),
        other => other == actual,
    }
}

fn check_engine(
    object: &str,
    declared: Engine,
    conn: &SchemaConnection,
) -> ReconcileResult<()> {
    if compatible(declared, conn.engine()) {
        Ok(())
    } else {
        Err(engine_mismatch(object, declared, conn.engine()))
    }
}

/// Plan DDL for one declared table against fresh introspection, seed
/// statements included.
pub async fn plan_table(
    conn: &mut SchemaConnection,
    table: &Table,
) -> ReconcileResult<Vec<String>> {
    let name = &table.spec.name;
    let engine = table.spec.schema.assert_exclusive(name)?;
    check_engine(name, engine, conn)?;
    let seed = table.spec.seed_data.as_ref();

    let statements = match conn {
        SchemaConnection::Postgres(pg) => {
            // Exclusivity was already asserted; exactly one branch is set.
            let declared = table
                .spec
                .schema
                .postgres
                .as_ref()
                .or(table.spec.schema.cockroachdb.as_ref())
                .ok_or_else(|| engine_mismatch(name, engine, Engine::Postgres))?;
            let live = pg.introspect_table(name).await?;
            let mut statements =
                schemahero_postgres::plan_table(name, declared, live.as_ref())?;
            if let Some(seed) = seed {
                statements.extend(schemahero_postgres::plan_seed_data(name, declared, seed));
            }
            statements
        }
        SchemaConnection::Timescaledb(pg) => {
            let declared = table
                .spec
                .schema
                .timescaledb
                .as_ref()
                .ok_or_else(|| engine_mismatch(name, engine, Engine::Timescaledb))?;
            let live = pg.introspect_table(name).await?;
            let state = schemahero_timescaledb::hypertable_state(pg, name).await?;
            let mut statements = schemahero_timescaledb::plan_table(
                name,
                declared,
                live.as_ref(),
                Some(&state),
            )?;
            if let Some(seed) = seed {
                statements.extend(schemahero_timescaledb::plan_seed_data(
                    name, declared, seed,
                ));
            }
            statements
        }
        SchemaConnection::Mysql(mysql) => {
            let declared = table
                .spec
                .schema
                .mysql
                .as_ref()
                .ok_or_else(|| engine_mismatch(name, engine, Engine::Mysql))?;
            let live = mysql.introspect_table(name).await?;
            let mut statements = schemahero_mysql::plan_table(name, declared, live.as_ref())?;
            if let Some(seed) = seed {
                statements.extend(schemahero_mysql::plan_seed_data(name, declared, seed));
            }
            statements
        }
        SchemaConnection::Sqlite(sqlite) => {
            let declared = table
                .spec
                .schema
                .sqlite
                .as_ref()
                .ok_or_else(|| engine_mismatch(name, engine, Engine::Sqlite))?;
            let live = sqlite.introspect_table(name).await?;
            let mut statements =
                schemahero_sqlite::plan_table(name, declared, false, live.as_ref(), true)?;
            if let Some(seed) = seed {
                statements.extend(schemahero_sqlite::plan_seed_data(name, declared, seed));
            }
            statements
        }
        SchemaConnection::Rqlite(rqlite) => {
            let declared = table
                .spec
                .schema
                .rqlite
                .as_ref()
                .ok_or_else(|| engine_mismatch(name, engine, Engine::Rqlite))?;
            let live = rqlite.introspect_table(name).await?;
            let mut statements = schemahero_rqlite::plan_table(name, declared, live.as_ref())?;
            if let Some(seed) = seed {
                statements.extend(schemahero_rqlite::plan_seed_data(name, declared, seed));
            }
            statements
        }
        SchemaConnection::Cassandra(cassandra) => {
            let declared = table
                .spec
                .schema
                .cassandra
                .as_ref()
                .ok_or_else(|| engine_mismatch(name, engine, Engine::Cassandra))?;
            if seed.is_some() {
                return Err(ReconcileError::validation(
                    name,
                    "seed data is not supported for cassandra tables",
                ));
            }
            let live = cassandra.introspect_table(name).await?;
            let keyspace = cassandra.keyspace().to_string();
            schemahero_cassandra::plan_table(&keyspace, name, declared, live.as_ref())?
        }
    };
    Ok(statements)
}

/// Plan the CREATE statements for one declared table with no live state.
/// This is the offline fixtures path: no connection is opened.
pub fn plan_table_fixture(table: &Table) -> ReconcileResult<Vec<String>> {
    let name = &table.spec.name;
    let engine = table.spec.schema.assert_exclusive(name)?;
    let seed = table.spec.seed_data.as_ref();
    let schema = &table.spec.schema;

    let mut statements = match engine {
        Engine::Postgres | Engine::Cockroachdb => {
            let declared = schema
                .postgres
                .as_ref()
                .or(schema.cockroachdb.as_ref())
                .ok_or_else(|| engine_mismatch(name, engine, Engine::Postgres))?;
            let mut statements = schemahero_postgres::plan_table(name, declared, None)?;
            if let Some(seed) = seed {
                statements.extend(schemahero_postgres::plan_seed_data(name, declared, seed));
            }
            statements
        }
        Engine::Timescaledb => {
            let declared = schema
                .timescaledb
                .as_ref()
                .ok_or_else(|| engine_mismatch(name, engine, Engine::Timescaledb))?;
            schemahero_timescaledb::plan_table(name, declared, None, None)?
        }
        Engine::Mysql => {
            let declared = schema
                .mysql
                .as_ref()
                .ok_or_else(|| engine_mismatch(name, engine, Engine::Mysql))?;
            let mut statements = schemahero_mysql::plan_table(name, declared, None)?;
            if let Some(seed) = seed {
                statements.extend(schemahero_mysql::plan_seed_data(name, declared, seed));
            }
            statements
        }
        Engine::Sqlite => {
            let declared = schema
                .sqlite
                .as_ref()
                .ok_or_else(|| engine_mismatch(name, engine, Engine::Sqlite))?;
            schemahero_sqlite::plan_table(name, declared, false, None, true)?
        }
        Engine::Rqlite => {
            let declared = schema
                .rqlite
                .as_ref()
                .ok_or_else(|| engine_mismatch(name, engine, Engine::Rqlite))?;
            schemahero_rqlite::plan_table(name, declared, None)?
        }
        Engine::Cassandra => {
            let declared = schema
                .cassandra
                .as_ref()
                .ok_or_else(|| engine_mismatch(name, engine, Engine::Cassandra))?;
            // Offline, the logical database name stands in for the keyspace.
            schemahero_cassandra::plan_table(&table.spec.database, name, declared, None)?
        }
    };
    statements.retain(|s| !s.is_empty());
    Ok(statements)
}

/// Plan DDL for one declared view.
pub async fn plan_view(conn: &mut SchemaConnection, view: &View) -> ReconcileResult<Vec<String>> {
    let name = &view.spec.name;
    let engine = view.spec.schema.assert_exclusive(name)?;
    check_engine(name, engine, conn)?;

    match conn {
        SchemaConnection::Postgres(pg) => {
            let declared = view
                .spec
                .schema
                .postgres
                .as_ref()
                .ok_or_else(|| engine_mismatch(name, engine, Engine::Postgres))?;
            let live_query = pg.view_definition(name).await?;
            Ok(schemahero_postgres::plan_view(
                name,
                declared,
                live_query.as_deref(),
            ))
        }
        SchemaConnection::Timescaledb(pg) => {
            let declared = view
                .spec
                .schema
                .timescaledb
                .as_ref()
                .ok_or_else(|| engine_mismatch(name, engine, Engine::Timescaledb))?;
            let live_query = pg.view_definition(name).await?;
            Ok(schemahero_timescaledb::plan_view(
                name,
                declared,
                live_query.as_deref(),
            ))
        }
        other => Err(ReconcileError::validation(
            name,
            format!("views are not supported for {}", other.engine()),
        )),
    }
}

/// Plan DDL for one declared user-defined type.
pub async fn plan_datatype(
    conn: &mut SchemaConnection,
    datatype: &DataType,
) -> ReconcileResult<Vec<String>> {
    let name = &datatype.spec.name;
    let engine = datatype.spec.schema.assert_exclusive(name)?;
    check_engine(name, engine, conn)?;

    match conn {
        SchemaConnection::Cassandra(cassandra) => {
            let declared = datatype
                .spec
                .schema
                .cassandra
                .as_ref()
                .ok_or_else(|| engine_mismatch(name, engine, Engine::Cassandra))?;
            let live = cassandra.introspect_type(name).await?;
            let keyspace = cassandra.keyspace().to_string();
            Ok(schemahero_cassandra::plan_type(
                &keyspace,
                name,
                declared,
                live.as_ref(),
            )?)
        }
        other => Err(ReconcileError::validation(
            name,
            format!("user-defined types are not supported for {}", other.engine()),
        )),
    }
}

/// Plan DDL for one declared function.
pub async fn plan_function(
    conn: &mut SchemaConnection,
    function: &Function,
) -> ReconcileResult<Vec<String>> {
    let name = &function.spec.name;
    let engine = function.spec.schema.assert_exclusive(name)?;
    check_engine(name, engine, conn)?;

    match conn {
        SchemaConnection::Postgres(pg) | SchemaConnection::Timescaledb(pg) => {
            let declared = function
                .spec
                .schema
                .postgres
                .as_ref()
                .or(function.spec.schema.timescaledb.as_ref())
                .ok_or_else(|| engine_mismatch(name, engine, Engine::Postgres))?;
            let exists = pg.function_exists(name).await?;
            Ok(schemahero_postgres::plan_function(name, declared, exists))
        }
        other => Err(ReconcileError::validation(
            name,
            format!("functions are not supported for {}", other.engine()),
        )),
    }
}

/// Plan DDL for one declared extension.
pub async fn plan_extension(
    conn: &mut SchemaConnection,
    extension: &DatabaseExtension,
) -> ReconcileResult<Vec<String>> {
    let name = &extension.name;
    let engine = extension.spec.assert_exclusive(name)?;
    check_engine(name, engine, conn)?;

    match conn {
        SchemaConnection::Postgres(pg) | SchemaConnection::Timescaledb(pg) => {
            let declared = extension
                .spec
                .postgres
                .as_ref()
                .or(extension.spec.timescaledb.as_ref())
                .ok_or_else(|| engine_mismatch(name, engine, Engine::Postgres))?;
            let installed = pg.installed_extensions().await?;
            Ok(schemahero_postgres::plan_extension(declared, &installed))
        }
        other => Err(ReconcileError::validation(
            name,
            format!("extensions are not supported for {}", other.engine()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schemahero_schema::v1alpha4::{
        PostgresTableColumn, PostgresTableSchema, TableSchema, TableSpec,
    };

    fn postgres_table(name: &str) -> Table {
        Table {
            name: name.to_string(),
            namespace: String::new(),
            spec: TableSpec {
                database: "db".to_string(),
                name: name.to_string(),
                requires: Vec::new(),
                schema: TableSchema {
                    postgres: Some(PostgresTableSchema {
                        primary_key: vec!["id".to_string()],
                        columns: vec![PostgresTableColumn {
                            name: "id".to_string(),
                            column_type: "integer".to_string(),
                            ..Default::default()
                        }],
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                seed_data: None,
            },
            status: Default::default(),
        }
    }

    #[test]
    fn fixture_plan_is_the_create_statement() {
        let table = postgres_table("simple");
        let statements = plan_table_fixture(&table).unwrap();
        assert_eq!(
            statements,
            vec!["create table \"simple\" (\"id\" integer, primary key (\"id\"))"]
        );
    }

    #[test]
    fn fixture_plan_rejects_ambiguous_engines() {
        let mut table = postgres_table("simple");
        table.spec.schema.mysql = Some(Default::default());
        assert!(plan_table_fixture(&table).is_err());
    }

    #[test]
    fn cockroach_tables_plan_through_postgres() {
        assert!(compatible(Engine::Cockroachdb, Engine::Postgres));
        assert!(!compatible(Engine::Postgres, Engine::Mysql));
    }
}
