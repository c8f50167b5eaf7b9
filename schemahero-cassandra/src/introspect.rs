//! Live schema introspection from `system_schema`.

use crate::connection::CassandraConnection;
use crate::error::{CassandraError, CassandraResult};
use crate::plan::{CassandraLiveColumn, CassandraLiveTable, CassandraLiveType};

const LIST_TABLES: &str =
    "select table_name from system_schema.tables where keyspace_name = ?";

const LIST_COLUMNS: &str = "select column_name, type, kind, position \
     from system_schema.columns where keyspace_name = ? and table_name = ?";

const GET_TYPE: &str = "select field_names, field_types \
     from system_schema.types where keyspace_name = ? and type_name = ?";

impl CassandraConnection {
    /// List the table names of the connection's keyspace.
    pub async fn list_tables(&self) -> CassandraResult<Vec<String>> {
        let result = self
            .session()
            .query_unpaged(LIST_TABLES, (self.keyspace(),))
            .await?;
        let rows = result
            .rows_typed::<(String,)>()
            .map_err(|e| CassandraError::Decode(e.to_string()))?;
        let mut tables = Vec::new();
        for row in rows {
            let (name,) = row.map_err(|e| CassandraError::Decode(e.to_string()))?;
            tables.push(name);
        }
        Ok(tables)
    }

    /// Read one table, rebuilding the composite key shape from the
    /// partition-key and clustering kinds. Returns `None` when the table
    /// does not exist.
    pub async fn introspect_table(
        &self,
        table: &str,
    ) -> CassandraResult<Option<CassandraLiveTable>> {
        let result = self
            .session()
            .query_unpaged(LIST_COLUMNS, (self.keyspace(), table))
            .await?;
        let rows = result
            .rows_typed::<(String, String, String, i32)>()
            .map_err(|e| CassandraError::Decode(e.to_string()))?;

        let mut columns = Vec::new();
        let mut partition: Vec<(i32, String)> = Vec::new();
        let mut clustering: Vec<(i32, String)> = Vec::new();
        for row in rows {
            let (name, data_type, kind, position) =
                row.map_err(|e| CassandraError::Decode(e.to_string()))?;
            match kind.as_str() {
                "partition_key" => partition.push((position, name.clone())),
                "clustering" => clustering.push((position, name.clone())),
                _ => {}
            }
            columns.push(CassandraLiveColumn {
                name,
                data_type: data_type.to_lowercase(),
                is_static: kind == "static",
            });
        }
        if columns.is_empty() {
            return Ok(None);
        }

        partition.sort_by_key(|(position, _)| *position);
        clustering.sort_by_key(|(position, _)| *position);
        let mut primary_key =
            vec![partition.into_iter().map(|(_, name)| name).collect::<Vec<_>>()];
        for (_, name) in clustering {
            primary_key.push(vec![name]);
        }

        Ok(Some(CassandraLiveTable {
            name: table.to_string(),
            columns,
            primary_key,
        }))
    }

    /// Read one user-defined type. Returns `None` when it does not exist.
    pub async fn introspect_type(
        &self,
        name: &str,
    ) -> CassandraResult<Option<CassandraLiveType>> {
        let result = self
            .session()
            .query_unpaged(GET_TYPE, (self.keyspace(), name))
            .await?;
        let mut rows = result
            .rows_typed::<(Vec<String>, Vec<String>)>()
            .map_err(|e| CassandraError::Decode(e.to_string()))?;
        let row = match rows.next() {
            Some(row) => row.map_err(|e| CassandraError::Decode(e.to_string()))?,
            None => return Ok(None),
        };
        let (names, types) = row;
        let fields = names
            .into_iter()
            .zip(types.into_iter().map(|t| t.to_lowercase()))
            .collect();
        Ok(Some(CassandraLiveType {
            name: name.to_string(),
            fields,
        }))
    }
}
