//! Catalog introspection over the HTTP query API.
//!
//! The same pragma functions the SQLite connector uses, issued as SQL
//! over `/db/query` and decoded from the JSON value rows.

use serde_json::Value;

use schemahero_schema::model::{
    Column, ColumnConstraints, ForeignKey, Index, KeyConstraint, LiveTable,
};
use schemahero_sqlite::{normalize_live_type, SqliteLiveTable};

use crate::connection::RqliteConnection;
use crate::error::RqliteResult;

impl RqliteConnection {
    /// Names of all user tables.
    pub async fn list_tables(&self) -> RqliteResult<Vec<String>> {
        let rows = self
            .query(
                "select name from sqlite_master \
                 where type = 'table' and name not like 'sqlite_%' order by name",
            )
            .await?;
        Ok(rows.iter().filter_map(|r| as_string(r.first())).collect())
    }

    /// Read one table into the normalized model. Returns None when the
    /// table does not exist.
    pub async fn introspect_table(&self, table: &str) -> RqliteResult<Option<SqliteLiveTable>> {
        let (columns, primary_key) = self.read_columns(table).await?;
        if columns.is_empty() {
            return Ok(None);
        }
        let foreign_keys = self.read_foreign_keys(table).await?;
        let (indexes, constraint_indexes) = self.read_indexes(table).await?;
        Ok(Some(SqliteLiveTable {
            table: LiveTable {
                name: table.to_string(),
                columns,
                primary_key,
                foreign_keys,
                indexes,
            },
            constraint_indexes,
        }))
    }

    async fn read_columns(
        &self,
        table: &str,
    ) -> RqliteResult<(Vec<Column>, Option<KeyConstraint>)> {
        let rows = self
            .query(&format!(
                "select name, type, \"notnull\", dflt_value, pk \
                 from pragma_table_info('{table}')"
            ))
            .await?;

        let mut columns = Vec::new();
        let mut pk_columns: Vec<(i64, String)> = Vec::new();
        for row in rows {
            let name = as_string(row.first()).unwrap_or_default();
            let data_type = as_string(row.get(1)).unwrap_or_default();
            let not_null = as_i64(row.get(2)).unwrap_or(0);
            let default = as_string(row.get(3));
            let pk = as_i64(row.get(4)).unwrap_or(0);

            if pk > 0 {
                pk_columns.push((pk, name.clone()));
            }
            columns.push(Column {
                name,
                data_type: normalize_live_type(&data_type),
                default: default.as_deref().map(strip_outer_quotes),
                constraints: (not_null != 0).then(|| ColumnConstraints {
                    not_null: Some(true),
                }),
                ..Default::default()
            });
        }

        pk_columns.sort_by_key(|(ordinal, _)| *ordinal);
        let primary_key = (!pk_columns.is_empty()).then(|| KeyConstraint {
            name: None,
            columns: pk_columns.into_iter().map(|(_, c)| c).collect(),
            is_primary: true,
        });
        Ok((columns, primary_key))
    }

    async fn read_foreign_keys(&self, table: &str) -> RqliteResult<Vec<ForeignKey>> {
        let rows = self
            .query(&format!(
                "select id, \"table\", \"from\", \"to\", on_delete \
                 from pragma_foreign_key_list('{table}') order by id, seq"
            ))
            .await?;

        let mut keys: Vec<(i64, ForeignKey)> = Vec::new();
        for row in rows {
            let id = as_i64(row.first()).unwrap_or(0);
            let parent_table = as_string(row.get(1)).unwrap_or_default();
            let child_column = as_string(row.get(2)).unwrap_or_default();
            let parent_column = as_string(row.get(3)).unwrap_or_default();
            let on_delete = as_string(row.get(4)).unwrap_or_default();

            match keys.iter_mut().find(|(fk_id, _)| *fk_id == id) {
                Some((_, key)) => {
                    key.child_columns.push(child_column);
                    key.parent_columns.push(parent_column);
                }
                None => keys.push((
                    id,
                    ForeignKey {
                        name: String::new(),
                        parent_table,
                        child_columns: vec![child_column],
                        parent_columns: vec![parent_column],
                        on_delete,
                    },
                )),
            }
        }
        Ok(keys.into_iter().map(|(_, fk)| fk).collect())
    }

    async fn read_indexes(&self, table: &str) -> RqliteResult<(Vec<Index>, Vec<Index>)> {
        let rows = self
            .query(&format!(
                "select name, \"unique\", origin from pragma_index_list('{table}') order by name"
            ))
            .await?;

        let mut plain = Vec::new();
        let mut constraint = Vec::new();
        for row in rows {
            let name = as_string(row.first()).unwrap_or_default();
            let is_unique = as_i64(row.get(1)).unwrap_or(0);
            let origin = as_string(row.get(2)).unwrap_or_default();

            let column_rows = self
                .query(&format!(
                    "select name from pragma_index_info('{name}') order by seqno"
                ))
                .await?;
            let columns = column_rows
                .iter()
                .filter_map(|r| as_string(r.first()))
                .collect();

            let index = Index {
                name,
                columns,
                is_unique: Some(is_unique != 0),
            };
            if origin == "c" {
                plain.push(index);
            } else {
                constraint.push(index);
            }
        }
        Ok((plain, constraint))
    }
}

fn as_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn as_i64(value: Option<&Value>) -> Option<i64> {
    match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
}

fn strip_outer_quotes(raw: &str) -> String {
    let trimmed = raw.trim();
    for quote in ['\'', '"', '`'] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            let inner = &trimmed[1..trimmed.len() - 1];
            if quote == '\'' {
                return inner.replace("''", "'");
            }
            return inner.to_string();
        }
    }
    trimmed.to_string()
}
