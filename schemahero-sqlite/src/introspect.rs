//! Catalog introspection via the pragma functions.
//!
//! `pragma_table_info`, `pragma_index_list` and `pragma_foreign_key_list`
//! supply everything the planner needs. Defaults come back quoted; one
//! matching pair of outer quotes is stripped. Indexes are partitioned by
//! origin: constraint-backing indexes (`u`, `pk`) cannot be dropped in
//! place and are kept apart from plain (`c`) indexes.

use schemahero_schema::model::{
    Column, ColumnConstraints, ForeignKey, Index, KeyConstraint, LiveTable,
};

use crate::connection::SqliteConnection;
use crate::error::SqliteResult;
use crate::plan::SqliteLiveTable;
use crate::types::normalize_live_type;

impl SqliteConnection {
    /// Names of all user tables.
    pub async fn list_tables(&self) -> SqliteResult<Vec<String>> {
        let tables = self
            .inner()
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "select name from sqlite_master \
                     where type = 'table' and name not like 'sqlite_%' order by name",
                )?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await?;
        Ok(tables)
    }

    /// Read one table into the normalized model. Returns None when the
    /// table does not exist.
    pub async fn introspect_table(&self, table: &str) -> SqliteResult<Option<SqliteLiveTable>> {
        let name = table.to_string();
        let live = self
            .inner()
            .call(move |conn| {
                let (columns, primary_key) = read_columns(conn, &name)?;
                if columns.is_empty() {
                    return Ok(None);
                }
                let foreign_keys = read_foreign_keys(conn, &name)?;
                let (indexes, constraint_indexes) = read_indexes(conn, &name)?;
                Ok(Some(SqliteLiveTable {
                    table: LiveTable {
                        name,
                        columns,
                        primary_key,
                        foreign_keys,
                        indexes,
                    },
                    constraint_indexes,
                }))
            })
            .await?;
        Ok(live)
    }
}

type TableInfo = (Vec<Column>, Option<KeyConstraint>);

fn read_columns(conn: &rusqlite::Connection, table: &str) -> rusqlite::Result<TableInfo> {
    let mut stmt =
        conn.prepare("select name, type, \"notnull\", dflt_value, pk from pragma_table_info(?1)")?;
    let mut rows = stmt.query([table])?;

    let mut columns = Vec::new();
    let mut pk_columns: Vec<(i64, String)> = Vec::new();
    while let Some(row) = rows.next()? {
        let name: String = row.get(0)?;
        let raw_type: String = row.get(1)?;
        let not_null: i64 = row.get(2)?;
        let raw_default: Option<String> = row.get(3)?;
        let pk: i64 = row.get(4)?;

        if pk > 0 {
            pk_columns.push((pk, name.clone()));
        }
        let constraints = if not_null != 0 {
            Some(ColumnConstraints {
                not_null: Some(true),
            })
        } else {
            None
        };
        columns.push(Column {
            name,
            data_type: normalize_live_type(&raw_type),
            default: raw_default.as_deref().map(strip_outer_quotes),
            constraints,
            ..Default::default()
        });
    }

    pk_columns.sort_by_key(|(ordinal, _)| *ordinal);
    let primary_key = if pk_columns.is_empty() {
        None
    } else {
        Some(KeyConstraint {
            name: None,
            columns: pk_columns.into_iter().map(|(_, c)| c).collect(),
            is_primary: true,
        })
    };
    Ok((columns, primary_key))
}

fn read_foreign_keys(
    conn: &rusqlite::Connection,
    table: &str,
) -> rusqlite::Result<Vec<ForeignKey>> {
    let mut stmt = conn.prepare(
        "select id, \"table\", \"from\", \"to\", on_delete \
         from pragma_foreign_key_list(?1) order by id, seq",
    )?;
    let mut rows = stmt.query([table])?;

    let mut keys: Vec<(i64, ForeignKey)> = Vec::new();
    while let Some(row) = rows.next()? {
        let id: i64 = row.get(0)?;
        let parent_table: String = row.get(1)?;
        let child_column: String = row.get(2)?;
        let parent_column: String = row.get(3)?;
        let on_delete: String = row.get(4)?;

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

type IndexPartition = (Vec<Index>, Vec<Index>);

fn read_indexes(conn: &rusqlite::Connection, table: &str) -> rusqlite::Result<IndexPartition> {
    let mut stmt =
        conn.prepare("select name, \"unique\", origin from pragma_index_list(?1) order by name")?;
    let mut rows = stmt.query([table])?;

    let mut plain = Vec::new();
    let mut constraint = Vec::new();
    while let Some(row) = rows.next()? {
        let name: String = row.get(0)?;
        let is_unique: i64 = row.get(1)?;
        let origin: String = row.get(2)?;

        let mut col_stmt =
            conn.prepare("select name from pragma_index_info(?1) order by seqno")?;
        let columns = col_stmt
            .query_map([&name], |r| r.get::<_, Option<String>>(0))?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .flatten()
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

/// Strip one matching pair of outer quotes from a stored default:
/// double quotes, single quotes or backticks.
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_outer_quotes() {
        assert_eq!(strip_outer_quotes("'active'"), "active");
        assert_eq!(strip_outer_quotes("\"active\""), "active");
        assert_eq!(strip_outer_quotes("`active`"), "active");
        assert_eq!(strip_outer_quotes("'it''s'"), "it's");
        assert_eq!(strip_outer_quotes("42"), "42");
        assert_eq!(strip_outer_quotes("''"), "");
    }

    #[tokio::test]
    async fn test_introspect_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.db");
        let conn = SqliteConnection::open(path.to_str().unwrap()).await.unwrap();

        conn.deploy_statements(&[
            "create table `t` (`one` integer, `two` text not null default 'x', \
             primary key (`one`), unique (`two`))"
                .to_string(),
            "create index `idx_t_two` on `t` (`two`)".to_string(),
        ])
        .await
        .unwrap();

        let live = conn.introspect_table("t").await.unwrap().unwrap();
        assert_eq!(live.table.columns.len(), 2);
        assert_eq!(live.table.columns[1].data_type, "text");
        assert_eq!(live.table.columns[1].default.as_deref(), Some("x"));
        assert!(live.table.columns[1].is_not_null());
        assert_eq!(
            live.table.primary_key.as_ref().unwrap().columns,
            vec!["one".to_string()]
        );
        assert_eq!(live.table.indexes.len(), 1);
        assert_eq!(live.constraint_indexes.len(), 1);

        assert!(conn.introspect_table("missing").await.unwrap().is_none());
    }
}
