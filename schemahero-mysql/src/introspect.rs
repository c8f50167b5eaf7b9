//! Catalog introspection.
//!
//! Reads `information_schema.COLUMNS`, `STATISTICS`, `KEY_COLUMN_USAGE`
//! and `REFERENTIAL_CONSTRAINTS` into the normalized model. The reported
//! `COLUMN_TYPE` goes back through the normalizer so a converged table
//! diffs to nothing.

use schemahero_schema::model::{
    Column, ColumnAttributes, ColumnConstraints, ForeignKey, Index, KeyConstraint, LiveTable,
};

use crate::connection::MysqlConnection;
use crate::error::MysqlResult;
use crate::types::normalize_column_type;

const LIST_TABLES: &str = r#"
select TABLE_NAME from information_schema.TABLES
where TABLE_SCHEMA = ? and TABLE_TYPE = 'BASE TABLE'
order by TABLE_NAME"#;

const LIST_COLUMNS: &str = r#"
select COLUMN_NAME, COLUMN_TYPE, IS_NULLABLE, COLUMN_DEFAULT, EXTRA,
       CHARACTER_SET_NAME, COLLATION_NAME
from information_schema.COLUMNS
where TABLE_SCHEMA = ? and TABLE_NAME = ?
order by ORDINAL_POSITION"#;

const PRIMARY_KEY: &str = r#"
select COLUMN_NAME from information_schema.KEY_COLUMN_USAGE
where TABLE_SCHEMA = ? and TABLE_NAME = ? and CONSTRAINT_NAME = 'PRIMARY'
order by ORDINAL_POSITION"#;

const FOREIGN_KEYS: &str = r#"
select kcu.CONSTRAINT_NAME, kcu.COLUMN_NAME, kcu.REFERENCED_TABLE_NAME,
       kcu.REFERENCED_COLUMN_NAME, rc.DELETE_RULE
from information_schema.KEY_COLUMN_USAGE kcu
join information_schema.REFERENTIAL_CONSTRAINTS rc
  on rc.CONSTRAINT_NAME = kcu.CONSTRAINT_NAME
 and rc.CONSTRAINT_SCHEMA = kcu.TABLE_SCHEMA
where kcu.TABLE_SCHEMA = ? and kcu.TABLE_NAME = ?
  and kcu.REFERENCED_TABLE_NAME is not null
order by kcu.CONSTRAINT_NAME, kcu.ORDINAL_POSITION"#;

const INDEXES: &str = r#"
select INDEX_NAME, NON_UNIQUE, COLUMN_NAME
from information_schema.STATISTICS
where TABLE_SCHEMA = ? and TABLE_NAME = ? and INDEX_NAME <> 'PRIMARY'
order by INDEX_NAME, SEQ_IN_INDEX"#;

impl MysqlConnection {
    /// Names of all base tables in the connected database.
    pub async fn list_tables(&mut self) -> MysqlResult<Vec<String>> {
        let database = self.database_name().to_string();
        let rows = self.query_rows(LIST_TABLES, (database,)).await?;
        Ok(rows
            .into_iter()
            .filter_map(|mut r| r.take::<String, _>(0))
            .collect())
    }

    /// Read one table into the normalized model. Returns None when the
    /// table does not exist.
    pub async fn introspect_table(&mut self, table: &str) -> MysqlResult<Option<LiveTable>> {
        let columns = self.read_columns(table).await?;
        if columns.is_empty() {
            return Ok(None);
        }

        Ok(Some(LiveTable {
            name: table.to_string(),
            columns,
            primary_key: self.read_primary_key(table).await?,
            foreign_keys: self.read_foreign_keys(table).await?,
            indexes: self.read_indexes(table).await?,
        }))
    }

    async fn read_columns(&mut self, table: &str) -> MysqlResult<Vec<Column>> {
        let database = self.database_name().to_string();
        let rows = self
            .query_rows(LIST_COLUMNS, (database, table.to_string()))
            .await?;

        let mut columns = Vec::with_capacity(rows.len());
        for mut row in rows {
            let name: String = row.take(0).unwrap_or_default();
            let column_type: String = row.take(1).unwrap_or_default();
            let is_nullable: String = row.take(2).unwrap_or_default();
            let default: Option<String> = row.take(3).unwrap_or(None);
            let extra: String = row.take(4).unwrap_or_default();
            let charset: Option<String> = row.take(5).unwrap_or(None);
            let collation: Option<String> = row.take(6).unwrap_or(None);

            let normalized = normalize_column_type(&name, &column_type)?;
            let constraints = if is_nullable == "NO" {
                Some(ColumnConstraints {
                    not_null: Some(true),
                })
            } else {
                None
            };
            let attributes = if extra.contains("auto_increment") {
                Some(ColumnAttributes {
                    auto_increment: Some(true),
                })
            } else {
                None
            };

            columns.push(Column {
                name,
                data_type: normalized.data_type,
                default,
                charset,
                collation,
                constraints,
                attributes,
                ..Default::default()
            });
        }
        Ok(columns)
    }

    async fn read_primary_key(&mut self, table: &str) -> MysqlResult<Option<KeyConstraint>> {
        let database = self.database_name().to_string();
        let rows = self
            .query_rows(PRIMARY_KEY, (database, table.to_string()))
            .await?;
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(KeyConstraint {
            name: Some("PRIMARY".to_string()),
            columns: rows
                .into_iter()
                .filter_map(|mut r| r.take::<String, _>(0))
                .collect(),
            is_primary: true,
        }))
    }

    async fn read_foreign_keys(&mut self, table: &str) -> MysqlResult<Vec<ForeignKey>> {
        let database = self.database_name().to_string();
        let rows = self
            .query_rows(FOREIGN_KEYS, (database, table.to_string()))
            .await?;

        let mut keys: Vec<ForeignKey> = Vec::new();
        for mut row in rows {
            let name: String = row.take(0).unwrap_or_default();
            let child_column: String = row.take(1).unwrap_or_default();
            let parent_table: String = row.take(2).unwrap_or_default();
            let parent_column: String = row.take(3).unwrap_or_default();
            let delete_rule: String = row.take(4).unwrap_or_default();

            match keys.iter_mut().find(|k| k.name == name) {
                Some(key) => {
                    key.child_columns.push(child_column);
                    key.parent_columns.push(parent_column);
                }
                None => keys.push(ForeignKey {
                    name,
                    parent_table,
                    child_columns: vec![child_column],
                    parent_columns: vec![parent_column],
                    on_delete: delete_rule,
                }),
            }
        }
        Ok(keys)
    }

    async fn read_indexes(&mut self, table: &str) -> MysqlResult<Vec<Index>> {
        let database = self.database_name().to_string();
        let rows = self
            .query_rows(INDEXES, (database, table.to_string()))
            .await?;

        let mut indexes: Vec<Index> = Vec::new();
        for mut row in rows {
            let name: String = row.take(0).unwrap_or_default();
            let non_unique: i64 = row.take(1).unwrap_or(1);
            let column: String = row.take(2).unwrap_or_default();

            match indexes.iter_mut().find(|i| i.name == name) {
                Some(index) => index.columns.push(column),
                None => indexes.push(Index {
                    name,
                    columns: vec![column],
                    is_unique: Some(non_unique == 0),
                }),
            }
        }
        Ok(indexes)
    }
}
