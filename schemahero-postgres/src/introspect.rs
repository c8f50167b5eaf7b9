//! Catalog introspection.
//!
//! Reads `information_schema` and `pg_catalog` into the normalized model
//! the planner diffs against. Types come back canonical (the same form
//! the type normalizer produces) so converged tables diff to nothing.

use schemahero_schema::model::{
    Column, ColumnConstraints, ForeignKey, Index, KeyConstraint, LiveTable,
};

use crate::connection::PostgresConnection;
use crate::error::PostgresResult;
use crate::types::unalias;

const LIST_TABLES: &str = r#"
select table_name from information_schema.tables
where table_schema = $1 and table_type = 'BASE TABLE'
order by table_name"#;

const LIST_COLUMNS: &str = r#"
select column_name, data_type, udt_name, character_maximum_length,
       column_default, is_nullable
from information_schema.columns
where table_schema = $1 and table_name = $2
order by ordinal_position"#;

const PRIMARY_KEY: &str = r#"
select tc.constraint_name, kcu.column_name
from information_schema.table_constraints tc
join information_schema.key_column_usage kcu
  on kcu.constraint_name = tc.constraint_name
 and kcu.table_schema = tc.table_schema
where tc.table_schema = $1 and tc.table_name = $2
  and tc.constraint_type = 'PRIMARY KEY'
order by kcu.ordinal_position"#;

const FOREIGN_KEYS: &str = r#"
select tc.constraint_name, kcu.column_name, ccu.table_name, ccu.column_name,
       rc.delete_rule
from information_schema.table_constraints tc
join information_schema.key_column_usage kcu
  on kcu.constraint_name = tc.constraint_name
 and kcu.table_schema = tc.table_schema
join information_schema.constraint_column_usage ccu
  on ccu.constraint_name = tc.constraint_name
 and ccu.table_schema = tc.table_schema
join information_schema.referential_constraints rc
  on rc.constraint_name = tc.constraint_name
 and rc.constraint_schema = tc.table_schema
where tc.table_schema = $1 and tc.table_name = $2
  and tc.constraint_type = 'FOREIGN KEY'
order by tc.constraint_name, kcu.ordinal_position"#;

const INDEXES: &str = r#"
select i.relname, ix.indisunique, a.attname
from pg_catalog.pg_index ix
join pg_catalog.pg_class t on t.oid = ix.indrelid
join pg_catalog.pg_class i on i.oid = ix.indexrelid
join pg_catalog.pg_namespace n on n.oid = t.relnamespace
join pg_catalog.pg_attribute a
  on a.attrelid = t.oid and a.attnum = any(ix.indkey)
where n.nspname = $1 and t.relname = $2 and not ix.indisprimary
order by i.relname, array_position(ix.indkey, a.attnum)"#;

const VIEW_QUERY: &str = r#"
select view_definition from information_schema.views
where table_schema = $1 and table_name = $2"#;

const MATERIALIZED_VIEW_QUERY: &str = r#"
select definition from pg_catalog.pg_matviews
where schemaname = $1 and matviewname = $2"#;

const FUNCTION_EXISTS: &str = r#"
select count(*) from pg_catalog.pg_proc p
join pg_catalog.pg_namespace n on n.oid = p.pronamespace
where n.nspname = $1 and p.proname = $2"#;

const INSTALLED_EXTENSIONS: &str = "select extname from pg_catalog.pg_extension";

impl PostgresConnection {
    fn search_schema(&self) -> &str {
        self.config()
            .schemas
            .first()
            .map(String::as_str)
            .unwrap_or("public")
    }

    /// Names of all base tables in the search schema.
    pub async fn list_tables(&self) -> PostgresResult<Vec<String>> {
        let rows = self.query(LIST_TABLES, &[&self.search_schema()]).await?;
        Ok(rows.iter().map(|r| r.get(0)).collect())
    }

    /// Whether the table exists.
    pub async fn table_exists(&self, table: &str) -> PostgresResult<bool> {
        Ok(self.list_tables().await?.iter().any(|t| t == table))
    }

    /// Read one table into the normalized model. Returns None when the
    /// table does not exist.
    pub async fn introspect_table(&self, table: &str) -> PostgresResult<Option<LiveTable>> {
        let schema = self.search_schema().to_string();
        let columns = self.read_columns(&schema, table).await?;
        if columns.is_empty() {
            return Ok(None);
        }

        Ok(Some(LiveTable {
            name: table.to_string(),
            columns,
            primary_key: self.read_primary_key(&schema, table).await?,
            foreign_keys: self.read_foreign_keys(&schema, table).await?,
            indexes: self.read_indexes(&schema, table).await?,
        }))
    }

    async fn read_columns(&self, schema: &str, table: &str) -> PostgresResult<Vec<Column>> {
        let rows = self.query(LIST_COLUMNS, &[&schema, &table]).await?;
        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            let name: String = row.get(0);
            let data_type: String = row.get(1);
            let udt_name: String = row.get(2);
            let max_length: Option<i32> = row.get(3);
            let raw_default: Option<String> = row.get(4);
            let is_nullable: String = row.get(5);

            let (data_type, is_array) = canonical_type(&data_type, &udt_name, max_length);
            let constraints = if is_nullable == "NO" {
                Some(ColumnConstraints {
                    not_null: Some(true),
                })
            } else {
                None
            };

            columns.push(Column {
                name,
                data_type,
                is_array,
                default: raw_default.as_deref().map(strip_default_cast),
                constraints,
                ..Default::default()
            });
        }
        Ok(columns)
    }

    async fn read_primary_key(
        &self,
        schema: &str,
        table: &str,
    ) -> PostgresResult<Option<KeyConstraint>> {
        let rows = self.query(PRIMARY_KEY, &[&schema, &table]).await?;
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(KeyConstraint {
            name: Some(rows[0].get(0)),
            columns: rows.iter().map(|r| r.get(1)).collect(),
            is_primary: true,
        }))
    }

    async fn read_foreign_keys(
        &self,
        schema: &str,
        table: &str,
    ) -> PostgresResult<Vec<ForeignKey>> {
        let rows = self.query(FOREIGN_KEYS, &[&schema, &table]).await?;
        let mut keys: Vec<ForeignKey> = Vec::new();
        for row in rows {
            let name: String = row.get(0);
            let child_column: String = row.get(1);
            let parent_table: String = row.get(2);
            let parent_column: String = row.get(3);
            let delete_rule: String = row.get(4);

            match keys.iter_mut().find(|k| k.name == name) {
                Some(key) => {
                    if !key.child_columns.contains(&child_column) {
                        key.child_columns.push(child_column);
                    }
                    if !key.parent_columns.contains(&parent_column) {
                        key.parent_columns.push(parent_column);
                    }
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

    async fn read_indexes(&self, schema: &str, table: &str) -> PostgresResult<Vec<Index>> {
        let rows = self.query(INDEXES, &[&schema, &table]).await?;
        let mut indexes: Vec<Index> = Vec::new();
        for row in rows {
            let name: String = row.get(0);
            let is_unique: bool = row.get(1);
            let column: String = row.get(2);

            match indexes.iter_mut().find(|i| i.name == name) {
                Some(index) => index.columns.push(column),
                None => indexes.push(Index {
                    name,
                    columns: vec![column],
                    is_unique: Some(is_unique),
                }),
            }
        }
        Ok(indexes)
    }

    /// The defining query of a view or materialized view, when it exists.
    pub async fn view_definition(&self, view: &str) -> PostgresResult<Option<String>> {
        let schema = self.search_schema().to_string();
        let rows = self.query(VIEW_QUERY, &[&schema, &view]).await?;
        if let Some(row) = rows.first() {
            return Ok(Some(row.get(0)));
        }
        let rows = self
            .query(MATERIALIZED_VIEW_QUERY, &[&schema, &view])
            .await?;
        Ok(rows.first().map(|r| r.get(0)))
    }

    /// Whether a function with this name exists in the search schema.
    pub async fn function_exists(&self, name: &str) -> PostgresResult<bool> {
        let schema = self.search_schema().to_string();
        let row = self.query_one(FUNCTION_EXISTS, &[&schema, &name]).await?;
        let count: i64 = row.get(0);
        Ok(count > 0)
    }

    /// Installed extension names.
    pub async fn installed_extensions(&self) -> PostgresResult<Vec<String>> {
        let rows = self.query(INSTALLED_EXTENSIONS, &[]).await?;
        Ok(rows.iter().map(|r| r.get(0)).collect())
    }
}

/// Canonical form of a catalog type. Array columns report `ARRAY` with a
/// `_`-prefixed udt name; parameterized character types carry their
/// length separately.
fn canonical_type(data_type: &str, udt_name: &str, max_length: Option<i32>) -> (String, bool) {
    if data_type == "ARRAY" {
        let element = unalias(udt_name.trim_start_matches('_')).to_string();
        return (element, true);
    }

    let base = data_type.to_lowercase();
    match (base.as_str(), max_length) {
        ("character varying", Some(n)) => (format!("character varying ({n})"), false),
        ("character", Some(n)) => (format!("character ({n})"), false),
        ("bit", Some(n)) => (format!("bit ({n})"), false),
        ("bit varying", Some(n)) => (format!("bit varying ({n})"), false),
        _ => (base, false),
    }
}

/// Strip the `::type` cast the catalog appends to literal defaults and
/// unwrap the quotes: `'active'::text` becomes `active`. Expression
/// defaults pass through untouched.
fn strip_default_cast(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_cast = match trimmed.rfind("::") {
        Some(pos) if trimmed[..pos].ends_with('\'') => &trimmed[..pos],
        _ => trimmed,
    };
    if without_cast.len() >= 2 && without_cast.starts_with('\'') && without_cast.ends_with('\'') {
        without_cast[1..without_cast.len() - 1].replace("''", "'")
    } else {
        without_cast.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_type_arrays() {
        assert_eq!(canonical_type("ARRAY", "_int8", None), ("bigint".to_string(), true));
        assert_eq!(canonical_type("ARRAY", "_text", None), ("text".to_string(), true));
    }

    #[test]
    fn test_canonical_type_parameterized() {
        assert_eq!(
            canonical_type("character varying", "varchar", Some(255)),
            ("character varying (255)".to_string(), false)
        );
        assert_eq!(
            canonical_type("timestamp with time zone", "timestamptz", None),
            ("timestamp with time zone".to_string(), false)
        );
    }

    #[test]
    fn test_strip_default_cast() {
        assert_eq!(strip_default_cast("'active'::text"), "active");
        assert_eq!(strip_default_cast("'it''s'::character varying"), "it's");
        assert_eq!(strip_default_cast("11"), "11");
        assert_eq!(
            strip_default_cast("nextval('users_id_seq'::regclass)"),
            "nextval('users_id_seq'::regclass)"
        );
        assert_eq!(strip_default_cast("now()"), "now()");
    }
}
