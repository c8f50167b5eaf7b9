//! The v1alpha4 declarative resource schema.
//!
//! Resources from older apiVersions (alpha2, alpha3) parse into these types
//! as well; the shapes are additive across versions.

pub mod cassandra;
pub mod common;
pub mod datamigration;
pub mod datatype;
pub mod extension;
pub mod function;
pub mod mysql;
pub mod postgres;
pub mod sqlite;
pub mod table;
pub mod timescaledb;
pub mod view;

pub use cassandra::{
    CassandraClusteringOrder, CassandraColumn, CassandraDataTypeSchema, CassandraField,
    CassandraTableProperties, CassandraTableSchema,
};
pub use common::{ForeignKeyReferences, TableForeignKey, TableIndex};
pub use datamigration::{
    CalculatedUpdate, ColumnExpression, ColumnValue, CustomSql, DataMigration,
    DataMigrationOperation, DataMigrationSpec, FormatChange, ReplaceTransform, StaticUpdate,
    StringTransform, SubstringTransform, TimezoneConvert, TransformUpdate,
};
pub use datatype::{DataType, DataTypeSchema, DataTypeSpec, DataTypeStatus};
pub use extension::{DatabaseExtension, DatabaseExtensionSpec, DatabaseExtensionStatus};
pub use function::{Function, FunctionSchema, FunctionSpec, FunctionStatus};
pub use mysql::{MysqlTableColumn, MysqlTableSchema};
pub use postgres::{
    PostgresDatabaseExtension, PostgresFunctionParam, PostgresFunctionSchema, PostgresTableColumn,
    PostgresTableSchema, PostgresViewSchema,
};
pub use sqlite::{
    RqliteTableSchema, SqliteTableColumn, SqliteTableSchema, EMPTY_STRING_DEFAULT_SENTINEL,
};
pub use table::{
    SeedColumn, SeedData, SeedRow, SeedValue, Table, TableSchema, TableSpec, TableStatus,
};
pub use timescaledb::{
    Hypertable, HypertableCompression, HypertableRetention, TimescaleDBTableSchema,
    TimescaleDBViewSchema,
};
pub use view::{View, ViewSchema, ViewSpec, ViewStatus};
