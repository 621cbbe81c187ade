//! Embedded single-process backend.
//!
//! SQLite runs `?` placeholders natively and reports generated keys through
//! `last_insert_rowid()`, so no statement rewriting happens here.

use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row as _, TypeInfo};

use super::schema::SQLITE_SCHEMA;
use super::{Backend, DbError, Row, SqlParam, SqlValue};

pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    pub async fn connect(path: &Path) -> Result<Self, DbError> {
        let in_memory = path.as_os_str() == ":memory:";
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);

        // An in-memory database lives and dies with its connection; pin the
        // pool to one persistent connection so every caller sees the same
        // tables.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await?;
        let backend = Self { pool };
        backend.ensure_schema().await?;
        Ok(backend)
    }

    async fn ensure_schema(&self) -> Result<(), DbError> {
        for ddl in SQLITE_SCHEMA {
            sqlx::query(ddl).execute(&self.pool).await?;
        }
        tracing::info!("SQLite tables initialized");
        Ok(())
    }
}

fn bind<'q>(
    sql: &'q str,
    params: &'q [SqlParam],
) -> sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>> {
    let mut query = sqlx::query(sql);
    for param in params {
        query = match param {
            SqlParam::Int(v) => query.bind(*v),
            SqlParam::Float(v) => query.bind(*v),
            SqlParam::Text(v) => query.bind(v.as_str()),
            SqlParam::OptInt(v) => query.bind(*v),
            SqlParam::OptText(v) => query.bind(v.as_deref()),
        };
    }
    query
}

fn decode_row(row: &SqliteRow) -> Result<Row, DbError> {
    let mut out = Row::default();
    for (index, column) in row.columns().iter().enumerate() {
        let value = match column.type_info().name() {
            "INTEGER" => row
                .try_get::<Option<i64>, _>(index)?
                .map_or(SqlValue::Null, SqlValue::Int),
            "REAL" | "NUMERIC" => row
                .try_get::<Option<f64>, _>(index)?
                .map_or(SqlValue::Null, SqlValue::Float),
            // DATETIME columns come back as UTC text; Row::get_timestamp
            // parses them on demand.
            "TEXT" | "DATETIME" | "DATE" | "TIME" => row
                .try_get::<Option<String>, _>(index)?
                .map_or(SqlValue::Null, SqlValue::Text),
            "BOOLEAN" => row
                .try_get::<Option<bool>, _>(index)?
                .map_or(SqlValue::Null, SqlValue::Bool),
            "NULL" => SqlValue::Null,
            other => {
                return Err(DbError::Column(format!("{} ({other})", column.name())));
            }
        };
        out.push(column.name(), value);
    }
    Ok(out)
}

#[async_trait]
impl Backend for SqliteBackend {
    async fn fetch_one(&self, sql: &str, params: &[SqlParam]) -> Result<Option<Row>, DbError> {
        let row = bind(sql, params).fetch_optional(&self.pool).await?;
        row.as_ref().map(decode_row).transpose()
    }

    async fn fetch_all(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<Row>, DbError> {
        let rows = bind(sql, params).fetch_all(&self.pool).await?;
        rows.iter().map(decode_row).collect()
    }

    async fn insert(&self, sql: &str, params: &[SqlParam]) -> Result<i64, DbError> {
        let result = bind(sql, params).execute(&self.pool).await?;
        Ok(result.last_insert_rowid())
    }

    async fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<u64, DbError> {
        let result = bind(sql, params).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
