use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

use crate::config::DatabaseConfig;

pub mod postgres;
pub mod schema;
pub mod sqlite;

pub use postgres::PostgresBackend;
pub use sqlite::SqliteBackend;

/// Persistence failure surfaced by the adapter.
///
/// Everything the driver reports funnels through here; callers only ever
/// branch on [`DbError::is_unique_violation`], never on backend detail.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Driver(#[from] sqlx::Error),

    #[error("column '{0}' is missing or has an unexpected type")]
    Column(String),
}

impl DbError {
    /// True when the underlying failure is a unique-constraint violation,
    /// e.g. a ticket code collision at insert time.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DbError::Driver(sqlx::Error::Database(e)) => e.is_unique_violation(),
            _ => false,
        }
    }
}

/// A positional bind parameter for a backend-neutral query.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i64),
    Float(f64),
    Text(String),
    OptInt(Option<i64>),
    OptText(Option<String>),
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        SqlParam::Int(v)
    }
}

impl From<f64> for SqlParam {
    fn from(v: f64) -> Self {
        SqlParam::Float(v)
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::Text(v.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        SqlParam::Text(v)
    }
}

impl From<Option<i64>> for SqlParam {
    fn from(v: Option<i64>) -> Self {
        SqlParam::OptInt(v)
    }
}

impl From<Option<String>> for SqlParam {
    fn from(v: Option<String>) -> Self {
        SqlParam::OptText(v)
    }
}

/// Builds a `Vec<SqlParam>` from heterogeneous values.
#[macro_export]
macro_rules! params {
    () => { Vec::<$crate::db::SqlParam>::new() };
    ($($value:expr),+ $(,)?) => {
        vec![$($crate::db::SqlParam::from($value)),+]
    };
}

/// A decoded column value, normalized across backends.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

/// A single result row as returned by the adapter.
///
/// Columns keep their query order; lookups are by name. Typed getters do the
/// small normalizations the two backends disagree on (SQLite hands
/// `CURRENT_TIMESTAMP` columns back as text, aggregate zeros come back as
/// integers).
#[derive(Debug, Clone, Default)]
pub struct Row {
    columns: Vec<(String, SqlValue)>,
}

impl Row {
    pub(crate) fn push(&mut self, name: &str, value: SqlValue) {
        self.columns.push((name.to_string(), value));
    }

    fn value(&self, name: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn get_i64(&self, name: &str) -> Result<i64, DbError> {
        match self.value(name) {
            Some(SqlValue::Int(v)) => Ok(*v),
            _ => Err(DbError::Column(name.to_string())),
        }
    }

    pub fn get_opt_i64(&self, name: &str) -> Result<Option<i64>, DbError> {
        match self.value(name) {
            Some(SqlValue::Int(v)) => Ok(Some(*v)),
            Some(SqlValue::Null) | None => Ok(None),
            _ => Err(DbError::Column(name.to_string())),
        }
    }

    pub fn get_f64(&self, name: &str) -> Result<f64, DbError> {
        match self.value(name) {
            Some(SqlValue::Float(v)) => Ok(*v),
            // SQLite reports e.g. COALESCE(SUM(..), 0) over an empty table
            // with integer affinity.
            Some(SqlValue::Int(v)) => Ok(*v as f64),
            _ => Err(DbError::Column(name.to_string())),
        }
    }

    pub fn get_str(&self, name: &str) -> Result<String, DbError> {
        match self.value(name) {
            Some(SqlValue::Text(v)) => Ok(v.clone()),
            _ => Err(DbError::Column(name.to_string())),
        }
    }

    pub fn get_opt_str(&self, name: &str) -> Result<Option<String>, DbError> {
        match self.value(name) {
            Some(SqlValue::Text(v)) => Ok(Some(v.clone())),
            Some(SqlValue::Null) | None => Ok(None),
            _ => Err(DbError::Column(name.to_string())),
        }
    }

    pub fn get_timestamp(&self, name: &str) -> Result<DateTime<Utc>, DbError> {
        self.get_opt_timestamp(name)?
            .ok_or_else(|| DbError::Column(name.to_string()))
    }

    pub fn get_opt_timestamp(&self, name: &str) -> Result<Option<DateTime<Utc>>, DbError> {
        match self.value(name) {
            Some(SqlValue::Timestamp(v)) => Ok(Some(*v)),
            Some(SqlValue::Text(v)) => parse_text_timestamp(v)
                .map(Some)
                .ok_or_else(|| DbError::Column(name.to_string())),
            Some(SqlValue::Null) | None => Ok(None),
            _ => Err(DbError::Column(name.to_string())),
        }
    }
}

/// SQLite stores `CURRENT_TIMESTAMP` as `YYYY-MM-DD HH:MM:SS` text in UTC.
fn parse_text_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// One operation contract over both storage engines.
///
/// Queries are written once with `?` positional placeholders; each backend
/// owns its own dialect translation, so no call site ever branches on the
/// engine in use.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Fetch at most one row.
    async fn fetch_one(&self, sql: &str, params: &[SqlParam]) -> Result<Option<Row>, DbError>;

    /// Fetch all matching rows in query order.
    async fn fetch_all(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<Row>, DbError>;

    /// Run an INSERT and return the generated primary key without a
    /// follow-up query.
    async fn insert(&self, sql: &str, params: &[SqlParam]) -> Result<i64, DbError>;

    /// Run a mutation and return the affected-row count. Conditional
    /// mutations inspect this count to detect "no row matched".
    async fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<u64, DbError>;
}

/// Cheap-to-clone handle over the backend selected at startup.
#[derive(Clone)]
pub struct Db {
    backend: Arc<dyn Backend>,
}

impl Db {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Connect to the configured backend and ensure the schema exists.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbError> {
        let backend: Arc<dyn Backend> = match config {
            DatabaseConfig::Postgres { url } => {
                tracing::info!("Using PostgreSQL database");
                Arc::new(PostgresBackend::connect(url).await?)
            }
            DatabaseConfig::Sqlite { path } => {
                tracing::info!(path = %path.display(), "Using SQLite database");
                Arc::new(SqliteBackend::connect(path).await?)
            }
        };
        Ok(Self::new(backend))
    }

    pub async fn fetch_one(&self, sql: &str, params: &[SqlParam]) -> Result<Option<Row>, DbError> {
        self.backend.fetch_one(sql, params).await
    }

    pub async fn fetch_all(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<Row>, DbError> {
        self.backend.fetch_all(sql, params).await
    }

    pub async fn insert(&self, sql: &str, params: &[SqlParam]) -> Result<i64, DbError> {
        self.backend.insert(sql, params).await
    }

    pub async fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<u64, DbError> {
        self.backend.execute(sql, params).await
    }
}
