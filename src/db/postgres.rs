//! Client/server backend.
//!
//! Postgres wants `$1..$n` placeholders and does not expose a last-insert-id,
//! so this backend rewrites statements on the way in: positional `?` markers
//! become numbered parameters, and INSERTs gain a `RETURNING id` clause when
//! the caller did not write one.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use sqlx::postgres::{PgArguments, PgPool, PgPoolOptions, PgRow};
use sqlx::{Column, Row as _, TypeInfo};

use super::schema::POSTGRES_SCHEMA;
use super::{Backend, DbError, Row, SqlParam, SqlValue};

pub struct PostgresBackend {
    pool: PgPool,
}

impl PostgresBackend {
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new().max_connections(5).connect(url).await?;
        let backend = Self { pool };
        backend.ensure_schema().await?;
        Ok(backend)
    }

    async fn ensure_schema(&self) -> Result<(), DbError> {
        for ddl in POSTGRES_SCHEMA {
            sqlx::query(ddl).execute(&self.pool).await?;
        }
        tracing::info!("PostgreSQL tables initialized");
        Ok(())
    }
}

/// Rewrite `?` markers to `$1..$n`, preserving order so the Nth placeholder
/// still binds the Nth parameter. Markers inside quoted string literals are
/// left alone.
fn numbered_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut next = 0u32;
    let mut in_literal = false;
    for ch in sql.chars() {
        match ch {
            '\'' => {
                in_literal = !in_literal;
                out.push(ch);
            }
            '?' if !in_literal => {
                next += 1;
                out.push('$');
                out.push_str(&next.to_string());
            }
            _ => out.push(ch),
        }
    }
    out
}

fn bind<'q>(
    sql: &'q str,
    params: &'q [SqlParam],
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
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

fn decode_row(row: &PgRow) -> Result<Row, DbError> {
    let mut out = Row::default();
    for (index, column) in row.columns().iter().enumerate() {
        let value = match column.type_info().name() {
            "INT2" => row
                .try_get::<Option<i16>, _>(index)?
                .map_or(SqlValue::Null, |v| SqlValue::Int(i64::from(v))),
            "INT4" => row
                .try_get::<Option<i32>, _>(index)?
                .map_or(SqlValue::Null, |v| SqlValue::Int(i64::from(v))),
            "INT8" => row
                .try_get::<Option<i64>, _>(index)?
                .map_or(SqlValue::Null, SqlValue::Int),
            "FLOAT4" => row
                .try_get::<Option<f32>, _>(index)?
                .map_or(SqlValue::Null, |v| SqlValue::Float(f64::from(v))),
            "FLOAT8" => row
                .try_get::<Option<f64>, _>(index)?
                .map_or(SqlValue::Null, SqlValue::Float),
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => row
                .try_get::<Option<String>, _>(index)?
                .map_or(SqlValue::Null, SqlValue::Text),
            "BOOL" => row
                .try_get::<Option<bool>, _>(index)?
                .map_or(SqlValue::Null, SqlValue::Bool),
            "TIMESTAMPTZ" => row
                .try_get::<Option<DateTime<Utc>>, _>(index)?
                .map_or(SqlValue::Null, SqlValue::Timestamp),
            "TIMESTAMP" => row
                .try_get::<Option<NaiveDateTime>, _>(index)?
                .map_or(SqlValue::Null, |v| {
                    SqlValue::Timestamp(Utc.from_utc_datetime(&v))
                }),
            other => {
                return Err(DbError::Column(format!("{} ({other})", column.name())));
            }
        };
        out.push(column.name(), value);
    }
    Ok(out)
}

#[async_trait]
impl Backend for PostgresBackend {
    async fn fetch_one(&self, sql: &str, params: &[SqlParam]) -> Result<Option<Row>, DbError> {
        let sql = numbered_placeholders(sql);
        let row = bind(&sql, params).fetch_optional(&self.pool).await?;
        row.as_ref().map(decode_row).transpose()
    }

    async fn fetch_all(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<Row>, DbError> {
        let sql = numbered_placeholders(sql);
        let rows = bind(&sql, params).fetch_all(&self.pool).await?;
        rows.iter().map(decode_row).collect()
    }

    async fn insert(&self, sql: &str, params: &[SqlParam]) -> Result<i64, DbError> {
        let mut sql = numbered_placeholders(sql);
        if !sql.to_ascii_lowercase().contains("returning") {
            sql.push_str(" RETURNING id");
        }
        let row = bind(&sql, params).fetch_one(&self.pool).await?;
        decode_row(&row)?.get_i64("id")
    }

    async fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<u64, DbError> {
        let sql = numbered_placeholders(sql);
        let result = bind(&sql, params).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::numbered_placeholders;

    #[test]
    fn test_placeholders_are_numbered_in_order() {
        assert_eq!(
            numbered_placeholders("UPDATE events SET stock = stock - ? WHERE id = ? AND stock >= ?"),
            "UPDATE events SET stock = stock - $1 WHERE id = $2 AND stock >= $3"
        );
    }

    #[test]
    fn test_placeholders_inside_literals_are_preserved() {
        assert_eq!(
            numbered_placeholders("SELECT * FROM tickets WHERE code = '?' AND status = ?"),
            "SELECT * FROM tickets WHERE code = '?' AND status = $1"
        );
    }

    #[test]
    fn test_statement_without_placeholders_is_unchanged() {
        let sql = "SELECT COUNT(*) AS total_tickets FROM tickets";
        assert_eq!(numbered_placeholders(sql), sql);
    }
}
