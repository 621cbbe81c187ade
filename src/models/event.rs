use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, Row};

#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub date: String,
    pub location: String,
    pub price: f64,
    pub stock: i64,
    pub image_url: Option<String>,
    pub owner_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<&Row> for Event {
    type Error = DbError;

    fn try_from(row: &Row) -> Result<Self, DbError> {
        Ok(Event {
            id: row.get_i64("id")?,
            name: row.get_str("name")?,
            description: row.get_opt_str("description")?,
            date: row.get_str("date")?,
            location: row.get_str("location")?,
            price: row.get_f64("price")?,
            stock: row.get_i64("stock")?,
            image_url: row.get_opt_str("image_url")?,
            owner_id: row.get_opt_i64("owner_id")?,
            created_at: row.get_timestamp("created_at")?,
        })
    }
}

/// Input shape for creating or updating an event.
#[derive(Debug, Clone, Deserialize)]
pub struct EventDraft {
    pub name: String,
    pub description: Option<String>,
    pub date: String,
    pub location: String,
    pub price: f64,
    pub stock: i64,
    pub image_url: Option<String>,
}
