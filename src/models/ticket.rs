use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, Row};

/// Single-use admission state. Transitions only ever go unused -> used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Unused,
    Used,
}

impl TicketStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Unused => "unused",
            TicketStatus::Used => "used",
        }
    }

    fn from_column(row: &Row) -> Result<Self, DbError> {
        match row.get_str("status")?.as_str() {
            "unused" => Ok(TicketStatus::Unused),
            "used" => Ok(TicketStatus::Used),
            _ => Err(DbError::Column("status".to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Ticket {
    pub id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub code: String,
    pub quantity: i64,
    pub total_price: f64,
    pub status: TicketStatus,
    pub purchase_date: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}

impl TryFrom<&Row> for Ticket {
    type Error = DbError;

    fn try_from(row: &Row) -> Result<Self, DbError> {
        Ok(Ticket {
            id: row.get_i64("id")?,
            user_id: row.get_i64("user_id")?,
            event_id: row.get_i64("event_id")?,
            code: row.get_str("code")?,
            quantity: row.get_i64("quantity")?,
            total_price: row.get_f64("total_price")?,
            status: TicketStatus::from_column(row)?,
            purchase_date: row.get_timestamp("purchase_date")?,
            used_at: row.get_opt_timestamp("used_at")?,
        })
    }
}

/// A buyer-facing ticket row joined with its event.
#[derive(Debug, Clone, Serialize)]
pub struct TicketWithEvent {
    pub id: i64,
    pub code: String,
    pub quantity: i64,
    pub total_price: f64,
    pub status: TicketStatus,
    pub purchase_date: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub event_name: String,
    pub event_date: String,
    pub event_location: String,
}

impl TryFrom<&Row> for TicketWithEvent {
    type Error = DbError;

    fn try_from(row: &Row) -> Result<Self, DbError> {
        Ok(TicketWithEvent {
            id: row.get_i64("id")?,
            code: row.get_str("code")?,
            quantity: row.get_i64("quantity")?,
            total_price: row.get_f64("total_price")?,
            status: TicketStatus::from_column(row)?,
            purchase_date: row.get_timestamp("purchase_date")?,
            used_at: row.get_opt_timestamp("used_at")?,
            event_name: row.get_str("event_name")?,
            event_date: row.get_str("event_date")?,
            event_location: row.get_str("event_location")?,
        })
    }
}

/// A gate-side ticket row joined with its event and buyer, used for
/// validation display and the admin listing.
#[derive(Debug, Clone, Serialize)]
pub struct ScannedTicket {
    pub id: i64,
    pub code: String,
    pub quantity: i64,
    pub total_price: f64,
    pub status: TicketStatus,
    pub purchase_date: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub event_name: String,
    pub event_date: String,
    pub event_location: String,
    pub username: String,
    pub email: String,
}

impl TryFrom<&Row> for ScannedTicket {
    type Error = DbError;

    fn try_from(row: &Row) -> Result<Self, DbError> {
        Ok(ScannedTicket {
            id: row.get_i64("id")?,
            code: row.get_str("code")?,
            quantity: row.get_i64("quantity")?,
            total_price: row.get_f64("total_price")?,
            status: TicketStatus::from_column(row)?,
            purchase_date: row.get_timestamp("purchase_date")?,
            used_at: row.get_opt_timestamp("used_at")?,
            event_name: row.get_str("event_name")?,
            event_date: row.get_str("event_date")?,
            event_location: row.get_str("event_location")?,
            username: row.get_str("username")?,
            email: row.get_str("email")?,
        })
    }
}

/// Aggregate sales counters for the admin surface.
#[derive(Debug, Clone, Serialize)]
pub struct TicketStats {
    pub total_tickets: i64,
    pub total_quantity: i64,
    pub total_revenue: f64,
    pub used_tickets: i64,
    pub unused_tickets: i64,
}

impl TryFrom<&Row> for TicketStats {
    type Error = DbError;

    fn try_from(row: &Row) -> Result<Self, DbError> {
        Ok(TicketStats {
            total_tickets: row.get_i64("total_tickets")?,
            total_quantity: row.get_i64("total_quantity")?,
            total_revenue: row.get_f64("total_revenue")?,
            used_tickets: row.get_i64("used_tickets")?,
            unused_tickets: row.get_i64("unused_tickets")?,
        })
    }
}
