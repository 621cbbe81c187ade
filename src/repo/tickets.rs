use crate::db::{Db, DbError};
use crate::models::{ScannedTicket, Ticket, TicketStats, TicketWithEvent};
use crate::params;

/// Columns shared by the joined ticket queries.
const SCAN_COLUMNS: &str = "t.id, t.code, t.quantity, t.total_price, t.status, \
     t.purchase_date, t.used_at, \
     e.name AS event_name, e.date AS event_date, e.location AS event_location";

/// Aggregate casts keep the column types identical across backends (Postgres
/// SUM over INTEGER yields NUMERIC, SQLite yields INTEGER).
const STATS_SQL: &str = "SELECT COUNT(*) AS total_tickets, \
     CAST(COALESCE(SUM(quantity), 0) AS BIGINT) AS total_quantity, \
     CAST(COALESCE(SUM(total_price), 0) AS DOUBLE PRECISION) AS total_revenue, \
     CAST(COALESCE(SUM(CASE WHEN status = 'used' THEN 1 ELSE 0 END), 0) AS BIGINT) AS used_tickets, \
     CAST(COALESCE(SUM(CASE WHEN status = 'unused' THEN 1 ELSE 0 END), 0) AS BIGINT) AS unused_tickets \
     FROM tickets";

/// Query surface for the tickets table.
#[derive(Clone)]
pub struct TicketRepo {
    db: Db,
}

impl TicketRepo {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Insert a fresh ticket; status and purchase time come from column
    /// defaults. A duplicate code surfaces as a unique violation for the
    /// issuance service to retry.
    pub async fn insert(
        &self,
        user_id: i64,
        event_id: i64,
        code: &str,
        quantity: i64,
        total_price: f64,
    ) -> Result<i64, DbError> {
        self.db
            .insert(
                "INSERT INTO tickets (user_id, event_id, code, quantity, total_price) \
                 VALUES (?, ?, ?, ?, ?)",
                &params![user_id, event_id, code, quantity, total_price],
            )
            .await
    }

    pub async fn find(&self, id: i64) -> Result<Option<Ticket>, DbError> {
        let row = self
            .db
            .fetch_one("SELECT * FROM tickets WHERE id = ?", &params![id])
            .await?;
        row.as_ref().map(Ticket::try_from).transpose()
    }

    /// Ticket by code, joined with event and buyer for gate display.
    pub async fn find_scanned(&self, code: &str) -> Result<Option<ScannedTicket>, DbError> {
        let sql = format!(
            "SELECT {SCAN_COLUMNS}, u.username, u.email \
             FROM tickets t \
             JOIN events e ON t.event_id = e.id \
             JOIN users u ON t.user_id = u.id \
             WHERE t.code = ?"
        );
        let row = self.db.fetch_one(&sql, &params![code]).await?;
        row.as_ref().map(ScannedTicket::try_from).transpose()
    }

    /// Conditional single-use transition. Affects zero rows when the ticket
    /// was already validated, including by a concurrent scan.
    pub async fn mark_used(&self, code: &str) -> Result<u64, DbError> {
        self.db
            .execute(
                "UPDATE tickets SET status = 'used', used_at = CURRENT_TIMESTAMP \
                 WHERE code = ? AND status = 'unused'",
                &params![code],
            )
            .await
    }

    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<TicketWithEvent>, DbError> {
        let sql = format!(
            "SELECT {SCAN_COLUMNS} \
             FROM tickets t \
             JOIN events e ON t.event_id = e.id \
             WHERE t.user_id = ? \
             ORDER BY t.purchase_date DESC, t.id DESC"
        );
        let rows = self.db.fetch_all(&sql, &params![user_id]).await?;
        rows.iter().map(TicketWithEvent::try_from).collect()
    }

    pub async fn list_all(&self) -> Result<Vec<ScannedTicket>, DbError> {
        let sql = format!(
            "SELECT {SCAN_COLUMNS}, u.username, u.email \
             FROM tickets t \
             JOIN events e ON t.event_id = e.id \
             JOIN users u ON t.user_id = u.id \
             ORDER BY t.purchase_date DESC, t.id DESC"
        );
        let rows = self.db.fetch_all(&sql, &[]).await?;
        rows.iter().map(ScannedTicket::try_from).collect()
    }

    /// Tickets cannot outlive their event; called before the event row goes.
    pub async fn delete_for_event(&self, event_id: i64) -> Result<u64, DbError> {
        self.db
            .execute("DELETE FROM tickets WHERE event_id = ?", &params![event_id])
            .await
    }

    pub async fn stats(&self) -> Result<TicketStats, DbError> {
        let row = self
            .db
            .fetch_one(STATS_SQL, &[])
            .await?
            .ok_or_else(|| DbError::Column("total_tickets".to_string()))?;
        TicketStats::try_from(&row)
    }
}
