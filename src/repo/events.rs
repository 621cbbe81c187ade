use crate::db::{Db, DbError};
use crate::models::{Event, EventDraft};
use crate::params;

/// Query surface for the events table.
#[derive(Clone)]
pub struct EventRepo {
    db: Db,
}

impl EventRepo {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Event>, DbError> {
        let rows = self
            .db
            .fetch_all("SELECT * FROM events ORDER BY date ASC", &[])
            .await?;
        rows.iter().map(Event::try_from).collect()
    }

    pub async fn find(&self, id: i64) -> Result<Option<Event>, DbError> {
        let row = self
            .db
            .fetch_one("SELECT * FROM events WHERE id = ?", &params![id])
            .await?;
        row.as_ref().map(Event::try_from).transpose()
    }

    /// Events owned by the given organizer. The default organizer also sees
    /// unowned legacy events so they remain reachable from the admin surface.
    pub async fn list_owned(
        &self,
        owner_id: i64,
        include_unowned: bool,
    ) -> Result<Vec<Event>, DbError> {
        let rows = if include_unowned {
            self.db
                .fetch_all(
                    "SELECT * FROM events WHERE owner_id = ? OR owner_id IS NULL ORDER BY date ASC",
                    &params![owner_id],
                )
                .await?
        } else {
            self.db
                .fetch_all(
                    "SELECT * FROM events WHERE owner_id = ? ORDER BY date ASC",
                    &params![owner_id],
                )
                .await?
        };
        rows.iter().map(Event::try_from).collect()
    }

    pub async fn create(
        &self,
        draft: &EventDraft,
        image_url: &str,
        owner_id: i64,
    ) -> Result<i64, DbError> {
        self.db
            .insert(
                "INSERT INTO events (name, description, date, location, price, stock, image_url, owner_id) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                &params![
                    draft.name.as_str(),
                    draft.description.clone(),
                    draft.date.as_str(),
                    draft.location.as_str(),
                    draft.price,
                    draft.stock,
                    image_url,
                    owner_id
                ],
            )
            .await
    }

    /// Full-row update. An unset owner is claimed by the editing organizer;
    /// an owner already on the row is never overwritten.
    pub async fn update(
        &self,
        id: i64,
        draft: &EventDraft,
        image_url: &str,
        editor_id: i64,
    ) -> Result<u64, DbError> {
        self.db
            .execute(
                "UPDATE events \
                 SET name = ?, description = ?, date = ?, location = ?, price = ?, stock = ?, \
                     image_url = ?, owner_id = COALESCE(owner_id, ?) \
                 WHERE id = ?",
                &params![
                    draft.name.as_str(),
                    draft.description.clone(),
                    draft.date.as_str(),
                    draft.location.as_str(),
                    draft.price,
                    draft.stock,
                    image_url,
                    editor_id,
                    id
                ],
            )
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<u64, DbError> {
        self.db
            .execute("DELETE FROM events WHERE id = ?", &params![id])
            .await
    }

    /// Conditional stock decrement: takes effect only while enough stock
    /// remains. A zero affected-row count means the purchase lost the race
    /// or asked for more than is left.
    pub async fn decrement_stock(&self, event_id: i64, quantity: i64) -> Result<u64, DbError> {
        self.db
            .execute(
                "UPDATE events SET stock = stock - ? WHERE id = ? AND stock >= ?",
                &params![quantity, event_id, quantity],
            )
            .await
    }

    /// Compensation for a failed issuance after the decrement succeeded.
    pub async fn restore_stock(&self, event_id: i64, quantity: i64) -> Result<u64, DbError> {
        self.db
            .execute(
                "UPDATE events SET stock = stock + ? WHERE id = ?",
                &params![quantity, event_id],
            )
            .await
    }
}
