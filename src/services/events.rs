use tracing::info;

use crate::auth::Claims;
use crate::models::{Event, EventDraft};
use crate::repo::{EventRepo, TicketRepo};
use crate::utils::error::AppError;

const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/400x200?text=Event";

/// Organizer-facing event lifecycle with ownership enforcement.
///
/// Ownership is immutable once set. An event with no owner is legacy data;
/// the first organizer to edit it claims it, and until then only the default
/// organizer sees it in the managed listing.
#[derive(Clone)]
pub struct EventCatalog {
    events: EventRepo,
    tickets: TicketRepo,
    default_organizer_id: i64,
}

impl EventCatalog {
    pub fn new(events: EventRepo, tickets: TicketRepo, default_organizer_id: i64) -> Self {
        Self {
            events,
            tickets,
            default_organizer_id,
        }
    }

    pub async fn list(&self) -> Result<Vec<Event>, AppError> {
        Ok(self.events.list().await?)
    }

    pub async fn find(&self, id: i64) -> Result<Event, AppError> {
        self.events
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event with id '{id}' was not found")))
    }

    pub async fn list_managed(&self, claims: &Claims) -> Result<Vec<Event>, AppError> {
        let include_unowned = claims.user_id == self.default_organizer_id;
        Ok(self
            .events
            .list_owned(claims.user_id, include_unowned)
            .await?)
    }

    pub async fn create(&self, claims: &Claims, draft: &EventDraft) -> Result<i64, AppError> {
        validate_draft(draft)?;
        let image_url = draft.image_url.as_deref().unwrap_or(PLACEHOLDER_IMAGE);
        let id = self.events.create(draft, image_url, claims.user_id).await?;
        info!(event_id = id, owner_id = claims.user_id, "Event created");
        Ok(id)
    }

    pub async fn update(&self, claims: &Claims, id: i64, draft: &EventDraft) -> Result<(), AppError> {
        validate_draft(draft)?;
        let existing = self.find(id).await?;
        check_ownership(&existing, claims, "edit")?;

        let image_url = draft
            .image_url
            .as_deref()
            .or(existing.image_url.as_deref())
            .unwrap_or(PLACEHOLDER_IMAGE);
        self.events.update(id, draft, image_url, claims.user_id).await?;
        Ok(())
    }

    /// Deletes the event and every ticket sold against it; tickets cannot
    /// outlive their event, so their codes stop scanning immediately.
    pub async fn delete(&self, claims: &Claims, id: i64) -> Result<(), AppError> {
        let existing = self.find(id).await?;
        check_ownership(&existing, claims, "delete")?;

        let removed = self.tickets.delete_for_event(id).await?;
        self.events.delete(id).await?;
        info!(event_id = id, tickets_removed = removed, "Event deleted");
        Ok(())
    }
}

fn check_ownership(event: &Event, claims: &Claims, action: &str) -> Result<(), AppError> {
    match event.owner_id {
        Some(owner) if owner != claims.user_id => Err(AppError::Forbidden(format!(
            "You do not have permission to {action} this event"
        ))),
        _ => Ok(()),
    }
}

fn validate_draft(draft: &EventDraft) -> Result<(), AppError> {
    if draft.name.trim().is_empty()
        || draft.date.trim().is_empty()
        || draft.location.trim().is_empty()
    {
        return Err(AppError::Validation(
            "Name, date and location are required".to_string(),
        ));
    }
    if draft.price < 0.0 {
        return Err(AppError::Validation("Price cannot be negative".to_string()));
    }
    if draft.stock < 0 {
        return Err(AppError::Validation("Stock cannot be negative".to_string()));
    }
    Ok(())
}
