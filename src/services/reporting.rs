use crate::models::{ScannedTicket, TicketStats, TicketWithEvent};
use crate::repo::TicketRepo;
use crate::utils::error::AppError;

/// Read-only ticket listings and aggregates for the buyer and admin
/// surfaces. Pure reads: repeatable with identical results absent
/// intervening mutation.
#[derive(Clone)]
pub struct TicketReporting {
    tickets: TicketRepo,
}

impl TicketReporting {
    pub fn new(tickets: TicketRepo) -> Self {
        Self { tickets }
    }

    pub async fn my_tickets(&self, user_id: i64) -> Result<Vec<TicketWithEvent>, AppError> {
        Ok(self.tickets.list_for_user(user_id).await?)
    }

    pub async fn all_tickets(&self) -> Result<Vec<ScannedTicket>, AppError> {
        Ok(self.tickets.list_all().await?)
    }

    pub async fn stats(&self) -> Result<TicketStats, AppError> {
        Ok(self.tickets.stats().await?)
    }
}
