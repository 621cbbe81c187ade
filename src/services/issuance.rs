use std::sync::Arc;

use chrono::Utc;
use tracing::{error, warn};

use crate::models::{Ticket, TicketStatus};
use crate::repo::{EventRepo, TicketRepo};
use crate::services::codes::TicketCodeGenerator;
use crate::utils::error::AppError;

/// Bounded retries for ticket-code collisions at insert time.
const MAX_CODE_ATTEMPTS: u32 = 3;

/// Converts finite event stock into uniquely coded tickets.
///
/// Correctness under concurrent buyers rests on the conditional stock
/// decrement: the sufficiency check and the write are one statement, so two
/// purchases racing for the last unit cannot both pass. No in-process lock
/// is involved anywhere in the flow.
#[derive(Clone)]
pub struct TicketIssuance {
    events: EventRepo,
    tickets: TicketRepo,
    codes: Arc<dyn TicketCodeGenerator>,
}

impl TicketIssuance {
    pub fn new(events: EventRepo, tickets: TicketRepo, codes: Arc<dyn TicketCodeGenerator>) -> Self {
        Self {
            events,
            tickets,
            codes,
        }
    }

    pub async fn purchase(
        &self,
        buyer_id: i64,
        event_id: i64,
        quantity: i64,
    ) -> Result<Ticket, AppError> {
        if quantity < 1 {
            return Err(AppError::Validation(
                "Quantity must be at least 1".to_string(),
            ));
        }

        let event = self
            .events
            .find(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event with id '{event_id}' was not found")))?;

        let total_price = event.price * quantity as f64;

        let affected = self.events.decrement_stock(event_id, quantity).await?;
        if affected == 0 {
            return Err(AppError::InsufficientStock);
        }

        // The stock is already taken; from here every failure path must give
        // it back before surfacing.
        match self.insert_with_fresh_code(buyer_id, event_id, quantity, total_price).await {
            Ok((ticket_id, code)) => {
                Ok(self
                    .issued_ticket(ticket_id, buyer_id, event_id, code, quantity, total_price)
                    .await)
            }
            Err(err) => {
                if let Err(restore_err) = self.events.restore_stock(event_id, quantity).await {
                    error!(
                        event_id,
                        quantity,
                        error = ?restore_err,
                        "Failed to restore stock after aborted issuance"
                    );
                }
                Err(err)
            }
        }
    }

    /// Authoritative ticket snapshot after a committed insert. The purchase
    /// is already complete at this point, so a failing read-back must not
    /// surface as an error: the buyer would retry and pay twice. Fall back to
    /// the ticket as inserted instead.
    async fn issued_ticket(
        &self,
        ticket_id: i64,
        buyer_id: i64,
        event_id: i64,
        code: String,
        quantity: i64,
        total_price: f64,
    ) -> Ticket {
        match self.tickets.find(ticket_id).await {
            Ok(Some(ticket)) => ticket,
            outcome => {
                match outcome {
                    Err(e) => warn!(
                        ticket_id,
                        error = ?e,
                        "Ticket issued but read-back failed, returning local snapshot"
                    ),
                    _ => warn!(ticket_id, "Ticket issued but row not found on read-back"),
                }
                Ticket {
                    id: ticket_id,
                    user_id: buyer_id,
                    event_id,
                    code,
                    quantity,
                    total_price,
                    status: TicketStatus::Unused,
                    purchase_date: Utc::now(),
                    used_at: None,
                }
            }
        }
    }

    /// Insert the ticket row, regenerating the code on unique-constraint
    /// collisions up to the attempt bound.
    async fn insert_with_fresh_code(
        &self,
        buyer_id: i64,
        event_id: i64,
        quantity: i64,
        total_price: f64,
    ) -> Result<(i64, String), AppError> {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = self.codes.generate();
            match self
                .tickets
                .insert(buyer_id, event_id, &code, quantity, total_price)
                .await
            {
                Ok(id) => return Ok((id, code)),
                Err(e) if e.is_unique_violation() => {
                    warn!(attempt, "Ticket code collision, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(AppError::Internal(format!(
            "could not allocate a unique ticket code after {MAX_CODE_ATTEMPTS} attempts"
        )))
    }
}
