use serde::Serialize;

use crate::models::{ScannedTicket, TicketStatus};
use crate::repo::TicketRepo;
use crate::utils::error::AppError;

/// Why a scan did not admit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanReason {
    NotFound,
    AlreadyUsed,
}

/// Outcome of scanning a code at the gate. An invalid scan is an expected
/// result, not an error.
#[derive(Debug, Clone, Serialize)]
pub struct Scan {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ScanReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<ScannedTicket>,
}

impl Scan {
    fn not_found() -> Self {
        Scan {
            valid: false,
            reason: Some(ScanReason::NotFound),
            ticket: None,
        }
    }

    fn already_used(ticket: ScannedTicket) -> Self {
        Scan {
            valid: false,
            reason: Some(ScanReason::AlreadyUsed),
            ticket: Some(ticket),
        }
    }

    fn admitted(ticket: ScannedTicket) -> Self {
        Scan {
            valid: true,
            reason: None,
            ticket: Some(ticket),
        }
    }
}

/// Single-use state machine: unused tickets transition to used exactly once;
/// every later scan of the same code reports the original validation.
#[derive(Clone)]
pub struct TicketValidation {
    tickets: TicketRepo,
}

impl TicketValidation {
    pub fn new(tickets: TicketRepo) -> Self {
        Self { tickets }
    }

    pub async fn validate(&self, code: &str) -> Result<Scan, AppError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AppError::Validation("Code is required".to_string()));
        }

        let Some(ticket) = self.tickets.find_scanned(code).await? else {
            return Ok(Scan::not_found());
        };

        if ticket.status == TicketStatus::Used {
            return Ok(Scan::already_used(ticket));
        }

        // Guarded transition: only takes effect while the ticket is still
        // unused, so two concurrent scans cannot both admit.
        let affected = self.tickets.mark_used(code).await?;

        // Re-read for the authoritative snapshot; when we lost the race this
        // carries the winner's used_at.
        match self.tickets.find_scanned(code).await? {
            None => Ok(Scan::not_found()),
            Some(updated) if affected == 0 => Ok(Scan::already_used(updated)),
            Some(updated) => Ok(Scan::admitted(updated)),
        }
    }
}
