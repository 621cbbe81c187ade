use std::sync::Arc;

use crate::auth::SharedAuthenticator;
use crate::db::Db;
use crate::render::SharedRenderer;
use crate::repo::{EventRepo, TicketRepo};
use crate::services::{
    EventCatalog, TicketCodeGenerator, TicketIssuance, TicketReporting, TicketValidation,
};

/// Shared application state: services wired once at startup around a single
/// injected persistence handle. No process-wide singletons anywhere else.
#[derive(Clone)]
pub struct AppState {
    pub catalog: EventCatalog,
    pub issuance: TicketIssuance,
    pub validation: TicketValidation,
    pub reporting: TicketReporting,
    pub authenticator: SharedAuthenticator,
    pub renderer: SharedRenderer,
}

impl AppState {
    pub fn new(
        db: Db,
        default_organizer_id: i64,
        codes: Arc<dyn TicketCodeGenerator>,
        authenticator: SharedAuthenticator,
        renderer: SharedRenderer,
    ) -> Self {
        let events = EventRepo::new(db.clone());
        let tickets = TicketRepo::new(db);

        Self {
            catalog: EventCatalog::new(events.clone(), tickets.clone(), default_organizer_id),
            issuance: TicketIssuance::new(events, tickets.clone(), codes),
            validation: TicketValidation::new(tickets.clone()),
            reporting: TicketReporting::new(tickets),
            authenticator,
            renderer,
        }
    }
}
