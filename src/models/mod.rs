pub mod event;
pub mod ticket;

pub use event::{Event, EventDraft};
pub use ticket::{ScannedTicket, Ticket, TicketStats, TicketStatus, TicketWithEvent};
