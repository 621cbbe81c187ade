pub mod events;
pub mod tickets;

pub use events::EventRepo;
pub use tickets::TicketRepo;
