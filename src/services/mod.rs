pub mod codes;
pub mod events;
pub mod issuance;
pub mod reporting;
pub mod validation;

pub use codes::{SystemCodeGenerator, TicketCodeGenerator};
pub use events::EventCatalog;
pub use issuance::TicketIssuance;
pub use reporting::TicketReporting;
pub use validation::{Scan, ScanReason, TicketValidation};
