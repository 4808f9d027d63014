pub mod booking;
pub mod event;
pub mod group;
pub mod scan;
pub mod ticket;

pub use booking::{Booking, PaymentStatus};
pub use event::Event;
pub use group::{EventGroup, GroupedTickets};
pub use scan::{ScanEvent, ScanOutcome, ScanState, ScanVerdict};
pub use ticket::{FormattedTicket, RawTicket, TicketPaymentStatus, TicketStatus};
