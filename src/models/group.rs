use serde::{Deserialize, Serialize};

use super::ticket::{FormattedTicket, TicketPaymentStatus, TicketStatus};

/// Tickets of a single booking for a single event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventGroup {
    pub key: String,
    pub event_id: String,
    pub event_title: String,
    pub event_date: Option<String>,
    pub event_time: Option<String>,
    pub location: Option<String>,
    pub image: String,
    pub booking_ref: String,
    pub ticket_type: String,
    pub total_tickets: u32,
    pub total_price: f64,
    pub payment_status: TicketPaymentStatus,
    pub status: TicketStatus,
    pub tickets: Vec<FormattedTicket>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupedTickets {
    pub active: Vec<EventGroup>,
    pub expired: Vec<EventGroup>,
}

impl GroupedTickets {
    pub fn groups(&self) -> impl Iterator<Item = &EventGroup> {
        self.active.iter().chain(self.expired.iter())
    }

    pub fn len(&self) -> usize {
        self.active.len() + self.expired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
