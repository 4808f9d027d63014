use serde::{Deserialize, Serialize};

use super::event::Event;
use super::ticket::{RawTicket, TicketPaymentStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(default)]
    pub booking_ref: Option<String>,
    #[serde(default)]
    pub event: Option<Event>,
    #[serde(default)]
    pub ticket_type: String,
    pub total_tickets: u32,
    pub total_price: f64,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub tickets: Vec<RawTicket>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Booking {
    /// The upstream reference, if present and non-blank.
    pub fn reference(&self) -> Option<&str> {
        self.booking_ref
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }
}

/// Upstream payment state. The ticket-facing aliases are accepted on input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    #[serde(alias = "approved", alias = "confirmed")]
    Completed,
    #[serde(alias = "rejected")]
    Failed,
}

impl PaymentStatus {
    pub fn for_ticket(self) -> TicketPaymentStatus {
        match self {
            PaymentStatus::Pending => TicketPaymentStatus::Pending,
            PaymentStatus::Completed => TicketPaymentStatus::Confirmed,
            PaymentStatus::Failed => TicketPaymentStatus::Failed,
        }
    }
}
