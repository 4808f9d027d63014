use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One admission unit as delivered by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTicket {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    pub ticket_ref: String,
    pub ticket_number: u32,
    pub price: f64,
    #[serde(default)]
    pub used: bool,
    /// Opaque QR credential. Never parsed.
    pub encrypted_data: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Active,
    Used,
    Expired,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TicketPaymentStatus {
    Pending,
    Confirmed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedTicket {
    pub id: String,
    pub event_id: String,
    pub title: String,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ticket_type: String,
    pub price: f64,
    pub status: TicketStatus,
    pub days_left: i64,
    pub payment_status: TicketPaymentStatus,
    pub image: String,
    pub booking_ref: String,
    pub ticket_ref: String,
    pub ticket_number: u32,
    pub qr_code: String,
}
