pub mod http;

use async_trait::async_trait;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{Booking, Event, ScanVerdict};

/// The remote event backend. Business decisions live there.
#[async_trait]
pub trait TicketBackend: Send + Sync {
    /// `GET /api/tickets/my-tickets`
    async fn my_bookings(&self, token: &str) -> Result<Vec<Booking>, AppError>;

    /// `GET /api/events`
    async fn events(&self) -> Result<Vec<Event>, AppError>;

    /// `POST /api/tickets/scan`
    async fn scan_ticket(&self, token: &str, code: &str) -> Result<ScanVerdict, AppError>;
}

/// List endpoints answer either with a bare array or with the array wrapped
/// in an object under a resource-named key.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListPayload<T> {
    Bare(Vec<T>),
    Wrapped {
        #[serde(alias = "tickets", alias = "bookings", alias = "events", alias = "data")]
        items: Vec<T>,
    },
}

impl<T> ListPayload<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            ListPayload::Bare(items) | ListPayload::Wrapped { items } => items,
        }
    }
}
