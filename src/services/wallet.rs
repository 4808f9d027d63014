use chrono::{DateTime, Utc};

use crate::errors::AppError;
use crate::models::{FormattedTicket, GroupedTickets};
use crate::services::backend::TicketBackend;
use crate::services::grouping::{group_bookings, ImageLookup};

/// Fetches the caller's bookings and the event catalog, then groups them.
pub async fn load_wallet(
    backend: &dyn TicketBackend,
    token: &str,
    now: DateTime<Utc>,
    default_image: &str,
) -> Result<GroupedTickets, AppError> {
    let bookings = backend.my_bookings(token).await?;
    let events = backend.events().await?;

    let images: ImageLookup = events.into_iter().map(|e| (e.id, e.image)).collect();

    let grouped = group_bookings(&bookings, &images, now, default_image);
    tracing::info!(
        bookings = bookings.len(),
        active = grouped.active.len(),
        expired = grouped.expired.len(),
        "loaded wallet"
    );
    Ok(grouped)
}

pub fn find_ticket<'a>(groups: &'a GroupedTickets, ticket_id: &str) -> Option<&'a FormattedTicket> {
    groups
        .groups()
        .flat_map(|g| g.tickets.iter())
        .find(|t| t.id == ticket_id)
}
