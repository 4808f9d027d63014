use std::collections::HashMap;

use base64::Engine;
use chrono::{DateTime, Utc};
use sha1::{Digest, Sha1};

use crate::models::{
    Booking, Event, EventGroup, FormattedTicket, GroupedTickets, RawTicket, TicketStatus,
};

const MILLIS_PER_DAY: i64 = 86_400_000;
const FALLBACK_DIGEST_LEN: usize = 12;

/// Event id to image URL, as published by the event catalog.
pub type ImageLookup = HashMap<String, Option<String>>;

struct BookingContext<'a> {
    booking: &'a Booking,
    event: &'a Event,
    booking_ref: &'a str,
    image: &'a str,
    starts_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
}

/// Splits bookings into per-event, per-booking groups and partitions them into
/// active and expired lists.
///
/// Bookings without an event are dropped. Groups keep first-seen input order and
/// tickets keep their order within a group. A group is active when at least one
/// of its tickets is active; empty groups are always expired.
pub fn group_bookings(
    bookings: &[Booking],
    images: &ImageLookup,
    now: DateTime<Utc>,
    default_image: &str,
) -> GroupedTickets {
    let mut groups: Vec<EventGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for booking in bookings {
        let Some(event) = booking.event.as_ref() else {
            tracing::debug!(booking_ref = ?booking.booking_ref, "skipping booking without event");
            continue;
        };

        let booking_ref = match booking.reference() {
            Some(r) => r.to_string(),
            None => {
                let r = fallback_booking_ref(booking, event);
                tracing::debug!(event_id = %event.id, booking_ref = %r, "synthesized booking ref");
                r
            }
        };
        let image = resolve_image(images, &event.id, default_image);

        let ctx = BookingContext {
            booking,
            event,
            booking_ref: &booking_ref,
            image: &image,
            starts_at: event.starts_at(),
            now,
        };
        let tickets: Vec<FormattedTicket> =
            booking.tickets.iter().map(|t| format_ticket(t, &ctx)).collect();

        let key = format!("{}-{}", event.id, booking_ref);
        if let Some(&i) = index.get(&key) {
            groups[i].tickets.extend(tickets);
            continue;
        }

        index.insert(key.clone(), groups.len());
        groups.push(EventGroup {
            key,
            event_id: event.id.clone(),
            event_title: event.title.clone(),
            event_date: event.date.clone(),
            event_time: event.time.clone(),
            location: event.location.clone(),
            image,
            booking_ref,
            ticket_type: booking.ticket_type.clone(),
            total_tickets: booking.total_tickets,
            total_price: booking.total_price,
            payment_status: booking.payment_status.for_ticket(),
            status: TicketStatus::Expired,
            tickets,
        });
    }

    let mut grouped = GroupedTickets::default();
    for mut group in groups {
        group.status = group_status(&group.tickets);
        if group.status == TicketStatus::Active {
            grouped.active.push(group);
        } else {
            grouped.expired.push(group);
        }
    }

    tracing::debug!(
        active = grouped.active.len(),
        expired = grouped.expired.len(),
        "grouped bookings"
    );
    grouped
}

fn format_ticket(ticket: &RawTicket, ctx: &BookingContext<'_>) -> FormattedTicket {
    let id = ticket
        .id
        .clone()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| format!("{}-{}", ctx.booking_ref, ticket.ticket_number));

    FormattedTicket {
        id,
        event_id: ctx.event.id.clone(),
        title: ctx.event.title.clone(),
        date: ctx.event.date.clone(),
        time: ctx.event.time.clone(),
        location: ctx.event.location.clone(),
        starts_at: ctx.starts_at,
        ticket_type: ctx.booking.ticket_type.clone(),
        price: ticket.price,
        status: ticket_status(ticket.used, ctx.starts_at, ctx.now),
        days_left: days_left(ctx.starts_at, ctx.now),
        payment_status: ctx.booking.payment_status.for_ticket(),
        image: ctx.image.to_string(),
        booking_ref: ctx.booking_ref.to_string(),
        ticket_ref: ticket.ticket_ref.clone(),
        ticket_number: ticket.ticket_number,
        qr_code: ticket.encrypted_data.clone(),
    }
}

/// `used` wins over the date. An unknown event instant never counts as active.
pub fn ticket_status(
    used: bool,
    starts_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> TicketStatus {
    if used {
        return TicketStatus::Used;
    }
    match starts_at {
        Some(at) if at >= now => TicketStatus::Active,
        _ => TicketStatus::Expired,
    }
}

/// Whole days until the event, rounded up, never negative.
pub fn days_left(starts_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    let Some(at) = starts_at else {
        return 0;
    };
    let ms = (at - now).num_milliseconds();
    if ms <= 0 {
        0
    } else {
        (ms + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
    }
}

fn group_status(tickets: &[FormattedTicket]) -> TicketStatus {
    if tickets.iter().any(|t| t.status == TicketStatus::Active) {
        TicketStatus::Active
    } else if !tickets.is_empty() && tickets.iter().all(|t| t.status == TicketStatus::Used) {
        TicketStatus::Used
    } else {
        TicketStatus::Expired
    }
}

fn resolve_image(images: &ImageLookup, event_id: &str, default_image: &str) -> String {
    images
        .get(event_id)
        .and_then(|image| image.as_deref())
        .filter(|image| !image.is_empty())
        .unwrap_or(default_image)
        .to_string()
}

/// Derived only from the booking's own fields so that repeated fetches of the
/// same data land in the same group.
fn fallback_booking_ref(booking: &Booking, event: &Event) -> String {
    let mut hasher = Sha1::new();
    hasher.update(event.id.as_bytes());
    hasher.update(b"\0");
    hasher.update(booking.created_at.as_deref().unwrap_or_default().as_bytes());
    for ticket in &booking.tickets {
        hasher.update(b"\0");
        hasher.update(ticket.ticket_number.to_string().as_bytes());
        hasher.update(b":");
        hasher.update(ticket.ticket_ref.as_bytes());
    }
    let digest = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(hasher.finalize());
    format!("fallback-{}-{}", event.id, &digest[..FALLBACK_DIGEST_LEN])
}
