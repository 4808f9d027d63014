use chrono::{DateTime, Duration, Utc};

use crate::errors::AppError;
use crate::models::FormattedTicket;

const EVENT_LENGTH_HOURS: i64 = 2;

/// Renders a ticket's event as a single-event iCalendar document.
pub fn generate_ics(ticket: &FormattedTicket, now: DateTime<Utc>) -> Result<String, AppError> {
    let starts_at = ticket
        .starts_at
        .ok_or_else(|| AppError::NotFound(format!("event date for ticket {}", ticket.id)))?;

    let dtstamp = now.format("%Y%m%dT%H%M%SZ").to_string();
    let dtstart = starts_at.format("%Y%m%dT%H%M%SZ").to_string();
    let dtend = (starts_at + Duration::hours(EVENT_LENGTH_HOURS))
        .format("%Y%m%dT%H%M%SZ")
        .to_string();
    let uid = format!("{}@ticketwallet", ticket.id);

    let summary = escape_text(&ticket.title);
    let location = escape_text(ticket.location.as_deref().unwrap_or(""));
    let description = escape_text(&format!(
        "{} ticket #{} (booking {})",
        ticket.ticket_type, ticket.ticket_number, ticket.booking_ref
    ));

    Ok(format!(
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//TicketWallet//Tickets//EN\r\n\
         BEGIN:VEVENT\r\n\
         UID:{uid}\r\n\
         DTSTAMP:{dtstamp}\r\n\
         DTSTART:{dtstart}\r\n\
         DTEND:{dtend}\r\n\
         SUMMARY:{summary}\r\n\
         LOCATION:{location}\r\n\
         DESCRIPTION:{description}\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR\r\n"
    ))
}

fn escape_text(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace("\r\n", "\\n")
        .replace(['\r', '\n'], "\\n")
}
