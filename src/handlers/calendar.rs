use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use chrono::Utc;

use crate::errors::AppError;
use crate::services::calendar::generate_ics;
use crate::state::AppState;

use super::tickets::lookup_ticket;

// GET /calendar/:ticket_id
pub async fn download_ics(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let ticket_id = raw_id.strip_suffix(".ics").unwrap_or(&raw_id);

    let ticket = lookup_ticket(&state, &headers, ticket_id).await?;
    let ics = generate_ics(&ticket, Utc::now())?;
    let filename = format!("ticket-{ticket_id}.ics");

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        ics,
    )
        .into_response())
}
