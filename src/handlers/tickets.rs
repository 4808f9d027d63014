use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;

use crate::errors::AppError;
use crate::models::{FormattedTicket, GroupedTickets};
use crate::services::wallet::{find_ticket, load_wallet};
use crate::state::AppState;

use super::bearer_token;

// GET /api/wallet/tickets
pub async fn get_wallet(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<GroupedTickets>, AppError> {
    let token = bearer_token(&headers)?;

    let wallet = load_wallet(
        state.backend.as_ref(),
        token,
        Utc::now(),
        &state.config.default_event_image,
    )
    .await?;

    Ok(Json(wallet))
}

// GET /api/wallet/tickets/:id
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<FormattedTicket>, AppError> {
    let ticket = lookup_ticket(&state, &headers, &id).await?;
    Ok(Json(ticket))
}

pub(crate) async fn lookup_ticket(
    state: &AppState,
    headers: &HeaderMap,
    ticket_id: &str,
) -> Result<FormattedTicket, AppError> {
    let token = bearer_token(headers)?;

    let wallet = load_wallet(
        state.backend.as_ref(),
        token,
        Utc::now(),
        &state.config.default_event_image,
    )
    .await?;

    find_ticket(&wallet, ticket_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("ticket {ticket_id}")))
}
