pub mod calendar;
pub mod health;
pub mod scan;
pub mod tickets;

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::Router;

use crate::errors::AppError;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/wallet/tickets", get(tickets::get_wallet))
        .route("/api/wallet/tickets/:id", get(tickets::get_ticket))
        .route("/calendar/:ticket_id", get(calendar::download_ics))
        .route("/api/scan", post(scan::submit_scan))
        .route("/api/scan/state", get(scan::get_state))
        .route("/api/scan/activate", post(scan::activate))
        .route("/api/scan/dismiss", post(scan::dismiss))
        .route("/api/scan/deactivate", post(scan::deactivate))
        .route("/api/scan/events", get(scan::events_stream))
        .with_state(state)
}

/// The caller's backend token. Missing tokens short-circuit before any
/// backend call; validity is the backend's decision.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthorized)
}
