use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::sse::{Event, Sse};
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::errors::AppError;
use crate::models::{ScanEvent, ScanOutcome, ScanState};
use crate::services::scanner::{ScanRejection, ScanSession};
use crate::state::AppState;

use super::bearer_token;

/// Marks the caller's session as validating until dropped. If the request
/// future is dropped mid-flight the session is moved to an error result
/// instead of staying stuck in `Validating`.
struct InFlight<'a> {
    state: &'a AppState,
    token: &'a str,
    armed: bool,
}

impl<'a> InFlight<'a> {
    fn start(state: &'a AppState, token: &'a str, code: &str) -> Result<Self, ScanRejection> {
        state.with_scanner(token, |s| s.begin(code))?;
        Ok(Self {
            state,
            token,
            armed: true,
        })
    }

    fn finish(mut self, outcome: ScanOutcome) -> Result<(), ScanRejection> {
        self.armed = false;
        self.state.with_scanner(self.token, |s| s.complete(outcome))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!("scan validation abandoned");
            let _ = self.state.with_scanner(self.token, |s| {
                s.complete(ScanOutcome::Error {
                    message: "validation abandoned".to_string(),
                })
            });
        }
    }
}

#[derive(Deserialize)]
pub struct ScanRequest {
    pub code: String,
}

#[derive(Serialize)]
pub struct ScanResponse {
    pub outcome: ScanOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<serde_json::Value>,
}

// POST /api/scan
pub async fn submit_scan(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<ScanRequest>,
) -> Result<Json<ScanResponse>, AppError> {
    let token = bearer_token(&headers)?;
    let code = req.code.trim();

    let in_flight = InFlight::start(&state, token, code)?;
    tracing::info!(code_len = code.len(), "validating scanned ticket");

    let result = state.backend.scan_ticket(token, code).await;

    let outcome = match &result {
        Ok(verdict) if verdict.message.is_empty() => ScanOutcome::Success {
            message: "Ticket validated".to_string(),
        },
        Ok(verdict) => ScanOutcome::Success {
            message: verdict.message.clone(),
        },
        Err(AppError::Rejected(message)) => ScanOutcome::Error {
            message: message.clone(),
        },
        Err(e) => ScanOutcome::Error {
            message: e.to_string(),
        },
    };
    in_flight.finish(outcome.clone())?;

    tracing::info!(success = outcome.is_success(), "scan completed");
    // No subscribers is fine
    let _ = state.scan_tx.send(ScanEvent::new(outcome.clone()));

    let verdict = result?;
    Ok(Json(ScanResponse {
        outcome,
        ticket: verdict.ticket,
    }))
}

// GET /api/scan/state
pub async fn get_state(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ScanState>, AppError> {
    let token = bearer_token(&headers)?;
    Ok(Json(state.scan_state(token)))
}

// POST /api/scan/activate
pub async fn activate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ScanState>, AppError> {
    transition(&state, &headers, |s| s.activate())
}

// POST /api/scan/dismiss
pub async fn dismiss(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ScanState>, AppError> {
    transition(&state, &headers, |s| s.dismiss())
}

// POST /api/scan/deactivate
pub async fn deactivate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ScanState>, AppError> {
    transition(&state, &headers, |s| s.deactivate())
}

fn transition(
    state: &AppState,
    headers: &HeaderMap,
    f: impl FnOnce(&mut ScanSession) -> Result<(), ScanRejection>,
) -> Result<Json<ScanState>, AppError> {
    let token = bearer_token(headers)?;
    let next = state.with_scanner(token, |session| {
        f(session)?;
        Ok::<_, ScanRejection>(session.state().clone())
    })?;
    tracing::debug!(state = next.as_str(), "scanner transition");
    Ok(Json(next))
}

// GET /api/scan/events — SSE stream
#[derive(Deserialize)]
pub struct SseQuery {
    pub token: Option<String>,
}

pub async fn events_stream(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SseQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, AppError> {
    // Auth via query param (EventSource can't set headers)
    let token = query.token.as_deref().unwrap_or("");
    if state.config.dashboard_token.is_empty() || token != state.config.dashboard_token {
        return Err(AppError::Unauthorized);
    }

    let rx = state.scan_tx.subscribe();

    let live_stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => {
            let data = serde_json::to_string(&event).unwrap_or_default();
            Some(Ok(Event::default().data(data).event("scan_event")))
        }
        Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(_)) => None,
    });

    let keepalive_stream = tokio_stream::StreamExt::map(
        tokio_stream::wrappers::IntervalStream::new(tokio::time::interval(Duration::from_secs(30))),
        |_| Ok(Event::default().comment("keepalive")),
    );

    Ok(Sse::new(StreamExt::merge(live_stream, keepalive_stream)))
}
