use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tokio::sync::Notify;
use tower::ServiceExt;

use ticketwallet::config::AppConfig;
use ticketwallet::errors::AppError;
use ticketwallet::handlers;
use ticketwallet::models::{Booking, Event, ScanOutcome, ScanVerdict};
use ticketwallet::services::backend::TicketBackend;
use ticketwallet::state::AppState;

// ── Mock Backend ──

#[derive(Default)]
struct MockBackend {
    calls: AtomicUsize,
    scans: AtomicUsize,
    expired_token: bool,
    gate: Option<Arc<Notify>>,
}

const BOOKINGS: &str = r#"[
    {"bookingRef":"B1","event":{"_id":"E1","title":"Jazz Night","date":"2099-01-01T20:00:00Z","location":"Blue Note"},
     "ticketType":"VIP","totalTickets":2,"totalPrice":80,"paymentStatus":"completed",
     "tickets":[
        {"_id":"t-1","ticketRef":"R1","ticketNumber":1,"price":40,"used":false,"encryptedData":"enc-1"},
        {"ticketRef":"R2","ticketNumber":2,"price":40,"used":true,"encryptedData":"enc-2"}
     ]},
    {"bookingRef":"B2","event":{"_id":"E2","title":"Old Expo","date":"2020-01-01"},
     "ticketType":"GA","totalTickets":1,"totalPrice":10,"paymentStatus":"pending",
     "tickets":[{"_id":"t-3","ticketRef":"R3","ticketNumber":1,"price":10,"encryptedData":"enc-3"}]},
    {"bookingRef":"B3","event":null,"ticketType":"GA","totalTickets":1,"totalPrice":10,
     "paymentStatus":"failed","tickets":[]}
]"#;

#[async_trait]
impl TicketBackend for MockBackend {
    async fn my_bookings(&self, _token: &str) -> Result<Vec<Booking>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.expired_token {
            return Err(AppError::Unauthorized);
        }
        Ok(serde_json::from_str(BOOKINGS).unwrap())
    }

    async fn events(&self) -> Result<Vec<Event>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![Event {
            id: "E1".to_string(),
            title: "Jazz Night".to_string(),
            date: None,
            time: None,
            location: None,
            image: Some("https://img.test/jazz.png".to_string()),
        }])
    }

    async fn scan_ticket(&self, _token: &str, code: &str) -> Result<ScanVerdict, AppError> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match code {
            "valid-code" => Ok(ScanVerdict {
                message: "Ticket validated successfully".to_string(),
                ticket: Some(serde_json::json!({"ticketRef": "R1"})),
            }),
            _ => Err(AppError::Rejected("Invalid or already used ticket".to_string())),
        }
    }
}

// ── Helpers ──

fn test_config() -> AppConfig {
    AppConfig {
        port: 3000,
        api_base_url: "http://backend.test".to_string(),
        default_event_image: "https://img.test/default.png".to_string(),
        dashboard_token: "dash-token".to_string(),
    }
}

fn test_state(backend: MockBackend) -> (Arc<AppState>, Arc<MockBackend>) {
    let backend = Arc::new(backend);
    let state = Arc::new(AppState::new(test_config(), Box::new(SharedBackend(backend.clone()))));
    (state, backend)
}

struct SharedBackend(Arc<MockBackend>);

#[async_trait]
impl TicketBackend for SharedBackend {
    async fn my_bookings(&self, token: &str) -> Result<Vec<Booking>, AppError> {
        self.0.my_bookings(token).await
    }

    async fn events(&self) -> Result<Vec<Event>, AppError> {
        self.0.events().await
    }

    async fn scan_ticket(&self, token: &str, code: &str) -> Result<ScanVerdict, AppError> {
        self.0.scan_ticket(token, code).await
    }
}

fn test_app(state: Arc<AppState>) -> Router {
    handlers::router(state)
}

const USER_TOKEN: &str = "user-token";

fn get(uri: &str) -> Request<Body> {
    get_as(USER_TOKEN, uri)
}

fn post(uri: &str, body: &str) -> Request<Body> {
    post_as(USER_TOKEN, uri, body)
}

fn get_as(token: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn post_as(token: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(res: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

// ── Wallet Tests ──

#[tokio::test]
async fn test_health() {
    let (state, _) = test_state(MockBackend::default());
    let res = test_app(state)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_wallet_requires_token_before_backend_call() {
    let (state, backend) = test_state(MockBackend::default());
    let res = test_app(state)
        .oneshot(
            Request::builder()
                .uri("/api/wallet/tickets")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_wallet_expired_token_passes_through() {
    let (state, _) = test_state(MockBackend {
        expired_token: true,
        ..Default::default()
    });
    let res = test_app(state).oneshot(get("/api/wallet/tickets")).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wallet_groups_and_partitions() {
    let (state, _) = test_state(MockBackend::default());
    let res = test_app(state).oneshot(get("/api/wallet/tickets")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let json = json_body(res).await;
    let active = json["active"].as_array().unwrap();
    let expired = json["expired"].as_array().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(expired.len(), 1);

    let group = &active[0];
    assert_eq!(group["key"], "E1-B1");
    assert_eq!(group["status"], "active");
    assert_eq!(group["totalTickets"], 2);
    assert_eq!(group["paymentStatus"], "confirmed");
    assert_eq!(group["image"], "https://img.test/jazz.png");

    let tickets = group["tickets"].as_array().unwrap();
    assert_eq!(tickets[0]["id"], "t-1");
    assert_eq!(tickets[0]["status"], "active");
    assert_eq!(tickets[0]["qrCode"], "enc-1");
    assert!(tickets[0]["daysLeft"].as_i64().unwrap() > 0);
    assert_eq!(tickets[1]["id"], "B1-2");
    assert_eq!(tickets[1]["status"], "used");

    assert_eq!(expired[0]["key"], "E2-B2");
    assert_eq!(expired[0]["image"], "https://img.test/default.png");
    assert_eq!(expired[0]["paymentStatus"], "pending");
    assert_eq!(expired[0]["tickets"][0]["daysLeft"], 0);
}

#[tokio::test]
async fn test_get_ticket() {
    let (state, _) = test_state(MockBackend::default());
    let res = test_app(state.clone())
        .oneshot(get("/api/wallet/tickets/t-3"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = json_body(res).await;
    assert_eq!(json["title"], "Old Expo");
    assert_eq!(json["status"], "expired");

    let res = test_app(state)
        .oneshot(get("/api/wallet/tickets/nope"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_calendar_download() {
    let (state, _) = test_state(MockBackend::default());
    let res = test_app(state)
        .oneshot(get("/calendar/t-1.ics"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()["content-type"],
        "text/calendar; charset=utf-8"
    );
    assert!(res.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .contains("ticket-t-1.ics"));

    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let ics = String::from_utf8(body.to_vec()).unwrap();
    assert!(ics.contains("SUMMARY:Jazz Night"));
    assert!(ics.contains("DTSTART:20990101T200000Z"));
    assert!(ics.contains("LOCATION:Blue Note"));
}

// ── Scan Tests ──

#[tokio::test]
async fn test_scan_cycle() {
    let (state, _) = test_state(MockBackend::default());

    let res = test_app(state.clone())
        .oneshot(post("/api/scan/activate", ""))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await["state"], "scanning");

    let res = test_app(state.clone())
        .oneshot(post("/api/scan", r#"{"code":"valid-code"}"#))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = json_body(res).await;
    assert_eq!(json["outcome"]["result"], "success");
    assert_eq!(json["outcome"]["message"], "Ticket validated successfully");
    assert_eq!(json["ticket"]["ticketRef"], "R1");

    let res = test_app(state.clone())
        .oneshot(get("/api/scan/state"))
        .await
        .unwrap();
    let json = json_body(res).await;
    assert_eq!(json["state"], "result");
    assert_eq!(json["outcome"]["result"], "success");

    let res = test_app(state.clone())
        .oneshot(post("/api/scan/dismiss", ""))
        .await
        .unwrap();
    assert_eq!(json_body(res).await["state"], "idle");
}

#[tokio::test]
async fn test_scan_rejected_by_backend() {
    let (state, _) = test_state(MockBackend::default());
    test_app(state.clone())
        .oneshot(post("/api/scan/activate", ""))
        .await
        .unwrap();

    let res = test_app(state.clone())
        .oneshot(post("/api/scan", r#"{"code":"forged"}"#))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = json_body(res).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("Invalid or already used ticket"));

    let res = test_app(state).oneshot(get("/api/scan/state")).await.unwrap();
    let json = json_body(res).await;
    assert_eq!(json["state"], "result");
    assert_eq!(json["outcome"]["result"], "error");
}

#[tokio::test]
async fn test_scan_requires_active_scanner() {
    let (state, backend) = test_state(MockBackend::default());
    let res = test_app(state)
        .oneshot(post("/api/scan", r#"{"code":"valid-code"}"#))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(backend.scans.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_empty_code_is_bad_request() {
    let (state, _) = test_state(MockBackend::default());
    test_app(state.clone())
        .oneshot(post("/api/scan/activate", ""))
        .await
        .unwrap();
    let res = test_app(state)
        .oneshot(post("/api/scan", r#"{"code":"  "}"#))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_scan_ignored_while_validating() {
    let gate = Arc::new(Notify::new());
    let (state, backend) = test_state(MockBackend {
        gate: Some(gate.clone()),
        ..Default::default()
    });
    test_app(state.clone())
        .oneshot(post("/api/scan/activate", ""))
        .await
        .unwrap();

    let first = tokio::spawn(
        test_app(state.clone()).oneshot(post("/api/scan", r#"{"code":"valid-code"}"#)),
    );

    while !state.with_scanner(USER_TOKEN, |s| s.is_validating()) {
        tokio::task::yield_now().await;
    }

    let res = test_app(state.clone())
        .oneshot(post("/api/scan", r#"{"code":"valid-code"}"#))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    gate.notify_one();
    let res = first.await.unwrap().unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(backend.scans.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_scan_requires_token() {
    let (state, _) = test_state(MockBackend::default());
    let res = test_app(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/scan/activate")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_scan_events_require_dashboard_token() {
    let (state, _) = test_state(MockBackend::default());
    let res = test_app(state.clone())
        .oneshot(get("/api/scan/events?token=wrong"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = test_app(state)
        .oneshot(get("/api/scan/events?token=dash-token"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "text/event-stream");
}

#[tokio::test]
async fn test_scan_sessions_are_per_token() {
    let (state, backend) = test_state(MockBackend::default());

    let res = test_app(state.clone())
        .oneshot(post_as("organizer-a", "/api/scan/activate", ""))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Another caller cannot scan through A's open camera
    let res = test_app(state.clone())
        .oneshot(post_as("organizer-b", "/api/scan", r#"{"code":"valid-code"}"#))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(backend.scans.load(Ordering::SeqCst), 0);

    let res = test_app(state.clone())
        .oneshot(get_as("organizer-b", "/api/scan/state"))
        .await
        .unwrap();
    assert_eq!(json_body(res).await["state"], "idle");

    // Nor close it
    let res = test_app(state.clone())
        .oneshot(post_as("organizer-b", "/api/scan/deactivate", ""))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = test_app(state.clone())
        .oneshot(get_as("organizer-a", "/api/scan/state"))
        .await
        .unwrap();
    assert_eq!(json_body(res).await["state"], "scanning");

    let res = test_app(state)
        .oneshot(post_as("organizer-a", "/api/scan", r#"{"code":"valid-code"}"#))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(backend.scans.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_completed_scan_is_broadcast_without_code() {
    let (state, _) = test_state(MockBackend::default());
    let mut rx = state.scan_tx.subscribe();

    test_app(state.clone())
        .oneshot(post("/api/scan/activate", ""))
        .await
        .unwrap();
    let res = test_app(state.clone())
        .oneshot(post("/api/scan", r#"{"code":"valid-code"}"#))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let event = rx.try_recv().unwrap();
    assert_eq!(
        event.outcome,
        ScanOutcome::Success {
            message: "Ticket validated successfully".to_string(),
        }
    );
    let payload = serde_json::to_string(&event).unwrap();
    assert!(!payload.contains("valid-code"));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_abandoned_validation_ends_in_error_result() {
    let gate = Arc::new(Notify::new());
    let (state, _) = test_state(MockBackend {
        gate: Some(gate.clone()),
        ..Default::default()
    });
    test_app(state.clone())
        .oneshot(post("/api/scan/activate", ""))
        .await
        .unwrap();

    let pending = tokio::spawn(
        test_app(state.clone()).oneshot(post("/api/scan", r#"{"code":"valid-code"}"#)),
    );
    while !state.with_scanner(USER_TOKEN, |s| s.is_validating()) {
        tokio::task::yield_now().await;
    }

    pending.abort();
    assert!(pending.await.unwrap_err().is_cancelled());

    let res = test_app(state).oneshot(get("/api/scan/state")).await.unwrap();
    let json = json_body(res).await;
    assert_eq!(json["state"], "result");
    assert_eq!(json["outcome"]["result"], "error");
    assert_eq!(json["outcome"]["message"], "validation abandoned");
}
