use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::models::{ScanEvent, ScanState};
use crate::services::backend::TicketBackend;
use crate::services::scanner::ScanSession;

pub struct AppState {
    pub config: AppConfig,
    pub backend: Box<dyn TicketBackend>,
    /// One scan session per caller token.
    pub scanners: Mutex<HashMap<String, ScanSession>>,
    pub scan_tx: broadcast::Sender<ScanEvent>,
}

impl AppState {
    pub fn new(config: AppConfig, backend: Box<dyn TicketBackend>) -> Self {
        let (scan_tx, _) = broadcast::channel(64);
        Self {
            config,
            backend,
            scanners: Mutex::new(HashMap::new()),
            scan_tx,
        }
    }

    /// Runs `f` against the caller's scan session. Sessions that end up idle
    /// are dropped, so only active scanners are kept.
    pub fn with_scanner<R>(&self, token: &str, f: impl FnOnce(&mut ScanSession) -> R) -> R {
        let mut scanners = self.scanners.lock().unwrap_or_else(PoisonError::into_inner);
        let session = scanners.entry(token.to_string()).or_default();
        let result = f(session);
        if session.state() == &ScanState::Idle {
            scanners.remove(token);
        }
        result
    }

    pub fn scan_state(&self, token: &str) -> ScanState {
        self.with_scanner(token, |s| s.state().clone())
    }
}
