use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScanState {
    #[default]
    Idle,
    Scanning,
    Validating,
    Result { outcome: ScanOutcome },
}

impl ScanState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanState::Idle => "idle",
            ScanState::Scanning => "scanning",
            ScanState::Validating => "validating",
            ScanState::Result { .. } => "result",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum ScanOutcome {
    Success { message: String },
    Error { message: String },
}

impl ScanOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ScanOutcome::Success { .. })
    }
}

/// What the backend answers to an accepted scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanVerdict {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub ticket: Option<serde_json::Value>,
}

/// Broadcast to dashboard subscribers after every completed scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanEvent {
    pub id: Uuid,
    pub outcome: ScanOutcome,
    pub at: DateTime<Utc>,
}

impl ScanEvent {
    pub fn new(outcome: ScanOutcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            outcome,
            at: Utc::now(),
        }
    }
}
