use crate::models::{ScanOutcome, ScanState};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanRejection {
    #[error("a scan is already being validated")]
    Busy,

    #[error("scanner is not active")]
    Inactive,

    #[error("no validation in progress")]
    NotValidating,

    #[error("scanned code is empty")]
    EmptyCode,
}

/// Scan-to-validate loop for one attended scanning station.
///
/// Idle -> Scanning -> Validating -> Result -> Idle. While a code is being
/// validated every further scan is refused, so one physical scan is submitted
/// at most once.
#[derive(Debug, Default)]
pub struct ScanSession {
    state: ScanState,
}

impl ScanSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn is_validating(&self) -> bool {
        self.state == ScanState::Validating
    }

    /// Opens the camera. Also used to scan again straight from a result.
    pub fn activate(&mut self) -> Result<(), ScanRejection> {
        match self.state {
            ScanState::Validating => Err(ScanRejection::Busy),
            _ => {
                self.state = ScanState::Scanning;
                Ok(())
            }
        }
    }

    /// Accepts a scanned code for validation.
    pub fn begin(&mut self, code: &str) -> Result<(), ScanRejection> {
        match self.state {
            ScanState::Validating => Err(ScanRejection::Busy),
            ScanState::Idle | ScanState::Result { .. } => Err(ScanRejection::Inactive),
            ScanState::Scanning => {
                if code.trim().is_empty() {
                    return Err(ScanRejection::EmptyCode);
                }
                self.state = ScanState::Validating;
                Ok(())
            }
        }
    }

    pub fn complete(&mut self, outcome: ScanOutcome) -> Result<(), ScanRejection> {
        if !self.is_validating() {
            return Err(ScanRejection::NotValidating);
        }
        self.state = ScanState::Result { outcome };
        Ok(())
    }

    /// Acknowledges a result and returns to idle. A no-op when idle.
    pub fn dismiss(&mut self) -> Result<(), ScanRejection> {
        match self.state {
            ScanState::Result { .. } | ScanState::Idle => {
                self.state = ScanState::Idle;
                Ok(())
            }
            ScanState::Validating => Err(ScanRejection::Busy),
            ScanState::Scanning => Err(ScanRejection::Inactive),
        }
    }

    /// Closes the camera from any state except an in-flight validation.
    pub fn deactivate(&mut self) -> Result<(), ScanRejection> {
        if self.is_validating() {
            return Err(ScanRejection::Busy);
        }
        self.state = ScanState::Idle;
        Ok(())
    }
}
