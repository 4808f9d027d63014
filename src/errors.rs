use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::services::scanner::ScanRejection;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("rejected: {0}")]
    Rejected(String),

    #[error("backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("malformed backend payload: {0}")]
    Schema(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("scanner: {0}")]
    Scanner(#[from] ScanRejection),

    #[error("configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Network(_) => StatusCode::BAD_GATEWAY,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Backend { .. } => StatusCode::BAD_GATEWAY,
            AppError::Schema(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Scanner(ScanRejection::EmptyCode) => StatusCode::BAD_REQUEST,
            AppError::Scanner(_) => StatusCode::CONFLICT,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            AppError::Schema(e.to_string())
        } else {
            AppError::Network(e.to_string())
        }
    }
}
