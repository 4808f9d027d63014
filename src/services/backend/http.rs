use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;

use super::{ListPayload, TicketBackend};
use crate::errors::AppError;
use crate::models::{Booking, Event, ScanVerdict};

pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "API base URL must be http(s), got {base_url:?}"
            )));
        }
        Ok(Self {
            base_url,
            client: reqwest::Client::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl TicketBackend for HttpBackend {
    async fn my_bookings(&self, token: &str) -> Result<Vec<Booking>, AppError> {
        let resp = self
            .client
            .get(self.url("/api/tickets/my-tickets"))
            .bearer_auth(token)
            .send()
            .await?;

        let payload: ListPayload<Booking> = decode(resp).await?;
        Ok(payload.into_vec())
    }

    async fn events(&self) -> Result<Vec<Event>, AppError> {
        let resp = self.client.get(self.url("/api/events")).send().await?;

        let payload: ListPayload<Event> = decode(resp).await?;
        Ok(payload.into_vec())
    }

    async fn scan_ticket(&self, token: &str, code: &str) -> Result<ScanVerdict, AppError> {
        let resp = self
            .client
            .post(self.url("/api/tickets/scan"))
            .bearer_auth(token)
            .json(&json!({ "encryptedData": code }))
            .send()
            .await?;

        let status = resp.status();
        if matches!(
            status,
            StatusCode::BAD_REQUEST
                | StatusCode::NOT_FOUND
                | StatusCode::CONFLICT
                | StatusCode::UNPROCESSABLE_ENTITY
        ) {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::Rejected(error_message(&body, status)));
        }

        decode(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, AppError> {
    let status = resp.status();
    let body = resp.text().await?;

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(AppError::Unauthorized);
    }
    if !status.is_success() {
        return Err(AppError::Backend {
            status: status.as_u16(),
            message: error_message(&body, status),
        });
    }

    serde_json::from_str(&body).map_err(|e| AppError::Schema(e.to_string()))
}

/// Pulls a human-readable message out of an error body.
fn error_message(body: &str, status: StatusCode) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v["message"]
                .as_str()
                .or_else(|| v["error"].as_str())
                .map(str::to_string)
        })
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        })
}
