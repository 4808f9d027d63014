use std::env;

pub const DEFAULT_EVENT_IMAGE: &str = "https://placehold.co/600x400?text=Event";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub api_base_url: String,
    pub default_event_image: String,
    pub dashboard_token: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5000".to_string()),
            default_event_image: env::var("DEFAULT_EVENT_IMAGE")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_EVENT_IMAGE.to_string()),
            dashboard_token: env::var("DASHBOARD_TOKEN").unwrap_or_default(),
        }
    }
}
