use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use ticketwallet::config::AppConfig;
use ticketwallet::handlers;
use ticketwallet::services::backend::http::HttpBackend;
use ticketwallet::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let backend = HttpBackend::new(&config.api_base_url)?;
    tracing::info!("using event backend at {}", config.api_base_url);
    if config.dashboard_token.is_empty() {
        tracing::warn!("DASHBOARD_TOKEN not set, scan event stream disabled");
    }

    let state = Arc::new(AppState::new(config.clone(), Box::new(backend)));

    let app = handlers::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
