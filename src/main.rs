//! SSR host for the TETRAEDRO dashboard.
//!
//! Serves the server-rendered Leptos shell, the hydration bundle under `/pkg`
//! and a `/healthz` probe. All identity work happens in the browser against
//! the hosted service, so the host keeps no state of its own.

#![recursion_limit = "256"]

mod config;
mod error;
mod routes;

use tracing_subscriber::EnvFilter;

use crate::config::HostConfig;
use crate::error::HostError;

#[tokio::main]
async fn main() -> Result<(), HostError> {
    let env_file = dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "tetraedro=info,tower_http=info".into()))
        .init();

    if let Some(path) = env_file {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let config = HostConfig::from_env()?;
    let app = routes::app()?;

    let listener = tokio::net::TcpListener::bind(config.site_addr)
        .await
        .map_err(|source| HostError::Bind { addr: config.site_addr, source })?;

    tracing::info!(port = %config.port, "tetraedro listening");
    axum::serve(listener, app).await.map_err(HostError::Serve)
}
