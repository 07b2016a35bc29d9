//! Natours REST API Server
//!
//! Main binary for running the API server in production or development.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log level (default: info)
//!
//! See [`natours_api::config`] for the server settings.

use std::env;

use natours_api::{ApiConfig, ApiServer, AppState, API_VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::from_env()?;

    // Initialize tracing; production logs are emitted as JSON
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()));
    if config.environment.is_development() {
        subscriber.init();
    } else {
        subscriber.json().init();
    }

    tracing::info!("Starting Natours API server");
    tracing::info!("API version: {}", API_VERSION);
    tracing::info!("Serving static files from {}", config.public_dir.display());

    let state = AppState::new(config)?;
    let server = ApiServer::new(state);

    // Start server with graceful shutdown
    server.serve().await
}
