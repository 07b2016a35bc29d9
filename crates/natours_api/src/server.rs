//! HTTP server configuration and startup
//!
//! This module provides the main server startup logic.

use axum::Router;
use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpListener;
use tokio::signal;

use crate::{routes, AppState, RateLimitError};

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;

/// API server
pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    /// Create a new API server around fully built application state.
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Address the server binds to.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured host is not an IP address.
    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        let host = self
            .state
            .config
            .host
            .parse::<IpAddr>()
            .map_err(|e| anyhow::anyhow!("Invalid API_HOST '{}': {}", self.state.config.host, e))?;

        Ok(SocketAddr::from((host, self.state.config.port)))
    }

    /// Build the Axum router with all routes and middleware.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured rate limit is unusable.
    pub fn router(&self) -> Result<Router, RateLimitError> {
        routes::create_router(self.state.clone())
    }

    /// Start the server and listen for requests.
    ///
    /// This method blocks until the server is shut down gracefully via
    /// CTRL+C (SIGINT) or SIGTERM signal.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the configured address.
    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = self.addr()?;

        tracing::info!(
            environment = ?self.state.config.environment,
            "Starting API server on {}",
            addr
        );

        let listener = TcpListener::bind(addr).await?;
        let app = self.router()?;

        // Peer addresses are needed by the rate limiter
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

/// Wait for shutdown signal (CTRL+C or SIGTERM)
///
/// If a handler cannot be installed the error is logged and that signal is
/// ignored; the other one still triggers shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install CTRL+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received CTRL+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}
