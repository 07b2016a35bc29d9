//! Natours REST API
//!
//! This crate provides the HTTP layer of the Natours tour booking service.
//! It exposes CRUD endpoints for tours, users and reviews, a handful of
//! server-rendered pages, and the security middleware in front of them.
//!
//! # Architecture
//!
//! This crate exists in the HTTP layer and handles:
//! - Configuration loaded once at startup ([`ApiConfig`])
//! - Request sanitization, rate limiting and security headers
//! - Translation of store results into JSON envelopes
//! - Error mapping from domain to HTTP at a single boundary ([`ApiError`])
//! - Routing and server startup
//!
//! Business rules live in `natours_core`. The dependency flows:
//! HTTP API → domain, never the reverse.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod rate_limit;
pub mod routes;
pub mod sanitize;
pub mod server;
pub mod views;

use std::sync::Arc;

use natours_core::{InMemoryRepository, Repository, Review, Tour, User};

// Re-export key types for convenience
pub use config::{ApiConfig, ConfigError, Environment};
pub use errors::{ApiError, ErrorKind, ErrorResponse};
pub use rate_limit::{RateLimitConfig, RateLimitError};
pub use server::ApiServer;
pub use views::Views;

/// API version
pub const API_VERSION: &str = "v1";

/// Default API port
pub const DEFAULT_PORT: u16 = 3000;

/// Application state shared across handlers
///
/// Built once at startup from an [`ApiConfig`] and cloned into every
/// request. All fields are reference counted; cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub tours: Arc<dyn Repository<Tour>>,
    pub users: Arc<dyn Repository<User>>,
    pub reviews: Arc<dyn Repository<Review>>,
    pub views: Arc<Views>,
}

impl AppState {
    /// Create application state backed by empty in-memory collections.
    ///
    /// # Errors
    ///
    /// Returns an error if the page templates fail to compile.
    pub fn new(config: ApiConfig) -> Result<Self, views::ViewError> {
        Ok(Self {
            tours: Arc::new(InMemoryRepository::<Tour>::new()),
            users: Arc::new(InMemoryRepository::<User>::new()),
            reviews: Arc::new(InMemoryRepository::<Review>::new()),
            views: Arc::new(Views::new()?),
            config: Arc::new(config),
        })
    }
}
