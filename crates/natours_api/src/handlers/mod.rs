//! HTTP request handlers
//!
//! Handlers translate HTTP requests to store operations and store results
//! to JSON envelopes or rendered pages.
//!
//! # Architecture
//!
//! Each resource handler:
//! 1. Extracts HTTP request data (path params, raw query, body)
//! 2. Translates it to store inputs (`ListQuery`, JSON fields)
//! 3. Calls the resource's `Repository`
//! 4. Wraps the result in an `Envelope`
//! 5. Returns `Result<_, ApiError>`
//!
//! The resource handlers are written once in [`factory`] and instantiated
//! per document type by the router.

pub mod factory;
pub mod pages;

use axum::extract::OriginalUri;
use natours_core::{Document, Repository, Review, Tour, User};
use std::sync::Arc;

use crate::{errors::ApiError, AppState};

/// Access to the repository holding documents of type `T`.
pub trait RepositoryFor<T: Document> {
    fn repository(&self) -> &Arc<dyn Repository<T>>;
}

impl RepositoryFor<Tour> for AppState {
    fn repository(&self) -> &Arc<dyn Repository<Tour>> {
        &self.tours
    }
}

impl RepositoryFor<User> for AppState {
    fn repository(&self) -> &Arc<dyn Repository<User>> {
        &self.users
    }
}

impl RepositoryFor<Review> for AppState {
    fn repository(&self) -> &Arc<dyn Repository<Review>> {
        &self.reviews
    }
}

/// Catch-all for URLs that match no route and no static file.
pub async fn route_not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::route_not_found(uri)
}
