//! HTTP routing configuration
//!
//! This module defines all HTTP routes and their corresponding handlers.
//!
//! # Route Structure
//!
//! - GET    / - Landing page
//! - GET    /overview - All tours page
//! - GET    /tour - Tour detail page
//! - GET    /api/v1/{resource} - List documents
//! - POST   /api/v1/{resource} - Create document
//! - GET    /api/v1/{resource}/:id - Get document
//! - PATCH  /api/v1/{resource}/:id - Update document
//! - DELETE /api/v1/{resource}/:id - Delete document
//!
//! where `{resource}` is `tours`, `users` or `reviews`. Anything else is
//! looked up in the public directory and finally answered with a JSON 404.
//!
//! # Middleware
//!
//! Outermost first: security headers, request logging (development only),
//! body size limit and sanitization, query sanitization, parameter
//! pollution, request time. Rate limiting wraps the `/api` routes only.

use axum::{
    extract::DefaultBodyLimit,
    handler::HandlerWithoutStateExt,
    middleware,
    routing::get,
    Router,
};
use natours_core::{Document, Review, Tour, User};
use tower_http::{
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

use crate::{
    handlers::{self, factory, pages, RepositoryFor},
    middleware as api_middleware, rate_limit,
    sanitize::{self, BodyLimit},
    AppState, RateLimitError, API_VERSION,
};

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;

/// Create the complete application router with all routes configured.
///
/// # Errors
///
/// Returns an error if the configured rate limit is unusable.
pub fn create_router(state: AppState) -> Result<Router, RateLimitError> {
    let config = state.config.clone();

    let api = Router::new()
        .nest("/tours", resource_routes::<Tour>())
        .nest("/users", resource_routes::<User>())
        .nest("/reviews", resource_routes::<Review>());
    let api = rate_limit::limit_requests(api, &config.rate_limit)?;

    let static_files = ServeDir::new(&config.public_dir)
        .call_fallback_on_method_not_allowed(true)
        .fallback(handlers::route_not_found.into_service());

    let mut router = Router::new()
        .route("/", get(pages::base))
        .route("/overview", get(pages::overview))
        .route("/tour", get(pages::tour))
        .nest(&format!("/api/{API_VERSION}"), api)
        .fallback_service(static_files)
        .layer(middleware::from_fn(api_middleware::record_request_time))
        .layer(middleware::from_fn(sanitize::prevent_parameter_pollution))
        .layer(middleware::from_fn(sanitize::sanitize_query))
        // The cap applies to the raw body in `sanitize_body`; escaping may
        // grow the body past it afterwards.
        .layer(DefaultBodyLimit::disable())
        .layer(middleware::from_fn_with_state(
            BodyLimit(config.body_limit),
            sanitize::sanitize_body,
        ));

    if config.environment.is_development() {
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().include_headers(true))
            .on_response(DefaultOnResponse::new().include_headers(true));

        router = router
            .layer(middleware::from_fn(api_middleware::request_logging))
            .layer(trace_layer);
    }

    Ok(router
        .layer(middleware::from_fn(api_middleware::security_headers))
        .with_state(state))
}

/// The five CRUD routes for one document type.
fn resource_routes<T: Document>() -> Router<AppState>
where
    AppState: RepositoryFor<T>,
{
    Router::new()
        .route(
            "/",
            get(factory::get_all::<T>).post(factory::create_one::<T>),
        )
        .route(
            "/:id",
            get(factory::get_one::<T>)
                .patch(factory::update_one::<T>)
                .delete(factory::delete_one::<T>),
        )
}
