//! General purpose HTTP middleware
//!
//! This module provides middleware for:
//! - Security response headers
//! - Recording the time a request arrived
//! - Development request logging
//!
//! Rate limiting and request sanitization live in their own modules.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

#[cfg(test)]
#[path = "middleware_tests.rs"]
mod tests;

/// Security headers set on every response, overriding any set by handlers.
pub const SECURITY_HEADERS: &[(&str, &str)] = &[
    (
        "content-security-policy",
        "default-src 'self';base-uri 'self';font-src 'self' https: data:;\
         form-action 'self';frame-ancestors 'self';img-src 'self' data:;\
         object-src 'none';script-src 'self';script-src-attr 'none';\
         style-src 'self' https: 'unsafe-inline';upgrade-insecure-requests",
    ),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    (
        "strict-transport-security",
        "max-age=15552000; includeSubDomains",
    ),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

/// Time at which the request entered the application.
///
/// Inserted into request extensions by [`record_request_time`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTime(pub DateTime<Utc>);

/// Security header middleware.
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    for &(name, value) in SECURITY_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    response
}

/// Record the arrival time of the request.
pub async fn record_request_time(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(RequestTime(Utc::now()));
    next.run(request).await
}

/// Request logging middleware.
///
/// Adds a request ID and logs start and completion of every request.
/// Installed only when running in development.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    let started = Instant::now();
    let request_time = Utc::now().to_rfc3339();

    tracing::info!(
        request_id = %request_id,
        method = %request.method(),
        uri = %request.uri(),
        request_time = %request_time,
        "Request started"
    );

    let response = next.run(request).await;

    tracing::info!(
        request_id = %request_id,
        status = %response.status(),
        elapsed_ms = elapsed_millis(started.elapsed()),
        "Request completed"
    );

    response
}

/// Whole milliseconds in `elapsed`, saturating at `u64::MAX`.
fn elapsed_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
