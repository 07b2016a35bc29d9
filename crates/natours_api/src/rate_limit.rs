//! Per-client request rate limiting for the `/api` routes.
//!
//! Each client IP gets a bucket of `max_requests` requests which refills
//! one request every `window / max_requests`. A client that empties its
//! bucket is answered with 429 until the bucket refills.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::RETRY_AFTER, HeaderName, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::PeerIpKeyExtractor, GovernorLayer,
};

use crate::errors::ApiError;

#[cfg(test)]
#[path = "rate_limit_tests.rs"]
mod tests;

pub const DEFAULT_MESSAGE: &str = "Too many requests from this IP, Please try again in an hour!";

const X_RATELIMIT_AFTER: HeaderName = HeaderName::from_static("x-ratelimit-after");

/// Configuration for rate limiting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
    /// Message returned with 429 responses
    pub message: String,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(60 * 60),
            message: DEFAULT_MESSAGE.to_string(),
        }
    }
}

impl RateLimitConfig {
    /// Time after which one more request is allowed.
    ///
    /// Returns `None` when the quota allows no requests at all.
    pub fn replenish_interval(&self) -> Option<Duration> {
        self.window
            .checked_div(self.max_requests)
            .filter(|interval| !interval.is_zero())
    }
}

/// Errors raised while building the rate limiter.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Invalid rate limit of {max_requests} requests per {window:?}")]
    InvalidQuota { max_requests: u32, window: Duration },
}

/// Apply the rate limit to every route of `router`.
///
/// Clients are identified by peer IP, which requires the server to be
/// started with connect info.
///
/// # Errors
///
/// Returns `RateLimitError::InvalidQuota` if the configuration allows no
/// requests or has an empty window.
pub fn limit_requests<S>(
    router: Router<S>,
    config: &RateLimitConfig,
) -> Result<Router<S>, RateLimitError>
where
    S: Clone + Send + Sync + 'static,
{
    let invalid = || RateLimitError::InvalidQuota {
        max_requests: config.max_requests,
        window: config.window,
    };
    let interval = config.replenish_interval().ok_or_else(invalid)?;

    let governor = GovernorConfigBuilder::default()
        .key_extractor(PeerIpKeyExtractor)
        .use_headers()
        .period(interval)
        .burst_size(config.max_requests)
        .finish()
        .ok_or_else(invalid)?;

    let message: Arc<str> = Arc::from(config.message.as_str());

    Ok(router
        .layer(GovernorLayer {
            config: Arc::new(governor),
        })
        .layer(middleware::from_fn_with_state(message, limit_exceeded)))
}

/// Turn the limiter's plain text 429 into the JSON error body.
///
/// The wait time headers set by the limiter are kept.
async fn limit_exceeded(
    State(message): State<Arc<str>>,
    request: Request,
    next: Next,
) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let response = next.run(request).await;
    if response.status() != StatusCode::TOO_MANY_REQUESTS {
        return response;
    }

    tracing::warn!(client = ?client, "Rate limit exceeded");

    let (mut parts, _) = response.into_parts();
    let mut limited =
        ApiError::operational(StatusCode::TOO_MANY_REQUESTS, message.to_string()).into_response();
    for name in [RETRY_AFTER, X_RATELIMIT_AFTER] {
        if let Some(value) = parts.headers.remove(&name) {
            limited.headers_mut().insert(name, value);
        }
    }
    limited
}
