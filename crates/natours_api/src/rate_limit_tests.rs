//! Tests for rate limiting

use super::*;
use axum::{body::Body, http::Request as HttpRequest, routing::get};
use tower::ServiceExt; // for `oneshot`

fn quota(max_requests: u32, window_secs: u64) -> RateLimitConfig {
    RateLimitConfig {
        max_requests,
        window: Duration::from_secs(window_secs),
        ..RateLimitConfig::default()
    }
}

#[test]
fn test_default_config() {
    let config = RateLimitConfig::default();

    assert_eq!(config.max_requests, 100);
    assert_eq!(config.window, Duration::from_secs(3600));
    assert_eq!(
        config.message,
        "Too many requests from this IP, Please try again in an hour!"
    );
}

#[test]
fn test_replenish_interval_spreads_window() {
    assert_eq!(
        RateLimitConfig::default().replenish_interval(),
        Some(Duration::from_secs(36))
    );
    assert_eq!(quota(0, 60).replenish_interval(), None);
    assert_eq!(quota(5, 0).replenish_interval(), None);
}

#[test]
fn test_empty_quota_rejected() {
    let result = limit_requests(Router::<()>::new(), &quota(0, 60));

    assert!(matches!(
        result,
        Err(RateLimitError::InvalidQuota { max_requests: 0, .. })
    ));
}

async fn ok_handler() -> &'static str {
    "OK"
}

fn app(config: RateLimitConfig) -> Router {
    let api = Router::new().route("/api/v1/tours", get(ok_handler));

    limit_requests(api, &config)
        .unwrap()
        .route("/overview", get(ok_handler))
}

fn get_request_from(uri: &str, ip: [u8; 4]) -> HttpRequest<Body> {
    let mut request = HttpRequest::builder().uri(uri).body(Body::empty()).unwrap();
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((ip, 52_000))));
    request
}

fn get_request(uri: &str) -> HttpRequest<Body> {
    get_request_from(uri, [10, 0, 0, 1])
}

#[tokio::test]
async fn test_returns_429_with_message_once_quota_spent() {
    let app = app(quota(2, 3600));

    for _ in 0..2 {
        let response = app.clone().oneshot(get_request("/api/v1/tours")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.oneshot(get_request("/api/v1/tours")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "fail");
    assert_eq!(json["message"], DEFAULT_MESSAGE);
}

#[tokio::test]
async fn test_clients_counted_separately() {
    let app = app(quota(1, 3600));

    let first = app
        .clone()
        .oneshot(get_request_from("/api/v1/tours", [10, 0, 0, 1]))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let other = app
        .clone()
        .oneshot(get_request_from("/api/v1/tours", [10, 0, 0, 2]))
        .await
        .unwrap();
    assert_eq!(other.status(), StatusCode::OK);

    let again = app
        .oneshot(get_request_from("/api/v1/tours", [10, 0, 0, 1]))
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_routes_outside_limited_router_not_counted() {
    let app = app(quota(1, 3600));

    for _ in 0..3 {
        let response = app.clone().oneshot(get_request("/overview")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_custom_message_used() {
    let app = app(RateLimitConfig {
        message: "Slow down".to_string(),
        ..quota(1, 3600)
    });

    app.clone().oneshot(get_request("/api/v1/tours")).await.unwrap();
    let response = app.oneshot(get_request("/api/v1/tours")).await.unwrap();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["message"], "Slow down");
}
