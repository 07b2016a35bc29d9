//! Request sanitization middleware
//!
//! This module provides middleware for:
//! - JSON body size enforcement
//! - NoSQL operator injection: keys starting with `$` or containing `.` are
//!   removed from JSON bodies and query strings
//! - XSS: `<` and `>` in string values are HTML-escaped
//! - HTTP parameter pollution: repeated query keys collapse to their last
//!   value unless whitelisted

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use url::form_urlencoded;

use crate::errors::ApiError;

#[cfg(test)]
#[path = "sanitize_tests.rs"]
mod tests;

/// Query keys that may legitimately repeat, e.g. `duration=5&duration=9`.
pub const PARAMETER_WHITELIST: &[&str] = &[
    "duration",
    "ratingsQuantity",
    "ratingsAverage",
    "maxGroupSize",
    "difficulty",
    "price",
];

/// Maximum JSON body size, passed as middleware state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyLimit(pub usize);

/// Read, size check and clean JSON request bodies.
///
/// Bodies larger than the limit are rejected with 413 before any handler
/// runs. Bodies that are not valid JSON pass through unchanged so the `Json`
/// extractor reports them.
pub async fn sanitize_body(
    State(BodyLimit(limit)): State<BodyLimit>,
    request: Request,
    next: Next,
) -> Response {
    if !is_json(request.headers()) {
        return next.run(request).await;
    }

    let declared_length = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared_length.is_some_and(|length| length > limit) {
        return payload_too_large(limit);
    }

    let (mut parts, body) = request.into_parts();
    // Every read failure is reported as oversize; the limit is the only
    // failure a client can cause.
    let bytes = match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => bytes,
        Err(_) => return payload_too_large(limit),
    };

    let bytes = match serde_json::from_slice::<Value>(&bytes) {
        Ok(mut value) => {
            sanitize_value(&mut value);
            match serde_json::to_vec(&value) {
                Ok(cleaned) => {
                    parts.headers.remove(header::CONTENT_LENGTH);
                    Bytes::from(cleaned)
                }
                Err(e) => return ApiError::from(e).into_response(),
            }
        }
        Err(_) => bytes,
    };

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

/// Drop operator keys and escape markup in the query string.
pub async fn sanitize_query(mut request: Request, next: Next) -> Response {
    if let Some(query) = request.uri().query() {
        let cleaned = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(
                form_urlencoded::parse(query.as_bytes())
                    .filter(|(key, _)| !is_forbidden_query_key(key))
                    .map(|(key, value)| (key, escape_html(&value))),
            )
            .finish();

        if let Err(e) = replace_query(request.uri_mut(), &cleaned) {
            return e.into_response();
        }
    }

    next.run(request).await
}

/// Collapse repeated query keys to their last value.
pub async fn prevent_parameter_pollution(mut request: Request, next: Next) -> Response {
    if let Some(query) = request.uri().query() {
        let pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        let collapsed = collapse_repeated(pairs);
        let rebuilt = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(collapsed)
            .finish();

        if let Err(e) = replace_query(request.uri_mut(), &rebuilt) {
            return e.into_response();
        }
    }

    next.run(request).await
}

/// Recursively remove forbidden keys and escape markup in strings.
pub fn sanitize_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|key, _| !is_forbidden_key(key));
            map.values_mut().for_each(sanitize_value);
        }
        Value::Array(items) => items.iter_mut().for_each(sanitize_value),
        Value::String(text) => {
            if text.contains(['<', '>']) {
                *text = escape_html(text);
            }
        }
        _ => {}
    }
}

/// Escape `<` and `>` as HTML entities.
pub fn escape_html(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}

fn is_forbidden_key(key: &str) -> bool {
    key.starts_with('$') || key.contains('.')
}

/// Checks the base key and each bracket segment, so `price[$gt]` is caught.
fn is_forbidden_query_key(key: &str) -> bool {
    key.split(['[', ']'])
        .filter(|segment| !segment.is_empty())
        .any(is_forbidden_key)
}

/// Keep only the last value of each repeated non-whitelisted key, at the
/// position of its first occurrence.
pub fn collapse_repeated(pairs: Vec<(String, String)>) -> Vec<(String, String)> {
    let mut result: Vec<(String, String)> = Vec::with_capacity(pairs.len());

    for (key, value) in pairs {
        let base = key.split('[').next().unwrap_or(&key);
        if PARAMETER_WHITELIST.contains(&base) {
            result.push((key, value));
            continue;
        }

        match result.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => result.push((key, value)),
        }
    }

    result
}

fn replace_query(uri: &mut Uri, query: &str) -> Result<(), ApiError> {
    let path_and_query = if query.is_empty() {
        uri.path().to_string()
    } else {
        format!("{}?{}", uri.path(), query)
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(
        path_and_query
            .parse()
            .map_err(|_| ApiError::bad_request("Malformed query string"))?,
    );
    *uri = Uri::from_parts(parts).map_err(|_| ApiError::bad_request("Malformed query string"))?;

    Ok(())
}

fn is_json(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

fn payload_too_large(limit: usize) -> Response {
    ApiError::operational(
        StatusCode::PAYLOAD_TOO_LARGE,
        format!("Request body exceeds the {limit} byte limit"),
    )
    .into_response()
}
