//! Error handling and HTTP error conversion
//!
//! Every handler and middleware returns `Result<_, ApiError>`. The
//! `IntoResponse` implementation of [`ApiError`] is the single place where
//! failures become HTTP responses.
//!
//! # Error Kinds
//!
//! - **Operational** errors are anticipated (bad input, malformed ids,
//!   missing documents, rate limits). They are returned with their own status
//!   and message.
//! - **Internal** errors are faults. They are logged with full detail and the
//!   client receives a generic 500 response.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use natours_core::StoreError;
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Envelope label for client errors.
pub const STATUS_FAIL: &str = "fail";

/// Envelope label used by the lookup, list, update and delete endpoints.
pub const STATUS_FAILED: &str = "failed";

/// Envelope label for server errors.
pub const STATUS_ERROR: &str = "error";

/// Message sent in place of internal error details.
pub const INTERNAL_ERROR_MESSAGE: &str = "Something went very wrong!";

/// JSON body of every error response.
///
/// # Example
///
/// ```json
/// {
///   "status": "fail",
///   "message": "Couldn't find this /api/v2/tours in this server!"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Operational,
    Internal,
}

/// Axum response wrapper for API errors
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(State(state): State<AppState>) -> Result<Json<Envelope>, ApiError> {
///     let tours = state
///         .tours
///         .find(&query)
///         .await
///         .map_err(|e| ApiError::from_store(e, StatusCode::BAD_REQUEST))?;
///     Ok(Json(Envelope::list("tours", tours)))
/// }
/// ```
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: ErrorKind,
    label: Option<&'static str>,
    message: String,
}

impl ApiError {
    /// Create an anticipated error with a client-facing status and message.
    pub fn operational(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            kind: ErrorKind::Operational,
            label: None,
            message: message.into(),
        }
    }

    /// Create an internal error. The message is logged, never returned.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            kind: ErrorKind::Internal,
            label: None,
            message: message.into(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::operational(StatusCode::BAD_REQUEST, message)
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::operational(StatusCode::NOT_FOUND, message)
    }

    /// Error returned for any URL that no route or static file matches.
    pub fn route_not_found(url: impl std::fmt::Display) -> Self {
        Self::not_found(format!("Couldn't find this {url} in this server!"))
    }

    /// Convert a store error, reporting operational failures with `status`.
    pub fn from_store(err: StoreError, status: StatusCode) -> Self {
        if err.is_operational() {
            Self::operational(status, err.to_string())
        } else {
            Self::internal(err.to_string())
        }
    }

    /// Convert a rejected JSON body.
    pub fn from_json_rejection(rejection: JsonRejection) -> Self {
        Self::operational(rejection.status(), rejection.body_text())
    }

    /// Override the envelope `status` label.
    ///
    /// Has no effect on internal errors, which always use `"error"`.
    pub fn with_label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Status code and body sent to the client.
    pub fn to_response_parts(&self) -> (StatusCode, ErrorResponse) {
        match self.kind {
            ErrorKind::Operational => {
                let default_label = if self.status.is_server_error() {
                    STATUS_ERROR
                } else {
                    STATUS_FAIL
                };
                (
                    self.status,
                    ErrorResponse {
                        status: self.label.unwrap_or(default_label).to_string(),
                        message: self.message.clone(),
                    },
                )
            }
            ErrorKind::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    status: STATUS_ERROR.to_string(),
                    message: INTERNAL_ERROR_MESSAGE.to_string(),
                },
            ),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.status, self.message)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::internal(format!("Failed to serialize response: {err}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        log_error(&self);

        let (status, error_response) = self.to_response_parts();
        (status, Json(error_response)).into_response()
    }
}

/// Log error with appropriate level based on kind and status
fn log_error(error: &ApiError) {
    match (error.kind, error.status) {
        (ErrorKind::Internal, _) => {
            tracing::error!("API error: {}", error);
        }
        (_, status) if status.is_server_error() => {
            tracing::error!("API error: {}", error);
        }
        (_, StatusCode::NOT_FOUND) | (_, StatusCode::TOO_MANY_REQUESTS) => {
            tracing::info!("API error: {}", error);
        }
        _ => {
            tracing::warn!("API error: {}", error);
        }
    }
}
