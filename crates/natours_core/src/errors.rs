//! Domain error types.
//!
//! Every error carries an operational/internal classification. Operational
//! errors are anticipated failures caused by the client (bad input, malformed
//! ids, duplicate values) and are safe to report verbatim. Internal errors
//! indicate a fault in the store itself and must not leak to clients.

use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// A single schema rule violation on one document field.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Field '{field}' is required")]
    Required { field: String },

    #[error("Field '{field}' is too long: {actual} characters (max: {max})")]
    TooLong {
        field: String,
        actual: usize,
        max: usize,
    },

    #[error("Field '{field}' is too short: {actual} characters (min: {min})")]
    TooShort {
        field: String,
        actual: usize,
        min: usize,
    },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        actual: f64,
        min: f64,
        max: f64,
    },

    #[error("Field '{field}' is invalid: {reason}")]
    Invalid { field: String, reason: String },

    /// The payload could not be cast to the document shape.
    #[error("Cast failed: {reason}")]
    Cast { reason: String },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    pub fn too_long(field: impl Into<String>, actual: usize, max: usize) -> Self {
        ValidationError::TooLong {
            field: field.into(),
            actual,
            max,
        }
    }

    pub fn too_short(field: impl Into<String>, actual: usize, min: usize) -> Self {
        ValidationError::TooShort {
            field: field.into(),
            actual,
            min,
        }
    }

    pub fn out_of_range(field: impl Into<String>, actual: f64, min: f64, max: f64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            actual,
            min,
            max,
        }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors produced while turning a request query string into a `ListQuery`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Invalid query key '{key}'")]
    InvalidKey { key: String },

    #[error("Unsupported query operator '{operator}' on field '{field}'")]
    UnsupportedOperator { field: String, operator: String },

    #[error("Field '{field}' cannot combine equality and comparison conditions")]
    ConflictingConditions { field: String },

    #[error("Query parameter '{key}' must be a positive integer, got '{value}'")]
    InvalidNumber { key: String, value: String },

    #[error("Projection cannot mix included and excluded fields")]
    MixedProjection,

    #[error("Cast to {expected} failed for value \"{value}\" at path \"{field}\"")]
    Cast {
        field: String,
        value: String,
        expected: &'static str,
    },
}

/// Errors returned by repository operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Cast to DocumentId failed for value \"{value}\"")]
    InvalidId { value: String },

    #[error("{model} validation failed: {}", join_messages(.errors))]
    Validation {
        model: &'static str,
        errors: Vec<ValidationError>,
    },

    #[error("Duplicate field value '{value}' for '{field}'. Please use another value!")]
    Duplicate { field: String, value: String },

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Failed to serialize document: {reason}")]
    Serialization { reason: String },

    #[error("Document store unavailable: {reason}")]
    Unavailable { reason: String },
}

impl StoreError {
    /// Whether the error was caused by the request rather than the store.
    pub fn is_operational(&self) -> bool {
        match self {
            StoreError::InvalidId { .. }
            | StoreError::Validation { .. }
            | StoreError::Duplicate { .. }
            | StoreError::Query(_) => true,
            StoreError::Serialization { .. } | StoreError::Unavailable { .. } => false,
        }
    }

    pub fn validation(model: &'static str, errors: Vec<ValidationError>) -> Self {
        StoreError::Validation { model, errors }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization {
            reason: err.to_string(),
        }
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for repository operations.
pub type StoreResult<T> = Result<T, StoreError>;
