//! HTTP response type definitions
//!
//! Every successful API response is wrapped in an [`Envelope`]:
//!
//! ```json
//! {
//!   "status": "success",
//!   "results": 2,
//!   "data": { "tours": [ ... ] }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;

/// Envelope label for successful list, get, create and delete responses.
pub const STATUS_SUCCESS: &str = "success";

/// Envelope label for successful updates.
pub const STATUS_UPDATED: &str = "SUCCESS";

/// Top-level JSON wrapper for successful responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: String,

    /// Number of documents, present on list responses only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Payload keyed by collection or singular name; `null` after a delete
    pub data: Value,
}

impl Envelope {
    /// Envelope for a list of documents, e.g. `data: { tours: [...] }`.
    pub fn list(collection: &str, documents: Vec<Value>) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            results: Some(documents.len()),
            message: None,
            data: keyed(collection, Value::Array(documents)),
        }
    }

    /// Envelope for a single document or `null`, e.g. `data: { tour: {...} }`.
    pub fn single(status: &str, singular: &str, document: Option<Value>) -> Self {
        Self {
            status: status.to_string(),
            results: None,
            message: None,
            data: keyed(singular, document.unwrap_or(Value::Null)),
        }
    }

    /// Envelope confirming a deletion.
    pub fn deleted(id: &str) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            results: None,
            message: Some(format!("{id} document has been deleted!")),
            data: Value::Null,
        }
    }
}

fn keyed(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}
