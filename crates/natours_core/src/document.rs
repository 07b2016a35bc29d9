//! Document identity and the contract shared by every stored document type.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use crate::{StoreError, ValidationError};

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;

/// Unique identifier assigned by the store when a document is created.
///
/// Serialised as a plain string under the `_id` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        DocumentId(Uuid::new_v4())
    }

    /// Parse an identifier taken from a request path.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidId` when `value` is not a well-formed id.
    pub fn parse(value: &str) -> Result<Self, StoreError> {
        Uuid::parse_str(value)
            .map(DocumentId)
            .map_err(|_| StoreError::InvalidId {
                value: value.to_string(),
            })
    }
}

impl FromStr for DocumentId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentId::parse(s)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A document type that can be kept in a collection.
///
/// The JSON form of a document is its stored form: `_id` and `createdAt` are
/// assigned by the store, every other field comes from client payloads.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection name. Also the envelope key for lists of documents.
    const COLLECTION: &'static str;

    /// Envelope key for a single document.
    const SINGULAR: &'static str;

    /// Model name used in validation messages.
    const MODEL: &'static str;

    /// JSON keys that must be present and non-null before casting.
    const REQUIRED: &'static [&'static str];

    fn id(&self) -> DocumentId;

    /// Pre-save hook: trimming, derived fields.
    fn normalize(&mut self) {}

    /// Schema validators, run on create and on every update.
    fn validate(&self) -> Vec<ValidationError>;

    /// Field/value pairs that must be unique across the collection.
    fn unique_fields(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}
