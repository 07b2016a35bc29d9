//! Document repositories.
//!
//! [`Repository`] is the contract the HTTP layer programs against. Its
//! operations mirror a document database: find by filter, find by id, create,
//! find-and-update and find-and-delete. Lookups by id that find nothing return
//! `Ok(None)`; deciding whether that is an error is left to the caller.
//!
//! [`InMemoryRepository`] keeps one collection in process memory. Every
//! single-document operation runs under one write lock, so it is atomic with
//! respect to concurrent requests.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::{
    query::compare_documents, Document, DocumentId, ListQuery, StoreError, StoreResult,
    ValidationError,
};

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

/// Keys owned by the store; client payloads cannot set or change them.
const MANAGED_KEYS: &[&str] = &["_id", "createdAt"];

/// Persistence operations for one collection of `T`.
///
/// Implementations must be `Send + Sync` so that a single instance can be
/// shared by every request handler.
#[async_trait]
pub trait Repository<T: Document>: Send + Sync {
    /// All documents matching the query filter, sorted and paginated.
    async fn find(&self, query: &ListQuery) -> StoreResult<Vec<T>>;

    /// # Errors
    ///
    /// Returns `StoreError::InvalidId` if `id` is malformed.
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<T>>;

    /// Create a document from client supplied fields.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` if the fields do not satisfy the
    /// schema and `StoreError::Duplicate` if a unique field is taken.
    async fn create(&self, fields: Value) -> StoreResult<T>;

    /// Apply a partial update and return the updated document.
    ///
    /// Validators run against the merged document.
    async fn find_by_id_and_update(&self, id: &str, patch: Value) -> StoreResult<Option<T>>;

    /// Remove a document and return it.
    async fn find_by_id_and_delete(&self, id: &str) -> StoreResult<Option<T>>;
}

/// In-process collection, in insertion order.
pub struct InMemoryRepository<T> {
    documents: RwLock<Vec<T>>,
}

impl<T: Document> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self::with_documents(Vec::new())
    }

    /// Create a repository pre-populated with documents.
    pub fn with_documents(documents: Vec<T>) -> Self {
        Self {
            documents: RwLock::new(documents),
        }
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

impl<T: Document> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Document> Repository<T> for InMemoryRepository<T> {
    async fn find(&self, query: &ListQuery) -> StoreResult<Vec<T>> {
        let documents = self.documents.read().await;

        let mut matches = Vec::new();
        for document in documents.iter() {
            let value = serde_json::to_value(document)?;
            if query.filter.matches(&value)? {
                matches.push((value, document));
            }
        }

        if !query.sort.is_empty() {
            matches.sort_by(|(a, _), (b, _)| compare_documents(&query.sort, a, b));
        }

        let (skip, take) = match query.pagination {
            Some(pagination) => (pagination.skip(), pagination.limit),
            None => (0, usize::MAX),
        };

        Ok(matches
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|(_, document)| document.clone())
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<T>> {
        let id = DocumentId::parse(id)?;
        let documents = self.documents.read().await;

        Ok(documents.iter().find(|d| d.id() == id).cloned())
    }

    async fn create(&self, fields: Value) -> StoreResult<T> {
        let mut fields = into_object::<T>(fields)?;
        fields.insert(
            "_id".to_string(),
            serde_json::to_value(DocumentId::generate())?,
        );
        fields.insert("createdAt".to_string(), serde_json::to_value(Utc::now())?);

        let document = build_document::<T>(fields)?;

        let mut documents = self.documents.write().await;
        ensure_unique(&document, documents.iter())?;
        documents.push(document.clone());

        tracing::debug!(
            collection = T::COLLECTION,
            id = %document.id(),
            "Document created"
        );

        Ok(document)
    }

    async fn find_by_id_and_update(&self, id: &str, patch: Value) -> StoreResult<Option<T>> {
        let id = DocumentId::parse(id)?;
        let patch = into_object::<T>(patch)?;

        let mut documents = self.documents.write().await;
        let Some(position) = documents.iter().position(|d| d.id() == id) else {
            return Ok(None);
        };

        let Value::Object(mut fields) = serde_json::to_value(&documents[position])? else {
            return Err(StoreError::Serialization {
                reason: format!("{} document is not a JSON object", T::MODEL),
            });
        };
        for (key, value) in patch {
            if !MANAGED_KEYS.contains(&key.as_str()) {
                fields.insert(key, value);
            }
        }

        let updated = build_document::<T>(fields)?;
        ensure_unique(
            &updated,
            documents
                .iter()
                .enumerate()
                .filter(|(index, _)| *index != position)
                .map(|(_, document)| document),
        )?;
        documents[position] = updated.clone();

        tracing::debug!(collection = T::COLLECTION, id = %id, "Document updated");

        Ok(Some(updated))
    }

    async fn find_by_id_and_delete(&self, id: &str) -> StoreResult<Option<T>> {
        let id = DocumentId::parse(id)?;

        let mut documents = self.documents.write().await;
        let removed = documents
            .iter()
            .position(|d| d.id() == id)
            .map(|position| documents.remove(position));

        if removed.is_some() {
            tracing::debug!(collection = T::COLLECTION, id = %id, "Document deleted");
        }

        Ok(removed)
    }
}

fn into_object<T: Document>(fields: Value) -> StoreResult<Map<String, Value>> {
    match fields {
        Value::Object(fields) => Ok(fields),
        other => Err(StoreError::validation(
            T::MODEL,
            vec![ValidationError::Cast {
                reason: format!("expected a JSON object, got {}", json_type(&other)),
            }],
        )),
    }
}

/// Cast raw fields to `T`, then run the pre-save hook and validators.
fn build_document<T: Document>(fields: Map<String, Value>) -> StoreResult<T> {
    let missing: Vec<ValidationError> = T::REQUIRED
        .iter()
        .filter(|key| fields.get(**key).map_or(true, Value::is_null))
        .map(|key| ValidationError::required(*key))
        .collect();
    if !missing.is_empty() {
        return Err(StoreError::validation(T::MODEL, missing));
    }

    let mut document: T = serde_json::from_value(Value::Object(fields)).map_err(|e| {
        StoreError::validation(
            T::MODEL,
            vec![ValidationError::Cast {
                reason: e.to_string(),
            }],
        )
    })?;

    document.normalize();

    let errors = document.validate();
    if !errors.is_empty() {
        return Err(StoreError::validation(T::MODEL, errors));
    }

    Ok(document)
}

fn ensure_unique<'a, T: Document>(
    candidate: &T,
    others: impl Iterator<Item = &'a T>,
) -> StoreResult<()> {
    let unique = candidate.unique_fields();
    if unique.is_empty() {
        return Ok(());
    }

    for other in others {
        for (field, value) in other.unique_fields() {
            if unique.iter().any(|(f, v)| *f == field && *v == value) {
                return Err(StoreError::Duplicate {
                    field: field.to_string(),
                    value,
                });
            }
        }
    }

    Ok(())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
