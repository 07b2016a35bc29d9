//! Review documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Document, DocumentId, ValidationError};

#[cfg(test)]
#[path = "review_tests.rs"]
mod tests;

/// A user's rating of a tour.
///
/// `tour` and `user` reference other documents by id; the references are
/// not checked against their collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: DocumentId,

    pub review: String,

    pub rating: f64,

    pub tour: DocumentId,

    pub user: DocumentId,

    pub created_at: DateTime<Utc>,
}

impl Document for Review {
    const COLLECTION: &'static str = "reviews";
    const SINGULAR: &'static str = "review";
    const MODEL: &'static str = "Review";
    const REQUIRED: &'static [&'static str] = &["review", "rating", "tour", "user"];

    fn id(&self) -> DocumentId {
        self.id
    }

    fn normalize(&mut self) {
        self.review = self.review.trim().to_string();
    }

    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.review.is_empty() {
            errors.push(ValidationError::required("review"));
        }

        if !(1.0..=5.0).contains(&self.rating) {
            errors.push(ValidationError::out_of_range("rating", self.rating, 1.0, 5.0));
        }

        errors
    }
}
