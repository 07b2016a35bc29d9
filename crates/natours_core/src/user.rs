//! User documents.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::{Document, DocumentId, ValidationError};

#[cfg(test)]
#[path = "user_tests.rs"]
mod tests;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

/// Access level of a user account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    #[default]
    User,
    Guide,
    LeadGuide,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: DocumentId,

    pub name: String,

    /// Stored lowercased.
    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,

    #[serde(default)]
    pub role: Role,

    #[serde(default = "default_active")]
    pub active: bool,

    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Document for User {
    const COLLECTION: &'static str = "users";
    const SINGULAR: &'static str = "user";
    const MODEL: &'static str = "User";
    const REQUIRED: &'static [&'static str] = &["name", "email"];

    fn id(&self) -> DocumentId {
        self.id
    }

    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_lowercase();
    }

    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.name.is_empty() {
            errors.push(ValidationError::required("name"));
        }

        if !EMAIL_PATTERN.is_match(&self.email) {
            errors.push(ValidationError::invalid(
                "email",
                format!("'{}' is not a valid email address", self.email),
            ));
        }

        errors
    }

    fn unique_fields(&self) -> Vec<(&'static str, String)> {
        vec![("email", self.email.clone())]
    }
}
