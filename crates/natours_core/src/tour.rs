//! Tour documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Document, DocumentId, ValidationError};

#[cfg(test)]
#[path = "tour_tests.rs"]
mod tests;

pub const NAME_MIN_LENGTH: usize = 10;
pub const NAME_MAX_LENGTH: usize = 40;
pub const DEFAULT_RATINGS_AVERAGE: f64 = 4.5;

/// How demanding a tour is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Difficult,
}

/// A bookable tour.
///
/// # Example
///
/// ```json
/// {
///   "_id": "0d6f3c1e-53b8-4a3c-9d2f-1f1d5d0c6e7a",
///   "name": "The Forest Hiker",
///   "slug": "the-forest-hiker",
///   "duration": 5,
///   "maxGroupSize": 25,
///   "difficulty": "easy",
///   "ratingsAverage": 4.7,
///   "ratingsQuantity": 37,
///   "price": 397,
///   "summary": "Breathtaking hike through the Canadian Banff National Park",
///   "images": [],
///   "startDates": [],
///   "secretTour": false,
///   "createdAt": "2026-10-19T10:30:00Z"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    #[serde(rename = "_id")]
    pub id: DocumentId,

    pub name: String,

    /// Derived from `name` on every save.
    #[serde(default)]
    pub slug: String,

    /// Length in days.
    pub duration: u32,

    pub max_group_size: u32,

    pub difficulty: Difficulty,

    #[serde(default = "default_ratings_average")]
    pub ratings_average: f64,

    #[serde(default)]
    pub ratings_quantity: u32,

    pub price: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_discount: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_cover: Option<String>,

    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default)]
    pub start_dates: Vec<DateTime<Utc>>,

    #[serde(default)]
    pub secret_tour: bool,

    pub created_at: DateTime<Utc>,
}

fn default_ratings_average() -> f64 {
    DEFAULT_RATINGS_AVERAGE
}

/// Lowercase, hyphen-separated form of a name, suitable for URLs.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn trim_optional(value: &mut Option<String>) {
    if let Some(text) = value {
        let trimmed = text.trim();
        if trimmed.len() != text.len() {
            *text = trimmed.to_string();
        }
    }
}

impl Document for Tour {
    const COLLECTION: &'static str = "tours";
    const SINGULAR: &'static str = "tour";
    const MODEL: &'static str = "Tour";
    const REQUIRED: &'static [&'static str] =
        &["name", "duration", "maxGroupSize", "difficulty", "price"];

    fn id(&self) -> DocumentId {
        self.id
    }

    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        trim_optional(&mut self.summary);
        trim_optional(&mut self.description);
        self.slug = slugify(&self.name);
    }

    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        let name_length = self.name.chars().count();
        if name_length > NAME_MAX_LENGTH {
            errors.push(ValidationError::too_long("name", name_length, NAME_MAX_LENGTH));
        } else if name_length < NAME_MIN_LENGTH {
            errors.push(ValidationError::too_short("name", name_length, NAME_MIN_LENGTH));
        }

        if self.duration == 0 {
            errors.push(ValidationError::invalid(
                "duration",
                "a tour must last at least one day",
            ));
        }

        if self.max_group_size == 0 {
            errors.push(ValidationError::invalid(
                "maxGroupSize",
                "a tour must accept at least one person",
            ));
        }

        if !(1.0..=5.0).contains(&self.ratings_average) {
            errors.push(ValidationError::out_of_range(
                "ratingsAverage",
                self.ratings_average,
                1.0,
                5.0,
            ));
        }

        if !self.price.is_finite() || self.price < 0.0 {
            errors.push(ValidationError::invalid(
                "price",
                "price must be a non-negative number",
            ));
        }

        if let Some(discount) = self.price_discount {
            if discount >= self.price {
                errors.push(ValidationError::invalid(
                    "priceDiscount",
                    format!("discount price ({discount}) should be below regular price"),
                ));
            }
        }

        errors
    }

    fn unique_fields(&self) -> Vec<(&'static str, String)> {
        vec![("name", self.name.clone())]
    }
}
