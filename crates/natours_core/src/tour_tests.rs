//! Tests for tour documents

use super::*;
use serde_json::json;

fn sample_tour() -> Tour {
    serde_json::from_value(json!({
        "_id": DocumentId::generate(),
        "name": "The Forest Hiker",
        "duration": 5,
        "maxGroupSize": 25,
        "difficulty": "easy",
        "price": 397,
        "createdAt": "2026-10-19T10:30:00Z"
    }))
    .unwrap()
}

#[test]
fn test_defaults_applied_on_deserialize() {
    let tour = sample_tour();

    assert_eq!(tour.ratings_average, DEFAULT_RATINGS_AVERAGE);
    assert_eq!(tour.ratings_quantity, 0);
    assert!(!tour.secret_tour);
    assert!(tour.images.is_empty());
    assert!(tour.price_discount.is_none());
}

#[test]
fn test_serializes_camel_case_with_underscore_id() {
    let tour = sample_tour();
    let value = serde_json::to_value(&tour).unwrap();

    assert_eq!(value["_id"], json!(tour.id.to_string()));
    assert_eq!(value["maxGroupSize"], json!(25));
    assert_eq!(value["difficulty"], json!("easy"));
    assert!(value.get("priceDiscount").is_none());
}

#[test]
fn test_normalize_trims_and_derives_slug() {
    let mut tour = sample_tour();
    tour.name = "  The Sea Explorer ".to_string();
    tour.summary = Some(" Exploring the jaw-dropping US east coast ".to_string());

    tour.normalize();

    assert_eq!(tour.name, "The Sea Explorer");
    assert_eq!(tour.slug, "the-sea-explorer");
    assert_eq!(
        tour.summary.as_deref(),
        Some("Exploring the jaw-dropping US east coast")
    );
}

#[test]
fn test_slugify_collapses_separators() {
    assert_eq!(slugify("The Snow  Adventurer!"), "the-snow-adventurer");
    assert_eq!(slugify("--Wine & Dine--"), "wine-dine");
}

#[test]
fn test_valid_tour_has_no_errors() {
    assert!(sample_tour().validate().is_empty());
}

#[test]
fn test_name_length_limits() {
    let mut tour = sample_tour();
    tour.name = "Short".to_string();
    assert_eq!(
        tour.validate(),
        vec![ValidationError::too_short("name", 5, NAME_MIN_LENGTH)]
    );

    tour.name = "A".repeat(41);
    assert_eq!(
        tour.validate(),
        vec![ValidationError::too_long("name", 41, NAME_MAX_LENGTH)]
    );
}

#[test]
fn test_ratings_average_range() {
    let mut tour = sample_tour();
    tour.ratings_average = 5.5;

    let errors = tour.validate();
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        ValidationError::OutOfRange { field, .. } if field == "ratingsAverage"
    ));
}

#[test]
fn test_price_discount_must_be_below_price() {
    let mut tour = sample_tour();
    tour.price_discount = Some(500.0);

    let errors = tour.validate();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].to_string().contains("priceDiscount"));

    tour.price_discount = Some(100.0);
    assert!(tour.validate().is_empty());
}

#[test]
fn test_zero_duration_and_group_size_rejected() {
    let mut tour = sample_tour();
    tour.duration = 0;
    tour.max_group_size = 0;

    assert_eq!(tour.validate().len(), 2);
}

#[test]
fn test_unknown_difficulty_fails_to_cast() {
    let result = serde_json::from_value::<Tour>(json!({
        "_id": DocumentId::generate(),
        "name": "The Forest Hiker",
        "duration": 5,
        "maxGroupSize": 25,
        "difficulty": "extreme",
        "price": 397,
        "createdAt": "2026-10-19T10:30:00Z"
    }));

    assert!(result.is_err());
}

#[test]
fn test_name_is_unique_field() {
    let tour = sample_tour();

    assert_eq!(
        tour.unique_fields(),
        vec![("name", "The Forest Hiker".to_string())]
    );
}
