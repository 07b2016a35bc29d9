//! Tests for domain error types

use super::*;

// ============================================================================
// ValidationError Tests
// ============================================================================

#[test]
fn test_validation_error_required() {
    let err = ValidationError::required("price");

    assert_eq!(err.to_string(), "Field 'price' is required");
}

#[test]
fn test_validation_error_too_long() {
    let err = ValidationError::too_long("name", 41, 40);

    assert_eq!(
        err.to_string(),
        "Field 'name' is too long: 41 characters (max: 40)"
    );

    match err {
        ValidationError::TooLong { field, actual, max } => {
            assert_eq!(field, "name");
            assert_eq!(actual, 41);
            assert_eq!(max, 40);
        }
        _ => panic!("Expected TooLong variant"),
    }
}

#[test]
fn test_validation_error_out_of_range() {
    let err = ValidationError::out_of_range("ratingsAverage", 6.0, 1.0, 5.0);

    assert_eq!(
        err.to_string(),
        "Field 'ratingsAverage' must be between 1 and 5, got 6"
    );
}

// ============================================================================
// StoreError Tests
// ============================================================================

#[test]
fn test_store_validation_error_joins_field_messages() {
    let err = StoreError::validation(
        "Tour",
        vec![
            ValidationError::required("name"),
            ValidationError::required("price"),
        ],
    );

    assert_eq!(
        err.to_string(),
        "Tour validation failed: Field 'name' is required, Field 'price' is required"
    );
}

#[test]
fn test_store_error_classification() {
    assert!(StoreError::InvalidId {
        value: "abc".to_string()
    }
    .is_operational());
    assert!(StoreError::Duplicate {
        field: "name".to_string(),
        value: "The Forest Hiker".to_string()
    }
    .is_operational());
    assert!(StoreError::from(QueryError::MixedProjection).is_operational());

    assert!(!StoreError::Unavailable {
        reason: "connection reset".to_string()
    }
    .is_operational());
    assert!(!StoreError::Serialization {
        reason: "bad float".to_string()
    }
    .is_operational());
}

#[test]
fn test_query_error_is_transparent_in_store_error() {
    let err = StoreError::from(QueryError::UnsupportedOperator {
        field: "price".to_string(),
        operator: "ne".to_string(),
    });

    assert_eq!(
        err.to_string(),
        "Unsupported query operator 'ne' on field 'price'"
    );
}

#[test]
fn test_invalid_id_message() {
    let err = StoreError::InvalidId {
        value: "12345".to_string(),
    };

    assert_eq!(
        err.to_string(),
        "Cast to DocumentId failed for value \"12345\""
    );
}
