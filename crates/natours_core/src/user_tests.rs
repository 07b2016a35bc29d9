use super::*;
use serde_json::json;

fn sample_user() -> User {
    serde_json::from_value(json!({
        "_id": DocumentId::generate(),
        "name": "Leo Gillespie",
        "email": "leo@example.io",
        "createdAt": "2026-10-19T10:30:00Z"
    }))
    .unwrap()
}

#[test]
fn test_defaults() {
    let user = sample_user();

    assert_eq!(user.role, Role::User);
    assert!(user.active);
    assert!(user.photo.is_none());
}

#[test]
fn test_role_uses_kebab_case() {
    assert_eq!(serde_json::to_value(Role::LeadGuide).unwrap(), json!("lead-guide"));
    assert_eq!(
        serde_json::from_value::<Role>(json!("admin")).unwrap(),
        Role::Admin
    );
}

#[test]
fn test_normalize_lowercases_email() {
    let mut user = sample_user();
    user.email = "  Leo@Example.IO ".to_string();

    user.normalize();

    assert_eq!(user.email, "leo@example.io");
    assert_eq!(user.unique_fields(), vec![("email", "leo@example.io".to_string())]);
}

#[test]
fn test_invalid_email_rejected() {
    let mut user = sample_user();
    user.email = "not-an-email".to_string();

    let errors = user.validate();
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], ValidationError::Invalid { field, .. } if field == "email"));
}

#[test]
fn test_blank_name_rejected_after_normalize() {
    let mut user = sample_user();
    user.name = "   ".to_string();
    user.normalize();

    assert_eq!(user.validate(), vec![ValidationError::required("name")]);
}
