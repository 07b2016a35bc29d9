//! Tests for response models

use super::*;
use serde_json::json;

#[test]
fn test_list_envelope_serialization() {
    let envelope = Envelope::list("tours", vec![json!({ "name": "The Forest Hiker" })]);

    let json = serde_json::to_value(&envelope).unwrap();
    assert_eq!(
        json,
        json!({
            "status": "success",
            "results": 1,
            "data": { "tours": [{ "name": "The Forest Hiker" }] }
        })
    );
}

#[test]
fn test_empty_list_reports_zero_results() {
    let json = serde_json::to_value(Envelope::list("reviews", Vec::new())).unwrap();

    assert_eq!(json["results"], 0);
    assert_eq!(json["data"]["reviews"], json!([]));
}

#[test]
fn test_single_envelope_with_missing_document() {
    let json = serde_json::to_value(Envelope::single(STATUS_SUCCESS, "tour", None)).unwrap();

    assert_eq!(json, json!({ "status": "success", "data": { "tour": null } }));
}

#[test]
fn test_update_envelope_label() {
    let envelope = Envelope::single(STATUS_UPDATED, "user", Some(json!({ "name": "Ann" })));

    let json = serde_json::to_string(&envelope).unwrap();
    assert!(json.contains("\"status\":\"SUCCESS\""));
    assert!(!json.contains("\"results\""));
}

#[test]
fn test_deleted_envelope_keeps_null_data() {
    let json = serde_json::to_value(Envelope::deleted("abc")).unwrap();

    assert_eq!(
        json,
        json!({
            "status": "success",
            "message": "abc document has been deleted!",
            "data": null
        })
    );
}
