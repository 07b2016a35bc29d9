//! Tests for the generic resource handlers
//!
//! These call the handlers directly; routing and middleware are covered in
//! `routes_tests.rs`.

use super::*;
use crate::ApiConfig;
use natours_core::{Review, Tour, User};
use serde_json::json;

fn state() -> AppState {
    AppState::new(ApiConfig::default()).expect("State should build")
}

fn forest_hiker() -> Value {
    json!({
        "name": "The Forest Hiker",
        "duration": 5,
        "maxGroupSize": 25,
        "difficulty": "easy",
        "price": 397,
        "summary": "Breathtaking hike through the Canadian Banff National Park"
    })
}

async fn create_tour(state: &AppState, fields: Value) -> Value {
    let (status, Json(envelope)) = create_one::<Tour>(State(state.clone()), Ok(Json(fields)))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    envelope.data["tour"].clone()
}

#[tokio::test]
async fn test_create_returns_created_document() {
    let state = state();

    let tour = create_tour(&state, forest_hiker()).await;

    assert_eq!(tour["name"], "The Forest Hiker");
    assert_eq!(tour["slug"], "the-forest-hiker");
    assert_eq!(tour["price"].as_f64(), Some(397.0));
    assert!(tour["_id"].is_string());
}

#[tokio::test]
async fn test_create_invalid_document_is_400_fail() {
    let err = create_one::<Tour>(State(state()), Ok(Json(json!({ "name": "Too short" }))))
        .await
        .unwrap_err();

    let (status, response) = err.to_response_parts();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response.status, "fail");
    assert!(response.message.starts_with("Tour validation failed"));
}

#[tokio::test]
async fn test_get_all_applies_query() {
    let state = state();
    create_tour(&state, forest_hiker()).await;
    let mut expensive = forest_hiker();
    expensive["name"] = json!("The Sea Explorer Deluxe");
    expensive["price"] = json!(1497);
    create_tour(&state, expensive).await;

    let Json(envelope) = get_all::<Tour>(
        State(state),
        RawQuery(Some("price[gte]=1000&fields=name".to_string())),
        None,
    )
    .await
    .unwrap();

    assert_eq!(envelope.results, Some(1));
    let tours = envelope.data["tours"].as_array().unwrap();
    assert_eq!(tours[0]["name"], "The Sea Explorer Deluxe");
    assert!(tours[0].get("price").is_none());
}

#[tokio::test]
async fn test_get_all_rejects_unknown_operator() {
    let err = get_all::<Tour>(
        State(state()),
        RawQuery(Some("price[ne]=5".to_string())),
        None,
    )
    .await
    .unwrap_err();

    let (status, response) = err.to_response_parts();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response.status, "failed");
}

#[tokio::test]
async fn test_get_one_absent_is_null() {
    let Json(envelope) = get_one::<Tour>(
        State(state()),
        Path("6d1f4b5e-8c1a-4c0b-9a53-1f2d3c4b5a69".to_string()),
    )
    .await
    .unwrap();

    assert_eq!(envelope.status, "success");
    assert!(envelope.data["tour"].is_null());
}

#[tokio::test]
async fn test_get_one_malformed_id_is_404_failed() {
    let err = get_one::<User>(State(state()), Path("not-an-id".to_string()))
        .await
        .unwrap_err();

    let (status, response) = err.to_response_parts();
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response.status, "failed");
}

#[tokio::test]
async fn test_update_returns_updated_document() {
    let state = state();
    let tour = create_tour(&state, forest_hiker()).await;
    let id = tour["_id"].as_str().unwrap().to_string();

    let Json(envelope) = update_one::<Tour>(
        State(state),
        Path(id),
        Ok(Json(json!({ "price": 450 }))),
    )
    .await
    .unwrap();

    assert_eq!(envelope.status, "SUCCESS");
    assert_eq!(envelope.data["tour"]["price"].as_f64(), Some(450.0));
    assert_eq!(envelope.data["tour"]["name"], "The Forest Hiker");
}

#[tokio::test]
async fn test_update_absent_is_404() {
    let err = update_one::<Review>(
        State(state()),
        Path("6d1f4b5e-8c1a-4c0b-9a53-1f2d3c4b5a69".to_string()),
        Ok(Json(json!({ "rating": 4 }))),
    )
    .await
    .unwrap_err();

    let (status, response) = err.to_response_parts();
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response.status, "failed");
    assert_eq!(response.message, "No review found with that ID");
}

#[tokio::test]
async fn test_delete_then_get_returns_null() {
    let state = state();
    let tour = create_tour(&state, forest_hiker()).await;
    let id = tour["_id"].as_str().unwrap().to_string();

    let (status, Json(envelope)) = delete_one::<Tour>(State(state.clone()), Path(id.clone()))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(
        envelope.message.as_deref(),
        Some(format!("{id} document has been deleted!").as_str())
    );

    let Json(envelope) = get_one::<Tour>(State(state), Path(id)).await.unwrap();
    assert!(envelope.data["tour"].is_null());
}

#[tokio::test]
async fn test_delete_absent_is_404() {
    let err = delete_one::<Tour>(
        State(state()),
        Path("6d1f4b5e-8c1a-4c0b-9a53-1f2d3c4b5a69".to_string()),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}
