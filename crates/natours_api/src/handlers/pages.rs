//! Handlers for the server-rendered pages.

use axum::{extract::State, http::StatusCode, response::Html};
use natours_core::{ListQuery, Repository, Tour};
use serde::Serialize;

use crate::{errors::ApiError, AppState};

#[cfg(test)]
#[path = "pages_tests.rs"]
mod tests;

/// Values available to every page template.
#[derive(Debug, Serialize)]
struct PageContext<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tours: Option<Vec<Tour>>,
}

impl<'a> PageContext<'a> {
    fn titled(title: &'a str) -> Self {
        Self {
            title,
            user: None,
            tours: None,
        }
    }
}

fn render(state: &AppState, page: &str, context: &PageContext<'_>) -> Result<Html<String>, ApiError> {
    Ok(Html(state.views.render(page, context)?))
}

/// GET /
pub async fn base(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let context = PageContext {
        user: Some("Iqbal"),
        ..PageContext::titled("Exciting tours for adventurous people")
    };

    render(&state, "base", &context)
}

/// GET /overview
pub async fn overview(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let tours = state
        .tours
        .find(&ListQuery::default())
        .await
        .map_err(|e| ApiError::from_store(e, StatusCode::INTERNAL_SERVER_ERROR))?;

    let context = PageContext {
        tours: Some(tours),
        ..PageContext::titled("All Tours")
    };

    render(&state, "overview", &context)
}

/// GET /tour
pub async fn tour(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    render(&state, "tour", &PageContext::titled("The Forest Hiker"))
}
