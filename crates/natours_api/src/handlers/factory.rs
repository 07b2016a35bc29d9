//! Generic CRUD handlers shared by every resource.
//!
//! Instantiated per document type, e.g. `get(factory::get_all::<Tour>)`.
//! Status codes and envelope labels follow the public API contract:
//!
//! | Operation | Success             | Failure             |
//! |-----------|---------------------|---------------------|
//! | list      | 200 `success`       | 400 `failed`        |
//! | get one   | 200 `success`       | 404 `failed`        |
//! | create    | 201 `success`       | 400 `fail`          |
//! | update    | 200 `SUCCESS`       | 404 `failed`        |
//! | delete    | 204 `success`       | 404 `failed`        |
//!
//! Internal store failures are always 500 `error`.

use axum::{
    extract::{rejection::JsonRejection, Path, RawQuery, State},
    http::StatusCode,
    Extension, Json,
};
use natours_core::{Document, ListQuery, Repository};
use serde_json::Value;
use std::sync::Arc;

use crate::{
    errors::{ApiError, STATUS_FAILED},
    handlers::RepositoryFor,
    middleware::RequestTime,
    models::{Envelope, STATUS_SUCCESS, STATUS_UPDATED},
    AppState,
};

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;

fn repository<T: Document>(state: &AppState) -> &Arc<dyn Repository<T>>
where
    AppState: RepositoryFor<T>,
{
    <AppState as RepositoryFor<T>>::repository(state)
}

fn not_found<T: Document>() -> ApiError {
    ApiError::not_found(format!("No {} found with that ID", T::SINGULAR)).with_label(STATUS_FAILED)
}

/// GET /api/v1/{collection}
///
/// Filter, sort, project and paginate the collection from the query string.
pub async fn get_all<T: Document>(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
    request_time: Option<Extension<RequestTime>>,
) -> Result<Json<Envelope>, ApiError>
where
    AppState: RepositoryFor<T>,
{
    let query = ListQuery::parse(raw.as_deref().unwrap_or_default())
        .map_err(|e| ApiError::bad_request(e.to_string()).with_label(STATUS_FAILED))?;

    let documents = repository::<T>(&state)
        .find(&query)
        .await
        .map_err(|e| ApiError::from_store(e, StatusCode::BAD_REQUEST).with_label(STATUS_FAILED))?;

    let documents = documents
        .iter()
        .map(|document| serde_json::to_value(document).map(|v| query.projection.apply(v)))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        collection = T::COLLECTION,
        results = documents.len(),
        requested_at = ?request_time.map(|Extension(RequestTime(time))| time),
        "Listed documents"
    );

    Ok(Json(Envelope::list(T::COLLECTION, documents)))
}

/// GET /api/v1/{collection}/:id
///
/// An absent document is reported as `null`, not as an error.
pub async fn get_one<T: Document>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope>, ApiError>
where
    AppState: RepositoryFor<T>,
{
    let document = repository::<T>(&state)
        .find_by_id(&id)
        .await
        .map_err(|e| ApiError::from_store(e, StatusCode::NOT_FOUND).with_label(STATUS_FAILED))?;

    let document = document.map(|d| serde_json::to_value(&d)).transpose()?;

    Ok(Json(Envelope::single(STATUS_SUCCESS, T::SINGULAR, document)))
}

/// POST /api/v1/{collection}
pub async fn create_one<T: Document>(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope>), ApiError>
where
    AppState: RepositoryFor<T>,
{
    let Json(fields) = body.map_err(ApiError::from_json_rejection)?;

    let document = repository::<T>(&state)
        .create(fields)
        .await
        .map_err(|e| ApiError::from_store(e, StatusCode::BAD_REQUEST))?;

    tracing::info!(
        collection = T::COLLECTION,
        id = %document.id(),
        "Document created"
    );

    Ok((
        StatusCode::CREATED,
        Json(Envelope::single(
            STATUS_SUCCESS,
            T::SINGULAR,
            Some(serde_json::to_value(&document)?),
        )),
    ))
}

/// PATCH /api/v1/{collection}/:id
///
/// Merges the body into the stored document and returns the result.
pub async fn update_one<T: Document>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Envelope>, ApiError>
where
    AppState: RepositoryFor<T>,
{
    let Json(patch) = body.map_err(ApiError::from_json_rejection)?;

    let document = repository::<T>(&state)
        .find_by_id_and_update(&id, patch)
        .await
        .map_err(|e| ApiError::from_store(e, StatusCode::NOT_FOUND).with_label(STATUS_FAILED))?
        .ok_or_else(not_found::<T>)?;

    tracing::info!(collection = T::COLLECTION, id = %id, "Document updated");

    Ok(Json(Envelope::single(
        STATUS_UPDATED,
        T::SINGULAR,
        Some(serde_json::to_value(&document)?),
    )))
}

/// DELETE /api/v1/{collection}/:id
pub async fn delete_one<T: Document>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<Envelope>), ApiError>
where
    AppState: RepositoryFor<T>,
{
    repository::<T>(&state)
        .find_by_id_and_delete(&id)
        .await
        .map_err(|e| ApiError::from_store(e, StatusCode::NOT_FOUND).with_label(STATUS_FAILED))?
        .ok_or_else(not_found::<T>)?;

    tracing::info!(collection = T::COLLECTION, id = %id, "Document deleted");

    Ok((StatusCode::NO_CONTENT, Json(Envelope::deleted(&id))))
}
