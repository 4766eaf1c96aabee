//! Category routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use ndiambour_core::catalog::{Category, CategoryId};

use crate::{AppState, error::ApiError};

/// Creates the category routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{id}", get(get_category))
}

async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.catalog.list_categories().await?))
}

async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<Category>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state.catalog.add_category(payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Category>, ApiError> {
    let id = CategoryId::new(id);
    state
        .catalog
        .get_category(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("category not found: {id}")))
}
