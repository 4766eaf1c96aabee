//! Site settings routes.

use axum::{Json, Router, extract::State, routing::get};
use ndiambour_core::settings::SiteSettings;
use ndiambour_core::store::Document;

use crate::{AppState, error::ApiError};

/// Creates the settings routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/settings", get(get_settings).patch(update_settings))
}

async fn get_settings(State(state): State<AppState>) -> Result<Json<SiteSettings>, ApiError> {
    Ok(Json(state.settings.get().await?))
}

async fn update_settings(
    State(state): State<AppState>,
    Json(updates): Json<Document>,
) -> Result<Json<SiteSettings>, ApiError> {
    Ok(Json(state.settings.update(updates).await?))
}
