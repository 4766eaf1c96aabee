//! Reservation and contact form routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use ndiambour_core::intake::{
    ContactMessage, ContactRequest, Reservation, ReservationRequest,
};
use serde_json::json;

use crate::{AppState, error::ApiError};

/// Confirmation shown to visitors after a contact form submission.
const CONTACT_ACK: &str = "Message reçu avec succès !";

/// Creates the intake routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reservations", get(list_reservations).post(submit_reservation))
        .route("/contact", get(list_messages).post(submit_message))
}

async fn submit_reservation(
    State(state): State<AppState>,
    Json(payload): Json<ReservationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let reservation = state.intake.submit_reservation(payload).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

async fn list_reservations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Reservation>>, ApiError> {
    Ok(Json(state.intake.list_reservations().await?))
}

async fn submit_message(
    State(state): State<AppState>,
    Json(payload): Json<ContactRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state.intake.submit_message(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": CONTACT_ACK,
            "id": message.id,
        })),
    ))
}

async fn list_messages(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContactMessage>>, ApiError> {
    Ok(Json(state.intake.list_messages().await?))
}
