//! Vehicle routes, including gallery and link/unlink.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use ndiambour_core::catalog::{NewVehicle, ReleaseFailure, Vehicle, VehicleUpdate};
use ndiambour_shared::types::{ImageId, VehicleId};
use serde::Serialize;

use super::images::ImageResponse;
use super::parse_id;
use crate::{AppState, error::ApiError};

/// Creates the vehicle routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/vehicles", get(list_vehicles).post(create_vehicle))
        .route(
            "/vehicles/{id}",
            get(get_vehicle).patch(update_vehicle).delete(delete_vehicle),
        )
        .route("/vehicles/{id}/images", get(vehicle_gallery))
        .route(
            "/vehicles/{id}/images/{image_id}",
            put(link_image).delete(unlink_image),
        )
}

/// Response for a deleted vehicle.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDeletionResponse {
    /// Deleted vehicle ID.
    pub id: VehicleId,
    /// Images whose association was cleared.
    pub released: Vec<ImageId>,
    /// Images that kept a stale association.
    pub failures: Vec<ReleaseFailureResponse>,
}

/// An image that could not be released.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseFailureResponse {
    /// Image ID.
    pub image_id: ImageId,
    /// Failure message.
    pub error: String,
}

impl From<ReleaseFailure> for ReleaseFailureResponse {
    fn from(failure: ReleaseFailure) -> Self {
        Self {
            image_id: failure.image_id,
            error: failure.error,
        }
    }
}

/// GET `/vehicles`
async fn list_vehicles(State(state): State<AppState>) -> Result<Json<Vec<Vehicle>>, ApiError> {
    Ok(Json(state.catalog.list_vehicles().await?))
}

/// POST `/vehicles`
async fn create_vehicle(
    State(state): State<AppState>,
    Json(payload): Json<NewVehicle>,
) -> Result<impl IntoResponse, ApiError> {
    let vehicle = state.catalog.add_vehicle(payload).await?;
    Ok((StatusCode::CREATED, Json(vehicle)))
}

/// GET `/vehicles/{id}`
async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vehicle>, ApiError> {
    let id: VehicleId = parse_id(&id, "vehicle")?;
    state
        .catalog
        .get_vehicle(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("vehicle not found: {id}")))
}

/// PATCH `/vehicles/{id}`
async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<VehicleUpdate>,
) -> Result<Json<Vehicle>, ApiError> {
    let id: VehicleId = parse_id(&id, "vehicle")?;
    Ok(Json(state.catalog.update_vehicle(&id, payload).await?))
}

/// DELETE `/vehicles/{id}`
async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<VehicleDeletionResponse>, ApiError> {
    let id: VehicleId = parse_id(&id, "vehicle")?;
    let deletion = state.catalog.delete_vehicle(&id).await?;
    Ok(Json(VehicleDeletionResponse {
        id: deletion.vehicle.id,
        released: deletion.released,
        failures: deletion.failures.into_iter().map(Into::into).collect(),
    }))
}

/// GET `/vehicles/{id}/images`
async fn vehicle_gallery(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ImageResponse>>, ApiError> {
    let id: VehicleId = parse_id(&id, "vehicle")?;
    let gallery = state.catalog.vehicle_gallery(&id).await?;
    Ok(Json(
        gallery
            .into_iter()
            .map(|image| ImageResponse::new(image, &state.media))
            .collect(),
    ))
}

/// PUT `/vehicles/{id}/images/{image_id}`
async fn link_image(
    State(state): State<AppState>,
    Path((id, image_id)): Path<(String, String)>,
) -> Result<Json<ImageResponse>, ApiError> {
    let id: VehicleId = parse_id(&id, "vehicle")?;
    let image_id: ImageId = parse_id(&image_id, "image")?;
    let image = state.catalog.link_image(&image_id, &id).await?;
    Ok(Json(ImageResponse::new(image, &state.media)))
}

/// DELETE `/vehicles/{id}/images/{image_id}`
async fn unlink_image(
    State(state): State<AppState>,
    Path((id, image_id)): Path<(String, String)>,
) -> Result<Json<ImageResponse>, ApiError> {
    let id: VehicleId = parse_id(&id, "vehicle")?;
    let image_id: ImageId = parse_id(&image_id, "image")?;
    let image = state.catalog.unlink_image(&image_id, &id).await?;
    Ok(Json(ImageResponse::new(image, &state.media)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_support::TestApp;

    #[tokio::test]
    async fn test_vehicle_crud_and_link() {
        let app = TestApp::new().await;

        let (status, vehicle) = app
            .post("/api/v1/vehicles", json!({ "make": "Toyota", "model": "Corolla", "year": 2020, "price": 35000 }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(vehicle["images"], json!([]));
        assert_eq!(vehicle["price"], json!(35000));
        let id = vehicle["id"].as_str().unwrap().to_string();

        let (_, image) = app
            .post("/api/v1/images", json!({ "category": "vehicles" }))
            .await;
        let image_id = image["id"].as_str().unwrap().to_string();

        let (status, linked) = app
            .put(&format!("/api/v1/vehicles/{id}/images/{image_id}"))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(linked["vehicleName"], json!("Toyota Corolla 2020"));

        let (_, gallery) = app.get(&format!("/api/v1/vehicles/{id}/images")).await;
        assert_eq!(gallery.as_array().unwrap().len(), 1);

        let (status, deleted) = app.delete(&format!("/api/v1/vehicles/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["released"], json!([image_id]));

        let (status, body) = app.get(&format!("/api/v1/vehicles/{id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], json!("NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_create_vehicle_requires_model() {
        let app = TestApp::new().await;
        let (status, body) = app
            .post("/api/v1/vehicles", json!({ "make": "Toyota" }))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], json!("VALIDATION_ERROR"));
    }

    #[tokio::test]
    async fn test_update_vehicle_rejects_images_field() {
        let app = TestApp::new().await;
        let (_, vehicle) = app
            .post("/api/v1/vehicles", json!({ "make": "Kia", "model": "Picanto" }))
            .await;
        let id = vehicle["id"].as_str().unwrap();

        let (status, _) = app
            .patch(&format!("/api/v1/vehicles/{id}"), json!({ "images": ["x"] }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
