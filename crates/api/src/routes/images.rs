//! Image routes: metadata CRUD, filtered listing and multipart upload.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use bytes::Bytes;
use ndiambour_core::catalog::{
    ALL_CATEGORIES, CategoryId, Cleanup, Image, ImageUpdate, NewImage, Upload, format_file_size,
};
use ndiambour_core::media::MediaUrlBuilder;
use ndiambour_shared::types::{ImageId, VehicleId};
use serde::{Deserialize, Serialize};

use super::parse_id;
use crate::{AppState, error::ApiError};

/// Creates the image routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/images", get(list_images).post(create_image))
        .route("/images/upload", post(upload_image))
        .route(
            "/images/{id}",
            get(get_image).patch(update_image).delete(delete_image),
        )
}

/// An image with the renditions a gallery needs.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    /// Stored image.
    #[serde(flatten)]
    pub image: Image,
    /// Card-sized rendition.
    pub display_url: String,
    /// Square thumbnail.
    pub thumbnail_url: String,
    /// Blurred placeholder for progressive loading.
    pub placeholder_url: String,
    /// Human-readable file size.
    pub size_label: String,
}

impl ImageResponse {
    /// Decorate an image with CDN renditions.
    #[must_use]
    pub fn new(image: Image, media: &MediaUrlBuilder) -> Self {
        let (width, height) = MediaUrlBuilder::THUMBNAIL_SIZE;
        Self {
            display_url: media.card(&image.src),
            thumbnail_url: media.thumbnail(&image.src, width, height),
            placeholder_url: media.low_quality(&image.src, MediaUrlBuilder::PLACEHOLDER_WIDTH),
            size_label: format_file_size(image.file.size),
            image,
        }
    }
}

/// Filters for `GET /images`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFilter {
    /// Category ID, or `all`.
    pub category: Option<String>,
    /// Owning vehicle.
    pub vehicle_id: Option<String>,
}

/// Response for a deleted image.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDeletionResponse {
    /// Deleted image ID.
    pub id: ImageId,
    /// Whether the stored file was removed.
    pub blob_removed: bool,
    /// Why the stored file could not be removed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob_error: Option<String>,
}

fn respond(images: Vec<Image>, media: &MediaUrlBuilder) -> Json<Vec<ImageResponse>> {
    Json(
        images
            .into_iter()
            .map(|image| ImageResponse::new(image, media))
            .collect(),
    )
}

/// GET `/images`
async fn list_images(
    State(state): State<AppState>,
    Query(filter): Query<ImageFilter>,
) -> Result<Json<Vec<ImageResponse>>, ApiError> {
    let images = match (filter.vehicle_id.as_deref(), filter.category.as_deref()) {
        (Some(vehicle_id), category) => {
            let vehicle_id: VehicleId = parse_id(vehicle_id, "vehicle")?;
            let mut images = state.catalog.images_by_vehicle(&vehicle_id).await?;
            if let Some(category) = category.filter(|c| *c != ALL_CATEGORIES) {
                images.retain(|image| image.category.as_str() == category);
            }
            images
        }
        (None, Some(category)) => state.catalog.images_by_category(category).await?,
        (None, None) => state.catalog.list_images().await?,
    };
    Ok(respond(images, &state.media))
}

/// POST `/images`
async fn create_image(
    State(state): State<AppState>,
    Json(payload): Json<NewImage>,
) -> Result<impl IntoResponse, ApiError> {
    let image = state.catalog.add_image(payload).await?;
    Ok((StatusCode::CREATED, Json(ImageResponse::new(image, &state.media))))
}

/// POST `/images/upload`
///
/// Multipart form with a `file` part and optional `category`, `vehicleId`,
/// `title`, `alt` and `description` text parts.
async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut upload: Option<Upload> = None;
    let mut input = NewImage::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes: Bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::validation(format!("failed to read file: {e}")))?;
            upload = Some(Upload {
                bytes,
                filename,
                content_type,
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::validation(format!("failed to read field {name}: {e}")))?;
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match name.as_str() {
            "category" => input.category = Some(CategoryId::new(value)),
            "vehicleId" => input.vehicle_id = Some(parse_id(value, "vehicle")?),
            "title" => input.title = Some(value.to_string()),
            "alt" => input.alt = Some(value.to_string()),
            "description" => input.description = Some(value.to_string()),
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| ApiError::validation("missing file part"))?;
    let image = state.catalog.upload_image(upload, input).await?;
    Ok((StatusCode::CREATED, Json(ImageResponse::new(image, &state.media))))
}

/// GET `/images/{id}`
async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ImageResponse>, ApiError> {
    let id: ImageId = parse_id(&id, "image")?;
    let image = state
        .catalog
        .get_image(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("image not found: {id}")))?;
    Ok(Json(ImageResponse::new(image, &state.media)))
}

/// PATCH `/images/{id}`
async fn update_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ImageUpdate>,
) -> Result<Json<ImageResponse>, ApiError> {
    let id: ImageId = parse_id(&id, "image")?;
    let image = state.catalog.update_image(&id, payload).await?;
    Ok(Json(ImageResponse::new(image, &state.media)))
}

/// DELETE `/images/{id}`
async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ImageDeletionResponse>, ApiError> {
    let id: ImageId = parse_id(&id, "image")?;
    let deletion = state.catalog.delete_image(&id).await?;
    let (blob_removed, blob_error) = match deletion.blob {
        Cleanup::Done => (true, None),
        Cleanup::Skipped => (false, None),
        Cleanup::Failed(error) => (false, Some(error)),
    };
    Ok(Json(ImageDeletionResponse {
        id: deletion.image.id,
        blob_removed,
        blob_error,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_support::{TestApp, multipart_body};

    #[tokio::test]
    async fn test_image_filters_and_renditions() {
        let app = TestApp::new().await;
        let src = "https://res.cloudinary.com/demo/image/upload/v1/car.jpg";
        app.post("/api/v1/images", json!({ "category": "interiors", "src": src }))
            .await;
        app.post("/api/v1/images", json!({ "category": "exteriors" }))
            .await;

        let (status, all) = app.get("/api/v1/images?category=all").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(all.as_array().unwrap().len(), 2);

        let (_, interiors) = app.get("/api/v1/images?category=interiors").await;
        let interiors = interiors.as_array().unwrap();
        assert_eq!(interiors.len(), 1);
        assert_eq!(
            interiors[0]["displayUrl"],
            json!("https://res.cloudinary.com/demo/image/upload/w_400,h_300,c_fill,g_auto,q_auto,f_auto/v1/car.jpg")
        );
        assert_eq!(interiors[0]["sizeLabel"], json!("Unknown"));
    }

    #[tokio::test]
    async fn test_unknown_category_is_rejected() {
        let app = TestApp::new().await;
        let (status, body) = app
            .post("/api/v1/images", json!({ "category": "boats" }))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], json!("VALIDATION_ERROR"));
    }

    #[tokio::test]
    async fn test_upload_then_delete() {
        let app = TestApp::new().await;
        let (_, vehicle) = app
            .post("/api/v1/vehicles", json!({ "make": "Peugeot", "model": "308" }))
            .await;
        let vehicle_id = vehicle["id"].as_str().unwrap();

        let (content_type, body) = multipart_body(
            &[("category", "vehicles"), ("vehicleId", vehicle_id), ("title", "Face avant")],
            "front.png",
            "image/png",
            b"\x89PNG fake bytes",
        );
        let (status, image) = app
            .post_raw("/api/v1/images/upload", &content_type, body)
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(image["vehicleId"], json!(vehicle_id));
        assert_eq!(image["vehicleName"], json!("Peugeot 308"));
        assert_eq!(image["file"]["contentType"], json!("image/png"));
        assert_eq!(image["sizeLabel"], json!("15 Bytes"));
        let image_id = image["id"].as_str().unwrap();
        assert!(image["src"].as_str().unwrap().ends_with("/front.png"));

        let (_, categories) = app.get("/api/v1/categories/vehicles").await;
        assert_eq!(categories["count"], json!(1));

        let (status, deleted) = app.delete(&format!("/api/v1/images/{image_id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["blobRemoved"], json!(true));

        let (_, vehicle) = app.get(&format!("/api/v1/vehicles/{vehicle_id}")).await;
        assert_eq!(vehicle["images"], json!([]));
    }

    #[tokio::test]
    async fn test_posted_storage_path_is_ignored() {
        let app = TestApp::new().await;
        let (content_type, body) = multipart_body(&[], "rear.png", "image/png", b"\x89PNG");
        let (_, uploaded) = app
            .post_raw("/api/v1/images/upload", &content_type, body)
            .await;
        let uploaded_id = uploaded["id"].as_str().unwrap();

        let (status, posted) = app
            .post(
                "/api/v1/images",
                json!({
                    "src": "https://example.com/rear.png",
                    "storagePath": uploaded["storagePath"],
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(posted["storagePath"].is_null());

        let (_, deleted) = app
            .delete(&format!("/api/v1/images/{}", posted["id"].as_str().unwrap()))
            .await;
        assert_eq!(deleted["blobRemoved"], json!(false));

        let (_, deleted) = app.delete(&format!("/api/v1/images/{uploaded_id}")).await;
        assert_eq!(deleted["blobRemoved"], json!(true));
    }

    #[tokio::test]
    async fn test_upload_rejects_non_image() {
        let app = TestApp::new().await;
        let (content_type, body) =
            multipart_body(&[], "notes.txt", "text/plain", b"hello");

        let (status, _) = app
            .post_raw("/api/v1/images/upload", &content_type, body)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, images) = app.get("/api/v1/images").await;
        assert_eq!(images, json!([]));
    }

    #[tokio::test]
    async fn test_patch_moves_image_between_vehicles() {
        let app = TestApp::new().await;
        let (_, first) = app
            .post("/api/v1/vehicles", json!({ "make": "Renault", "model": "Clio" }))
            .await;
        let (_, second) = app
            .post("/api/v1/vehicles", json!({ "make": "Dacia", "model": "Duster", "year": 2022 }))
            .await;
        let (_, image) = app
            .post("/api/v1/images", json!({ "vehicleId": first["id"] }))
            .await;
        let image_id = image["id"].as_str().unwrap();

        let (status, moved) = app
            .patch(
                &format!("/api/v1/images/{image_id}"),
                json!({ "vehicleId": second["id"], "category": "exteriors" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(moved["vehicleName"], json!("Dacia Duster 2022"));
        assert_eq!(moved["category"], json!("exteriors"));

        let (_, first) = app
            .get(&format!("/api/v1/vehicles/{}", first["id"].as_str().unwrap()))
            .await;
        assert_eq!(first["images"], json!([]));
    }
}
