//! API route definitions.

use std::str::FromStr;

use axum::Router;

use crate::{AppState, error::ApiError};

pub mod categories;
pub mod health;
pub mod images;
pub mod intake;
pub mod maintenance;
pub mod settings;
pub mod vehicles;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(vehicles::routes())
        .merge(images::routes())
        .merge(categories::routes())
        .merge(intake::routes())
        .merge(settings::routes())
        .merge(maintenance::routes())
}

/// Parse a path identifier, rejecting blank values.
pub(crate) fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::validation(format!("invalid {what} id")))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use rstest::rstest;
    use serde_json::json;

    use crate::test_support::TestApp;

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::new().await;
        let (status, body) = app.get("/api/v1/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], json!("ok"));
        assert_eq!(body["store"], json!("local"));
        assert_eq!(body["blobs"], json!("memory"));
    }

    #[rstest]
    #[case("/api/v1/vehicles/%20")]
    #[case("/api/v1/images/%20")]
    #[case("/api/v1/vehicles/%20/images")]
    #[tokio::test]
    async fn test_blank_ids_are_rejected(#[case] uri: &str) {
        let app = TestApp::new().await;
        let (status, body) = app.get(uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], json!("VALIDATION_ERROR"));
    }

    #[rstest]
    #[case("/api/v1/vehicles/missing")]
    #[case("/api/v1/images/missing")]
    #[tokio::test]
    async fn test_missing_entities_are_not_found(#[case] uri: &str) {
        let app = TestApp::new().await;
        let (status, _) = app.get(uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
