//! Maintenance routes.

use axum::{Json, Router, extract::State, routing::post};
use ndiambour_core::catalog::ReconcileReport;
use tracing::info;

use crate::{AppState, error::ApiError};

/// Creates the maintenance routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/maintenance/reconcile", post(reconcile))
}

/// POST `/maintenance/reconcile`
///
/// Repairs drifted vehicle/image links and category counts.
async fn reconcile(State(state): State<AppState>) -> Result<Json<ReconcileReport>, ApiError> {
    let report = state.catalog.reconcile().await?;
    info!(clean = report.is_clean(), "Reconcile requested over API");
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use ndiambour_core::store::{DocumentStore, collections};
    use serde_json::json;

    use crate::test_support::TestApp;

    #[tokio::test]
    async fn test_reconcile_repairs_counts() {
        let app = TestApp::new().await;
        app.post("/api/v1/images", json!({ "category": "interiors" }))
            .await;
        app.store
            .update(
                collections::CATEGORIES,
                "interiors",
                json!({ "count": 7 }).as_object().cloned().unwrap(),
            )
            .await
            .unwrap();

        let (status, report) = app.post("/api/v1/maintenance/reconcile", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["countsCorrected"], json!(1));

        let (_, category) = app.get("/api/v1/categories/interiors").await;
        assert_eq!(category["count"], json!(1));
    }
}
