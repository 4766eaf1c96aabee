//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for the catalog, intake and settings
//! - JSON error responses
//! - Static serving of locally stored images

pub mod error;
pub mod routes;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use ndiambour_core::catalog::CatalogService;
use ndiambour_core::intake::IntakeService;
use ndiambour_core::media::MediaUrlBuilder;
use ndiambour_core::settings::SettingsService;
use ndiambour_core::storage::{StorageConfig, StorageProvider, StorageService};
use ndiambour_db::StoreBackend;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Catalog service over the configured backends.
pub type Catalog = CatalogService<StoreBackend, StorageService>;

/// Headroom allowed on top of the file size for multipart framing and fields.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Vehicles, images and categories.
    pub catalog: Catalog,
    /// Reservations and contact messages.
    pub intake: IntakeService<StoreBackend>,
    /// Site settings.
    pub settings: SettingsService<StoreBackend>,
    /// CDN URL builder for image responses.
    pub media: Arc<MediaUrlBuilder>,
}

impl AppState {
    /// Build the services over one store and one blob storage.
    #[must_use]
    pub fn new(store: Arc<StoreBackend>, storage: Arc<StorageService>, media: MediaUrlBuilder) -> Self {
        Self {
            catalog: CatalogService::new(Arc::clone(&store), storage),
            intake: IntakeService::new(Arc::clone(&store)),
            settings: SettingsService::new(store),
            media: Arc::new(media),
        }
    }

    fn storage_config(&self) -> &StorageConfig {
        self.catalog.blobs().config()
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    let storage = state.storage_config();
    let body_limit = storage.max_file_size.saturating_add(MULTIPART_OVERHEAD);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    let mut router = Router::new().nest("/api/v1", routes::api_routes());

    if let StorageProvider::LocalFs { root } = &storage.provider {
        router = router.nest_service(StorageConfig::LOCAL_PUBLIC_PREFIX, ServeDir::new(root));
    }

    router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
