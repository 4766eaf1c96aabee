//! Ndiambour catalog API server.
//!
//! Main entry point for the catalog backend service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ndiambour_api::{AppState, create_router};
use ndiambour_core::media::MediaUrlBuilder;
use ndiambour_core::storage::{StorageConfig, StorageService};
use ndiambour_db::StoreBackend;
use ndiambour_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ndiambour=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let store = StoreBackend::open(&config.store)
        .await
        .context("failed to open document store")?;
    info!(backend = store.kind(), "Document store ready");

    let storage_config =
        StorageConfig::from_settings(&config.blob).context("invalid blob configuration")?;
    let storage = StorageService::from_config(storage_config)
        .context("failed to initialize blob storage")?;
    info!(
        provider = storage.provider_name(),
        bucket = storage.bucket(),
        "Blob storage configured"
    );

    let state = AppState::new(
        Arc::new(store),
        Arc::new(storage),
        MediaUrlBuilder::new(config.media.cdn_host.clone()),
    );

    let seeded = state.catalog.init().await?;
    if state.settings.init().await? {
        info!("Site settings initialized");
    }
    info!(seeded, "Catalog initialized");

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
