//! Copies a local catalog file into the Postgres document store.
//!
//! The source defaults to `store.local_path` and may be given as the first
//! argument. The target is `store.database_url`; its schema is migrated
//! before copying. Existing documents in the target are kept.
//!
//! Usage: catalog-copy [path/to/catalog.json]

use std::path::PathBuf;

use anyhow::{Context, bail};
use ndiambour_core::store::collections;
use ndiambour_db::migration::Migrator;
use ndiambour_db::{LocalStore, PgDocumentStore, connect_with, copy_collections};
use ndiambour_shared::AppConfig;
use sea_orm_migration::MigratorTrait;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ndiambour=info,catalog_copy=info".into()),
        )
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let source_path = std::env::args()
        .nth(1)
        .map_or_else(|| config.store.local_path.clone(), PathBuf::from);
    if !source_path.exists() {
        bail!("source catalog {} does not exist", source_path.display());
    }

    let source = LocalStore::open(&source_path)
        .await
        .with_context(|| format!("failed to read {}", source_path.display()))?;

    let db = connect_with(&config.store)
        .await
        .context("failed to connect to the document database")?;
    Migrator::up(&db, None).await.context("migration failed")?;
    let target = PgDocumentStore::new(db);

    let report = copy_collections(&source, &target, &collections::ALL).await?;
    for collection in &report.collections {
        info!(
            collection = %collection.collection,
            copied = collection.copied,
            skipped = collection.skipped,
            "Collection copied"
        );
    }
    info!(
        copied = report.copied(),
        skipped = report.skipped(),
        source = %source_path.display(),
        "Copy complete"
    );
    Ok(())
}
