//! Runtime choice of document store.

use ndiambour_core::store::{Document, DocumentStore, StoreError};
use ndiambour_shared::config::{StoreBackendKind, StoreConfig};
use serde_json::Value;
use tracing::info;

use super::{LocalStore, PgDocumentStore};

/// The configured document store.
///
/// Only the storage primitives differ between variants; everything above
/// [`DocumentStore`] is shared.
#[derive(Debug)]
pub enum StoreBackend {
    /// Local JSON file or in-memory store.
    Local(LocalStore),
    /// PostgreSQL `jsonb` document store.
    Postgres(PgDocumentStore),
}

impl StoreBackend {
    /// Open the backend named by the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the local file cannot be loaded or the database
    /// cannot be reached.
    pub async fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        match config.backend {
            StoreBackendKind::Local => {
                let store = LocalStore::open(&config.local_path).await?;
                Ok(Self::Local(store))
            }
            StoreBackendKind::Postgres => {
                let db = crate::connect_with(config)
                    .await
                    .map_err(|e| StoreError::backend(e.to_string()))?;
                info!("Connected to document database");
                Ok(Self::Postgres(PgDocumentStore::new(db)))
            }
        }
    }

    /// Short name of the backend, for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Local(_) => "local",
            Self::Postgres(_) => "postgres",
        }
    }
}

impl DocumentStore for StoreBackend {
    async fn create(&self, collection: &str, doc: Document) -> Result<String, StoreError> {
        match self {
            Self::Local(store) => store.create(collection, doc).await,
            Self::Postgres(store) => store.create(collection, doc).await,
        }
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        match self {
            Self::Local(store) => store.get_by_id(collection, id).await,
            Self::Postgres(store) => store.get_by_id(collection, id).await,
        }
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        match self {
            Self::Local(store) => store.get_all(collection).await,
            Self::Postgres(store) => store.get_all(collection).await,
        }
    }

    async fn query_equals(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        match self {
            Self::Local(store) => store.query_equals(collection, field, value).await,
            Self::Postgres(store) => store.query_equals(collection, field, value).await,
        }
    }

    async fn update(&self, collection: &str, id: &str, patch: Document) -> Result<(), StoreError> {
        match self {
            Self::Local(store) => store.update(collection, id, patch).await,
            Self::Postgres(store) => store.update(collection, id, patch).await,
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        match self {
            Self::Local(store) => store.delete(collection, id).await,
            Self::Postgres(store) => store.delete(collection, id).await,
        }
    }
}
