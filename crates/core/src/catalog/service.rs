//! Catalog service: shared state and document helpers.
//!
//! The operations themselves live in sibling modules, one `impl` block per
//! concern: [`vehicles`](super::vehicles), [`images`](super::images),
//! [`association`](super::association), [`categories`](super::categories)
//! and [`reconcile`](super::reconcile).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ndiambour_shared::types::{ImageId, VehicleId};
use serde::Serialize;
use serde_json::Value;

use super::error::CatalogError;
use super::types::{Category, CategoryId, Image, Vehicle};
use crate::storage::BlobStore;
use crate::store::{Document, DocumentStore, StoreError, collections, from_document};

/// Document field names written by partial updates.
pub(super) mod fields {
    pub const IMAGES: &str = "images";
    pub const VEHICLE_ID: &str = "vehicleId";
    pub const VEHICLE_NAME: &str = "vehicleName";
    pub const SRC: &str = "src";
    pub const STORAGE_PATH: &str = "storagePath";
    pub const CATEGORY: &str = "category";
    pub const COUNT: &str = "count";
    pub const UPDATED_AT: &str = "updatedAt";
}

/// Catalog repository over a document store and a blob store.
///
/// Every vehicle ↔ image association change goes through the link/unlink
/// methods of this type, and every category count change through
/// [`CatalogService::adjust_category_count`].
pub struct CatalogService<S: DocumentStore, B: BlobStore> {
    pub(super) store: Arc<S>,
    pub(super) blobs: Arc<B>,
}

impl<S: DocumentStore, B: BlobStore> Clone for CatalogService<S, B> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            blobs: Arc::clone(&self.blobs),
        }
    }
}

impl<S: DocumentStore, B: BlobStore> std::fmt::Debug for CatalogService<S, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService").finish_non_exhaustive()
    }
}

impl<S: DocumentStore, B: BlobStore> CatalogService<S, B> {
    /// Create a new catalog service.
    #[must_use]
    pub fn new(store: Arc<S>, blobs: Arc<B>) -> Self {
        Self { store, blobs }
    }

    /// The underlying document store.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The underlying blob store.
    #[must_use]
    pub fn blobs(&self) -> &Arc<B> {
        &self.blobs
    }

    pub(super) async fn load_vehicle(&self, id: &VehicleId) -> Result<Option<Vehicle>, CatalogError> {
        self.load(collections::VEHICLES, id.as_str()).await
    }

    pub(super) async fn require_vehicle(&self, id: &VehicleId) -> Result<Vehicle, CatalogError> {
        self.load_vehicle(id)
            .await?
            .ok_or_else(|| CatalogError::vehicle_not_found(id))
    }

    pub(super) async fn load_image(&self, id: &ImageId) -> Result<Option<Image>, CatalogError> {
        self.load(collections::IMAGES, id.as_str()).await
    }

    pub(super) async fn require_image(&self, id: &ImageId) -> Result<Image, CatalogError> {
        self.load_image(id)
            .await?
            .ok_or_else(|| CatalogError::image_not_found(id))
    }

    pub(super) async fn load_category(
        &self,
        id: &CategoryId,
    ) -> Result<Option<Category>, CatalogError> {
        self.load(collections::CATEGORIES, id.as_str()).await
    }

    /// Images may only be filed under a stored category.
    pub(super) async fn require_known_category(&self, id: &CategoryId) -> Result<(), CatalogError> {
        match self.load_category(id).await? {
            Some(_) => Ok(()),
            None => Err(CatalogError::validation(format!("unknown category '{id}'"))),
        }
    }

    async fn load<T: serde::de::DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<T>, CatalogError> {
        match self.store.get_by_id(collection, id).await? {
            Some(doc) => Ok(Some(from_document(doc)?)),
            None => Ok(None),
        }
    }

    /// Apply a partial update, reporting a vanished image as `NotFound`.
    pub(super) async fn patch_image(&self, id: &ImageId, patch: Document) -> Result<(), CatalogError> {
        match self.store.update(collections::IMAGES, id.as_str(), patch).await {
            Err(StoreError::Missing { .. }) => Err(CatalogError::image_not_found(id)),
            other => Ok(other?),
        }
    }

    /// Apply a partial update, reporting a vanished vehicle as `NotFound`.
    pub(super) async fn patch_vehicle(
        &self,
        id: &VehicleId,
        patch: Document,
    ) -> Result<(), CatalogError> {
        match self
            .store
            .update(collections::VEHICLES, id.as_str(), patch)
            .await
        {
            Err(StoreError::Missing { .. }) => Err(CatalogError::vehicle_not_found(id)),
            other => Ok(other?),
        }
    }
}

/// Serialize a field value for a partial update.
pub(super) fn to_value<T: Serialize>(value: &T) -> Result<Value, CatalogError> {
    serde_json::to_value(value).map_err(|e| CatalogError::Store(StoreError::from(e)))
}

/// A patch carrying only a fresh update timestamp.
pub(super) fn touched(now: DateTime<Utc>) -> Result<Document, CatalogError> {
    let mut patch = Document::new();
    patch.insert(fields::UPDATED_AT.to_string(), to_value(&now)?);
    Ok(patch)
}
