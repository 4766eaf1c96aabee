//! Image operations.

use bytes::Bytes;
use chrono::Utc;
use ndiambour_shared::types::{ImageId, VehicleId};
use serde_json::Value;
use tracing::{info, warn};

use super::error::CatalogError;
use super::service::{CatalogService, fields, to_value, touched};
use super::types::{Cleanup, FileMetadata, Image, ImageDeletion, ImageUpdate, NewImage};
use crate::storage::{BlobStore, StorageService};
use crate::store::{DocumentStore, collections, from_documents, to_document};

/// Category filter value matching every image.
pub const ALL_CATEGORIES: &str = "all";

/// A file received for upload.
#[derive(Debug, Clone)]
pub struct Upload {
    /// File contents.
    pub bytes: Bytes,
    /// Original filename.
    pub filename: String,
    /// MIME type.
    pub content_type: String,
}

impl<S: DocumentStore, B: BlobStore> CatalogService<S, B> {
    /// All images.
    pub async fn list_images(&self) -> Result<Vec<Image>, CatalogError> {
        let docs = self.store.get_all(collections::IMAGES).await?;
        Ok(from_documents(docs)?)
    }

    /// One image, or `None` if it does not exist.
    pub async fn get_image(&self, id: &ImageId) -> Result<Option<Image>, CatalogError> {
        self.load_image(id).await
    }

    /// Images in a category; [`ALL_CATEGORIES`] returns every image.
    pub async fn images_by_category(&self, category: &str) -> Result<Vec<Image>, CatalogError> {
        if category == ALL_CATEGORIES {
            return self.list_images().await;
        }
        let docs = self
            .store
            .query_equals(collections::IMAGES, fields::CATEGORY, &Value::from(category))
            .await?;
        Ok(from_documents(docs)?)
    }

    /// Images whose `vehicleId` is the given vehicle.
    pub async fn images_by_vehicle(&self, vehicle_id: &VehicleId) -> Result<Vec<Image>, CatalogError> {
        let docs = self
            .store
            .query_equals(
                collections::IMAGES,
                fields::VEHICLE_ID,
                &Value::from(vehicle_id.as_str()),
            )
            .await?;
        Ok(from_documents(docs)?)
    }

    /// Create an image, count it under its category, and link it to its
    /// vehicle when one is given.
    ///
    /// The category and vehicle are checked before anything is written.
    pub async fn add_image(&self, input: NewImage) -> Result<Image, CatalogError> {
        let category = input.category.unwrap_or_default();
        self.require_known_category(&category).await?;
        if let Some(vehicle_id) = &input.vehicle_id {
            self.require_vehicle(vehicle_id).await?;
        }

        let id = given_id(input.id);
        self.require_free_image_id(&id).await?;

        let now = Utc::now();
        let image = Image {
            id,
            category,
            src: input.src,
            storage_path: input.storage_path,
            vehicle_id: None,
            vehicle_name: None,
            title: input.title,
            alt: input.alt,
            description: input.description,
            file: input.file,
            created_at: now,
            updated_at: now,
        };

        self.store
            .create(collections::IMAGES, to_document(&image)?)
            .await?;
        self.adjust_category_count(&image.category, 1).await?;
        if let Some(vehicle_id) = &input.vehicle_id {
            self.link(&image.id, vehicle_id).await?;
        }

        info!(image_id = %image.id, category = %image.category, "Image added");
        self.require_image(&image.id).await
    }

    /// Store an uploaded file and create its image.
    ///
    /// The file is written under `images/{id}/{filename}` and the image's
    /// `src` is the resolved URL. A taken id is rejected before anything is
    /// stored. If creating the image fails, the stored file is removed again.
    pub async fn upload_image(&self, upload: Upload, input: NewImage) -> Result<Image, CatalogError> {
        let size = upload.bytes.len() as u64;
        self.blobs.validate_upload(&upload.content_type, size)?;

        let id = given_id(input.id.clone());
        self.require_free_image_id(&id).await?;
        let key = StorageService::image_key(&id, &upload.filename);
        let locator = self
            .blobs
            .upload(upload.bytes, &key, &upload.content_type)
            .await?;

        let src = match self.blobs.resolve_url(&locator).await {
            Ok(src) => src,
            Err(e) => {
                self.discard_blob(&locator).await;
                return Err(e.into());
            }
        };

        let input = NewImage {
            id: Some(id),
            src,
            storage_path: Some(locator.clone()),
            file: FileMetadata {
                name: Some(upload.filename),
                size: Some(size),
                content_type: Some(upload.content_type),
                ..input.file
            },
            ..input
        };

        match self.add_image(input).await {
            Ok(image) => Ok(image),
            Err(e) => {
                self.discard_blob(&locator).await;
                Err(e)
            }
        }
    }

    /// Update an image's fields, keeping category counts and the vehicle
    /// association consistent.
    ///
    /// A category change moves one count from the old category to the new
    /// one. A vehicle change unlinks from the old vehicle before linking to
    /// the new one. Both targets are checked before anything is written.
    pub async fn update_image(&self, id: &ImageId, update: ImageUpdate) -> Result<Image, CatalogError> {
        let current = self.require_image(id).await?;

        let new_category = update.category.filter(|c| *c != current.category);
        if let Some(category) = &new_category {
            self.require_known_category(category).await?;
        }
        let vehicle_change = update.vehicle_id.filter(|v| *v != current.vehicle_id);
        if let Some(Some(vehicle_id)) = &vehicle_change {
            self.require_vehicle(vehicle_id).await?;
        }

        if let Some(category) = &new_category {
            self.adjust_category_count(&current.category, -1).await?;
            self.adjust_category_count(category, 1).await?;
        }

        let mut patch = touched(Utc::now())?;
        if let Some(target) = &vehicle_change {
            if let Some(old) = &current.vehicle_id {
                self.unlink(id, old).await?;
            }
            match target {
                Some(vehicle_id) => {
                    self.link(id, vehicle_id).await?;
                    let vehicle = self.require_vehicle(vehicle_id).await?;
                    patch.insert(fields::VEHICLE_ID.into(), Value::from(vehicle_id.as_str()));
                    patch.insert(fields::VEHICLE_NAME.into(), Value::from(vehicle.display_name()));
                }
                None => {
                    patch.insert(fields::VEHICLE_ID.into(), Value::Null);
                    patch.insert(fields::VEHICLE_NAME.into(), Value::Null);
                }
            }
        }

        if let Some(category) = &new_category {
            patch.insert(fields::CATEGORY.into(), Value::from(category.as_str()));
        }
        if let Some(src) = update.src {
            patch.insert(fields::SRC.into(), Value::from(src));
        }
        if let Some(title) = update.title {
            patch.insert("title".into(), to_value(&title)?);
        }
        if let Some(alt) = update.alt {
            patch.insert("alt".into(), to_value(&alt)?);
        }
        if let Some(description) = update.description {
            patch.insert("description".into(), to_value(&description)?);
        }
        if let Some(file) = update.file {
            patch.insert("file".into(), to_value(&file)?);
        }

        self.patch_image(id, patch).await?;

        info!(image_id = %id, "Image updated");
        self.require_image(id).await
    }

    /// Delete an image.
    ///
    /// Order: uncount, unlink, remove the stored file, delete the document.
    /// File removal is best-effort and reported in the result.
    pub async fn delete_image(&self, id: &ImageId) -> Result<ImageDeletion, CatalogError> {
        let image = self.require_image(id).await?;

        self.adjust_category_count(&image.category, -1).await?;
        if let Some(vehicle_id) = &image.vehicle_id {
            self.unlink(id, vehicle_id).await?;
        }
        let blob = self.remove_blob(&image).await;
        self.store.delete(collections::IMAGES, id.as_str()).await?;

        info!(image_id = %id, blob = ?blob, "Image deleted");
        Ok(ImageDeletion { image, blob })
    }

    async fn require_free_image_id(&self, id: &ImageId) -> Result<(), CatalogError> {
        if self.load_image(id).await?.is_some() {
            return Err(CatalogError::Conflict {
                entity: "image",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn remove_blob(&self, image: &Image) -> Cleanup {
        let locator = image
            .storage_path
            .clone()
            .or_else(|| self.blobs.managed_locator(&image.src));
        let Some(locator) = locator else {
            return Cleanup::Skipped;
        };

        match self.blob_shared(image, &locator).await {
            Ok(false) => {}
            Ok(true) => {
                info!(image_id = %image.id, locator = %locator, "Stored file still referenced; kept");
                return Cleanup::Skipped;
            }
            Err(e) => {
                warn!(image_id = %image.id, locator = %locator, error = %e, "Failed to check stored file references");
                return Cleanup::Failed(e.to_string());
            }
        }

        match self.blobs.delete(&locator).await {
            Ok(()) => Cleanup::Done,
            Err(e) => {
                warn!(image_id = %image.id, locator = %locator, error = %e, "Failed to delete stored file");
                Cleanup::Failed(e.to_string())
            }
        }
    }

    async fn discard_blob(&self, locator: &str) {
        if let Err(e) = self.blobs.delete(locator).await {
            warn!(locator = %locator, error = %e, "Failed to remove orphaned upload");
        }
    }

    /// Whether an image other than `image` points at the same stored file.
    async fn blob_shared(&self, image: &Image, locator: &str) -> Result<bool, CatalogError> {
        let by_path = self
            .store
            .query_equals(collections::IMAGES, fields::STORAGE_PATH, &Value::from(locator))
            .await?;
        let by_src = self
            .store
            .query_equals(collections::IMAGES, fields::SRC, &Value::from(image.src.as_str()))
            .await?;
        let others: Vec<Image> = from_documents(by_path.into_iter().chain(by_src).collect())?;
        Ok(others.iter().any(|other| other.id != image.id))
    }
}

/// A caller-chosen ID, or a fresh one when none (or a blank one) was given.
fn given_id(id: Option<ImageId>) -> ImageId {
    id.filter(|id| !id.as_str().trim().is_empty())
        .unwrap_or_default()
}
