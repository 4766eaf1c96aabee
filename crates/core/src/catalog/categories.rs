//! Categories, their image counts, and catalog setup.

use serde_json::Value;
use tracing::{info, warn};

use super::error::CatalogError;
use super::service::{CatalogService, fields};
use super::types::{Category, CategoryId};
use crate::storage::BlobStore;
use crate::store::{
    Document, DocumentStore, ID_FIELD, StoreError, collections, from_documents, to_document,
};

impl<S: DocumentStore, B: BlobStore> CatalogService<S, B> {
    /// Seed the default categories that are not stored yet.
    ///
    /// Existing categories, including their counts, are left alone, so this
    /// is safe to call on every start. Returns how many were written.
    pub async fn init(&self) -> Result<usize, CatalogError> {
        let mut seeded = 0;
        for category in Category::defaults() {
            if self.load_category(&category.id).await?.is_some() {
                continue;
            }
            self.store
                .create(collections::CATEGORIES, to_document(&category)?)
                .await?;
            seeded += 1;
        }

        if seeded > 0 {
            info!(seeded, "Default categories seeded");
        }
        Ok(seeded)
    }

    /// Delete every document in every collection, then re-seed the default
    /// categories.
    ///
    /// Intake records and site settings go too; settings are re-seeded by
    /// their own service. Stored files are not touched. Development teardown only.
    pub async fn clear_all(&self) -> Result<(), CatalogError> {
        for collection in collections::ALL {
            let docs = self.store.get_all(collection).await?;
            let total = docs.len();
            for id in docs.iter().filter_map(|doc| doc.get(ID_FIELD).and_then(Value::as_str)) {
                self.store.delete(collection, id).await?;
            }
            warn!(collection, total, "Collection cleared");
        }
        self.init().await?;
        Ok(())
    }

    /// All categories.
    pub async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        let docs = self.store.get_all(collections::CATEGORIES).await?;
        Ok(from_documents(docs)?)
    }

    /// One category, or `None` if it does not exist.
    pub async fn get_category(&self, id: &CategoryId) -> Result<Option<Category>, CatalogError> {
        self.load_category(id).await
    }

    /// Add a category beyond the defaults. Its count always starts at zero.
    pub async fn add_category(&self, category: Category) -> Result<Category, CatalogError> {
        if category.id.as_str().trim().is_empty() {
            return Err(CatalogError::validation("category id is required"));
        }
        if category.name.trim().is_empty() {
            return Err(CatalogError::validation("category name is required"));
        }
        if self.load_category(&category.id).await?.is_some() {
            return Err(CatalogError::Conflict {
                entity: "category",
                id: category.id.to_string(),
            });
        }

        let category = Category {
            count: 0,
            ..category
        };
        match self
            .store
            .create(collections::CATEGORIES, to_document(&category)?)
            .await
        {
            Err(StoreError::Duplicate { id, .. }) => Err(CatalogError::Conflict {
                entity: "category",
                id,
            }),
            other => {
                other?;
                info!(category_id = %category.id, "Category added");
                Ok(category)
            }
        }
    }

    /// Change a category's image count by `delta`, never going below zero.
    ///
    /// Returns the new count, or `None` when the category does not exist
    /// (the change is skipped and logged; the caller's operation proceeds).
    pub async fn adjust_category_count(
        &self,
        id: &CategoryId,
        delta: i64,
    ) -> Result<Option<u64>, CatalogError> {
        let Some(category) = self.load_category(id).await? else {
            warn!(category_id = %id, delta, "Count change skipped, category does not exist");
            return Ok(None);
        };

        let count = floored_count(category.count, delta);
        let mut patch = Document::new();
        patch.insert(fields::COUNT.into(), Value::from(count));
        self.store
            .update(collections::CATEGORIES, id.as_str(), patch)
            .await?;

        Ok(Some(count))
    }
}

/// `max(0, count + delta)` without leaving unsigned arithmetic.
pub(super) fn floored_count(count: u64, delta: i64) -> u64 {
    if delta >= 0 {
        count.saturating_add(delta.unsigned_abs())
    } else {
        count.saturating_sub(delta.unsigned_abs())
    }
}
