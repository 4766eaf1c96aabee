//! Catalog error types.

use ndiambour_shared::AppError;
use thiserror::Error;

use crate::storage::StorageError;
use crate::store::StoreError;

/// Catalog operation errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Input failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The targeted entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind (`vehicle`, `image`, `category`).
        entity: &'static str,
        /// Requested ID.
        id: String,
    },

    /// An entity with the same ID already exists.
    #[error("{entity} already exists: {id}")]
    Conflict {
        /// Entity kind.
        entity: &'static str,
        /// Conflicting ID.
        id: String,
    },

    /// Document store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Blob storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CatalogError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a vehicle not found error.
    #[must_use]
    pub fn vehicle_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity: "vehicle",
            id: id.to_string(),
        }
    }

    /// Create an image not found error.
    #[must_use]
    pub fn image_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity: "image",
            id: id.to_string(),
        }
    }

    /// Whether this is a failure of an underlying store rather than of the request.
    #[must_use]
    pub const fn is_store_failure(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Storage(_))
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(msg) => Self::Validation(msg),
            CatalogError::NotFound { .. } => Self::NotFound(err.to_string()),
            CatalogError::Conflict { .. } => Self::Conflict(err.to_string()),
            CatalogError::Store(e) => Self::Store(e.to_string()),
            CatalogError::Storage(e) if e.is_rejected_upload() => Self::Validation(e.to_string()),
            CatalogError::Storage(e) => Self::Blob(e.to_string()),
        }
    }
}
