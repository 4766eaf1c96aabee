//! Document store error types.

use ndiambour_shared::AppError;
use thiserror::Error;

/// Document store operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Update targeted a document that does not exist.
    #[error("document {collection}/{id} does not exist")]
    Missing {
        /// Collection name.
        collection: String,
        /// Document ID.
        id: String,
    },

    /// A document with the same ID already exists.
    #[error("document {collection}/{id} already exists")]
    Duplicate {
        /// Collection name.
        collection: String,
        /// Document ID.
        id: String,
    },

    /// Stored data could not be converted to or from a document.
    #[error("document codec error: {0}")]
    Codec(String),

    /// The backend failed (network, permission, I/O).
    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Create a missing-document error.
    #[must_use]
    pub fn missing(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Missing {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Create a duplicate-document error.
    #[must_use]
    pub fn duplicate(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Duplicate {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Create a backend error.
    #[must_use]
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Codec(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Missing { .. } => Self::NotFound(err.to_string()),
            StoreError::Duplicate { .. } => Self::Conflict(err.to_string()),
            StoreError::Codec(_) | StoreError::Backend(_) => Self::Store(err.to_string()),
        }
    }
}
