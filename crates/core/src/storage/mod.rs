//! Image file storage behind the [`BlobStore`] trait.
//!
//! [`StorageService`] implements it on Apache OpenDAL, so the same code writes
//! to an S3-compatible bucket, an Azure container, a local directory or
//! memory. Files are addressed by locator, the storage key returned from
//! upload (`images/{image_id}/front.jpg`). Public URLs are either the
//! configured base URL joined with the locator or a presigned read URL.

mod config;
mod error;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::{BlobStore, StorageService};
