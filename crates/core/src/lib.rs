//! Core logic for the Ndiambour rental catalog.
//!
//! This crate has no web or database dependencies. Persistence is reached
//! through the [`store::DocumentStore`] trait (implemented by the db crate)
//! and file storage through [`storage::BlobStore`].
//!
//! # Modules
//!
//! - `store` - Document store abstraction and record codec
//! - `storage` - Blob storage for image files (OpenDAL)
//! - `media` - CDN delivery URL transformations
//! - `catalog` - Vehicles, images, categories and their consistency rules
//! - `intake` - Reservation requests and contact messages
//! - `settings` - Site-wide settings

pub mod catalog;
pub mod intake;
pub mod media;
pub mod settings;
pub mod storage;
pub mod store;

#[cfg(test)]
mod test_support;
