//! Vehicle and image catalog.
//!
//! [`CatalogService`] owns every write that touches more than one document:
//! the two-sided vehicle ↔ image association and the per-category image
//! counts. Callers never edit `images`, `vehicleId`, `vehicleName` or
//! `count` directly.

mod association;
mod categories;
mod error;
mod images;
mod reconcile;
mod service;
mod types;
mod vehicles;


pub use error::CatalogError;
pub use images::{ALL_CATEGORIES, Upload};
pub use service::CatalogService;
pub use types::{
    Category, CategoryId, Cleanup, FileMetadata, Image, ImageDeletion, ImageUpdate, NewImage,
    NewVehicle, RESERVED_VEHICLE_FIELDS, ReconcileReport, ReleaseFailure, Vehicle,
    VehicleDeletion, VehicleUpdate, display_name, format_file_size,
};
