//! Catalog entities and their inputs.

use chrono::{DateTime, Utc};
use ndiambour_shared::types::{ImageId, VehicleId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of a category.
///
/// The seed set is fixed ([`CategoryId::VEHICLES`] and friends) but further
/// categories may be added, so this is a string rather than an enum.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    /// Whole-vehicle photos.
    pub const VEHICLES: &'static str = "vehicles";
    /// Interior photos.
    pub const INTERIORS: &'static str = "interiors";
    /// Exterior detail photos.
    pub const EXTERIORS: &'static str = "exteriors";
    /// Everything else; the default.
    pub const OTHERS: &'static str = "others";

    /// Create a category ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CategoryId {
    fn default() -> Self {
        Self::new(Self::OTHERS)
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Field names a vehicle's free-form attributes may not use.
pub const RESERVED_VEHICLE_FIELDS: [&str; 7] =
    ["id", "make", "model", "year", "images", "createdAt", "updatedAt"];

/// A rental vehicle in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    /// Vehicle ID.
    pub id: VehicleId,
    /// Manufacturer.
    pub make: String,
    /// Model name.
    pub model: String,
    /// Model year.
    #[serde(default)]
    pub year: Option<i32>,
    /// Linked images in insertion order. Maintained only by link/unlink.
    #[serde(default)]
    pub images: Vec<ImageId>,
    /// Free-form attributes (price, type, seats, ...).
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
    /// When the vehicle was created.
    pub created_at: DateTime<Utc>,
    /// When the vehicle was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    /// Name cached on linked images.
    #[must_use]
    pub fn display_name(&self) -> String {
        display_name(&self.make, &self.model, self.year)
    }
}

/// `"{make} {model} {year}"`, year omitted when unknown.
#[must_use]
pub fn display_name(make: &str, model: &str, year: Option<i32>) -> String {
    match year {
        Some(year) => format!("{make} {model} {year}"),
        None => format!("{make} {model}"),
    }
}

/// Input for creating a vehicle.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewVehicle {
    /// Manufacturer. Required.
    #[serde(default)]
    pub make: String,
    /// Model name. Required.
    #[serde(default)]
    pub model: String,
    /// Model year.
    #[serde(default)]
    pub year: Option<i32>,
    /// Free-form attributes, given alongside the named fields.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Partial update of a vehicle.
///
/// Image associations are not part of this type; they change only through
/// link and unlink.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleUpdate {
    /// New manufacturer.
    #[serde(default)]
    pub make: Option<String>,
    /// New model name.
    #[serde(default)]
    pub model: Option<String>,
    /// New year; `Some(None)` clears it.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub year: Option<Option<i32>>,
    /// Attributes merged into the existing ones; a `null` value removes the key.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// File details of an image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    /// Original filename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// MIME type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Width in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Height in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// A catalog image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// Image ID.
    pub id: ImageId,
    /// Category the image is counted under.
    pub category: CategoryId,
    /// Source URL.
    #[serde(default)]
    pub src: String,
    /// Storage key when the file lives in managed blob storage.
    #[serde(default)]
    pub storage_path: Option<String>,
    /// Owning vehicle.
    #[serde(default)]
    pub vehicle_id: Option<VehicleId>,
    /// Cached display name of the owning vehicle.
    #[serde(default)]
    pub vehicle_name: Option<String>,
    /// Title shown in galleries.
    #[serde(default)]
    pub title: Option<String>,
    /// Alternative text.
    #[serde(default)]
    pub alt: Option<String>,
    /// Longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// File details.
    #[serde(default)]
    pub file: FileMetadata,
    /// When the image was created.
    pub created_at: DateTime<Utc>,
    /// When the image was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an image.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewImage {
    /// Caller-chosen ID; generated when absent.
    #[serde(default)]
    pub id: Option<ImageId>,
    /// Category; defaults to `others`.
    #[serde(default)]
    pub category: Option<CategoryId>,
    /// Source URL.
    #[serde(default)]
    pub src: String,
    /// Storage key in managed blob storage. Set by uploads only.
    #[serde(skip_deserializing)]
    pub storage_path: Option<String>,
    /// Vehicle to link to.
    #[serde(default)]
    pub vehicle_id: Option<VehicleId>,
    /// Title.
    #[serde(default)]
    pub title: Option<String>,
    /// Alternative text.
    #[serde(default)]
    pub alt: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// File details.
    #[serde(default)]
    pub file: FileMetadata,
}

/// Partial update of an image.
///
/// The cached vehicle name is not settable; it follows `vehicle_id`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUpdate {
    /// New category.
    #[serde(default)]
    pub category: Option<CategoryId>,
    /// New source URL.
    #[serde(default)]
    pub src: Option<String>,
    /// New owner; `Some(None)` unlinks.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub vehicle_id: Option<Option<VehicleId>>,
    /// New title; `Some(None)` clears it.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub title: Option<Option<String>>,
    /// New alternative text; `Some(None)` clears it.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub alt: Option<Option<String>>,
    /// New description; `Some(None)` clears it.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,
    /// Replacement file details.
    #[serde(default)]
    pub file: Option<FileMetadata>,
}

impl ImageUpdate {
    /// Update that only changes the category.
    #[must_use]
    pub fn category(category: impl Into<CategoryId>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }

    /// Update that only changes the owning vehicle.
    #[must_use]
    pub fn vehicle(vehicle_id: Option<VehicleId>) -> Self {
        Self {
            vehicle_id: Some(vehicle_id),
            ..Self::default()
        }
    }
}

/// A classification bucket for images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category ID.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Icon reference (CSS class).
    pub icon: String,
    /// Number of images in this category.
    #[serde(default)]
    pub count: u64,
}

impl Category {
    /// Create an empty category.
    #[must_use]
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: icon.into(),
            count: 0,
        }
    }

    /// Categories written at first initialization.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(CategoryId::VEHICLES, "Véhicules", "fas fa-car"),
            Self::new(CategoryId::INTERIORS, "Intérieurs", "fas fa-couch"),
            Self::new(CategoryId::EXTERIORS, "Extérieurs", "fas fa-car-side"),
            Self::new(CategoryId::OTHERS, "Autres", "fas fa-images"),
        ]
    }
}

/// Outcome of a best-effort side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cleanup {
    /// The side effect ran and succeeded.
    Done,
    /// Nothing needed doing.
    Skipped,
    /// The side effect failed; the enclosing operation still completed.
    Failed(String),
}

impl Cleanup {
    /// Whether the side effect failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Result of deleting an image.
#[derive(Debug, Clone)]
pub struct ImageDeletion {
    /// The image as it was before deletion.
    pub image: Image,
    /// Removal of the stored file.
    pub blob: Cleanup,
}

/// An image whose association could not be cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseFailure {
    /// The image left untouched.
    pub image_id: ImageId,
    /// Why it failed.
    pub error: String,
}

/// Result of deleting a vehicle.
#[derive(Debug, Clone)]
pub struct VehicleDeletion {
    /// The vehicle as it was before deletion.
    pub vehicle: Vehicle,
    /// Images whose `vehicleId` was cleared.
    pub released: Vec<ImageId>,
    /// Images that could not be cleared.
    pub failures: Vec<ReleaseFailure>,
}

/// Repairs made by a reconcile pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// Image IDs dropped from vehicle lists because the image no longer exists.
    pub dangling_removed: usize,
    /// Entries dropped because the image is listed twice or belongs to another vehicle.
    pub duplicates_removed: usize,
    /// Images whose vehicle fields were rewritten from the owning vehicle.
    pub images_relinked: usize,
    /// Images whose `vehicleId` pointed nowhere and was cleared.
    pub orphans_cleared: usize,
    /// Categories whose count was corrected.
    pub counts_corrected: usize,
}

impl ReconcileReport {
    /// Whether the pass found nothing to repair.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Human-readable file size: `"1.5 KB"`, `"0 Bytes"`, `"Unknown"`.
///
/// Uses 1024 as the base, one decimal place with a trailing `.0` dropped,
/// and GB as the largest unit.
#[must_use]
pub fn format_file_size(bytes: Option<u64>) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    let Some(bytes) = bytes else {
        return "Unknown".to_string();
    };
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut exponent = 0;
    let mut divisor: u128 = 1;
    while exponent + 1 < UNITS.len() && u128::from(bytes) >= divisor * 1024 {
        divisor *= 1024;
        exponent += 1;
    }

    let tenths = (u128::from(bytes) * 10 + divisor / 2) / divisor;
    let (whole, fraction) = (tenths / 10, tenths % 10);
    if fraction == 0 {
        format!("{whole} {}", UNITS[exponent])
    } else {
        format!("{whole}.{fraction} {}", UNITS[exponent])
    }
}
