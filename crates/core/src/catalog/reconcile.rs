//! Repair of drifted associations and counts.
//!
//! Partial failures of the two-sided link protocol, writes made outside the
//! catalog, or concurrent edits can leave the two sides of an association
//! disagreeing. A reconcile pass takes the vehicle lists as the source of
//! truth for ownership, with the image's own `vehicleId` breaking ties when
//! several vehicles list the same image.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use ndiambour_shared::types::{ImageId, VehicleId};
use serde_json::Value;
use tracing::info;

use super::error::CatalogError;
use super::service::{CatalogService, fields, to_value, touched};
use super::types::{CategoryId, ReconcileReport};
use crate::storage::BlobStore;
use crate::store::{Document, DocumentStore, collections};

impl<S: DocumentStore, B: BlobStore> CatalogService<S, B> {
    /// Bring vehicle lists, image back-references and category counts back
    /// into agreement.
    ///
    /// - Vehicle lists lose IDs of missing images, duplicates, and images
    ///   owned by another vehicle.
    /// - Each image's `vehicleId`/`vehicleName` is rewritten from its owner,
    ///   or cleared when no vehicle lists it.
    /// - Each category count is set to the number of images filed under it.
    pub async fn reconcile(&self) -> Result<ReconcileReport, CatalogError> {
        let vehicles = self.list_vehicles().await?;
        let images = self.list_images().await?;
        let categories = self.list_categories().await?;
        let mut report = ReconcileReport::default();

        let existing: HashSet<&ImageId> = images.iter().map(|i| &i.id).collect();
        let recorded: HashMap<&ImageId, Option<&VehicleId>> = images
            .iter()
            .map(|i| (&i.id, i.vehicle_id.as_ref()))
            .collect();

        // Owner per image: the recorded vehicle if it lists the image,
        // otherwise the first vehicle that does.
        let mut owners: HashMap<&ImageId, usize> = HashMap::new();
        for (index, vehicle) in vehicles.iter().enumerate() {
            for image_id in vehicle.images.iter().filter(|id| existing.contains(id)) {
                let claims_recorded =
                    recorded.get(image_id).copied().flatten() == Some(&vehicle.id);
                if claims_recorded {
                    owners.insert(image_id, index);
                } else {
                    owners.entry(image_id).or_insert(index);
                }
            }
        }

        for (index, vehicle) in vehicles.iter().enumerate() {
            let mut seen = HashSet::new();
            let mut kept = Vec::with_capacity(vehicle.images.len());
            for image_id in &vehicle.images {
                if !existing.contains(image_id) {
                    report.dangling_removed += 1;
                } else if !seen.insert(image_id) || owners.get(image_id) != Some(&index) {
                    report.duplicates_removed += 1;
                } else {
                    kept.push(image_id.clone());
                }
            }
            if kept.len() != vehicle.images.len() {
                let mut patch = touched(Utc::now())?;
                patch.insert(fields::IMAGES.into(), to_value(&kept)?);
                self.patch_vehicle(&vehicle.id, patch).await?;
            }
        }

        for image in &images {
            let owner = owners.get(&image.id).map(|&index| &vehicles[index]);
            match owner {
                Some(vehicle) => {
                    let name = vehicle.display_name();
                    if image.vehicle_id.as_ref() != Some(&vehicle.id)
                        || image.vehicle_name.as_deref() != Some(name.as_str())
                    {
                        let mut patch = Document::new();
                        patch.insert(fields::VEHICLE_ID.into(), Value::from(vehicle.id.as_str()));
                        patch.insert(fields::VEHICLE_NAME.into(), Value::from(name));
                        self.patch_image(&image.id, patch).await?;
                        report.images_relinked += 1;
                    }
                }
                None if image.vehicle_id.is_some() || image.vehicle_name.is_some() => {
                    self.clear_image_vehicle(&image.id).await?;
                    report.orphans_cleared += 1;
                }
                None => {}
            }
        }

        let mut tally: HashMap<&CategoryId, u64> = HashMap::new();
        for image in &images {
            *tally.entry(&image.category).or_default() += 1;
        }
        for category in &categories {
            let actual = tally.get(&category.id).copied().unwrap_or(0);
            if category.count != actual {
                let mut patch = Document::new();
                patch.insert(fields::COUNT.into(), Value::from(actual));
                self.store
                    .update(collections::CATEGORIES, category.id.as_str(), patch)
                    .await?;
                report.counts_corrected += 1;
            }
        }

        info!(?report, "Catalog reconciled");
        Ok(report)
    }
}
