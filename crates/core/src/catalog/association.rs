//! Vehicle ↔ image association.
//!
//! The association is stored on both sides: the vehicle's ordered `images`
//! list and the image's `vehicleId`/`vehicleName`. Every change goes through
//! [`CatalogService::link`] and [`CatalogService::unlink`], which write the
//! vehicle side first and the image side second. Each is idempotent.

use chrono::Utc;
use ndiambour_shared::types::{ImageId, VehicleId};
use serde_json::Value;
use tracing::debug;

use super::error::CatalogError;
use super::service::{CatalogService, fields, to_value, touched};
use super::types::{Image, Vehicle};
use crate::storage::BlobStore;
use crate::store::DocumentStore;

impl<S: DocumentStore, B: BlobStore> CatalogService<S, B> {
    /// Attach an image to a vehicle, moving it off its current vehicle if any.
    pub async fn link_image(
        &self,
        image_id: &ImageId,
        vehicle_id: &VehicleId,
    ) -> Result<Image, CatalogError> {
        let image = self.require_image(image_id).await?;
        let vehicle = self.require_vehicle(vehicle_id).await?;

        if let Some(current) = image.vehicle_id.as_ref().filter(|v| *v != vehicle_id) {
            self.unlink(image_id, current).await?;
        }
        self.link_loaded(image_id, vehicle).await?;

        self.require_image(image_id).await
    }

    /// Detach an image from a vehicle.
    ///
    /// If the image records a different owner, only the given vehicle's list
    /// is cleaned and the image keeps its owner.
    pub async fn unlink_image(
        &self,
        image_id: &ImageId,
        vehicle_id: &VehicleId,
    ) -> Result<Image, CatalogError> {
        let image = self.require_image(image_id).await?;

        match &image.vehicle_id {
            Some(owner) if owner != vehicle_id => {
                self.detach_from_vehicle(image_id, vehicle_id).await?;
            }
            _ => self.unlink(image_id, vehicle_id).await?,
        }

        self.require_image(image_id).await
    }

    /// Link protocol.
    ///
    /// 1. Load the vehicle; `NotFound` if it does not exist.
    /// 2. If its list already holds the image, stop.
    /// 3. Append the image ID to the list and persist the vehicle.
    /// 4. Persist `vehicleId` and `vehicleName` on the image.
    ///
    /// A failure at step 4 leaves the vehicle listing an image that does
    /// not point back; [`CatalogService::reconcile`] repairs that.
    pub(super) async fn link(
        &self,
        image_id: &ImageId,
        vehicle_id: &VehicleId,
    ) -> Result<bool, CatalogError> {
        let vehicle = self.require_vehicle(vehicle_id).await?;
        self.link_loaded(image_id, vehicle).await
    }

    /// Steps 2 to 4 of the link protocol for an already loaded vehicle.
    pub(super) async fn link_loaded(
        &self,
        image_id: &ImageId,
        mut vehicle: Vehicle,
    ) -> Result<bool, CatalogError> {
        if vehicle.images.contains(image_id) {
            debug!(image_id = %image_id, vehicle_id = %vehicle.id, "Image already linked");
            return Ok(false);
        }

        let now = Utc::now();
        vehicle.images.push(image_id.clone());

        let mut vehicle_patch = touched(now)?;
        vehicle_patch.insert(fields::IMAGES.into(), to_value(&vehicle.images)?);
        self.patch_vehicle(&vehicle.id, vehicle_patch).await?;

        let mut image_patch = touched(now)?;
        image_patch.insert(fields::VEHICLE_ID.into(), Value::from(vehicle.id.as_str()));
        image_patch.insert(fields::VEHICLE_NAME.into(), Value::from(vehicle.display_name()));
        self.patch_image(image_id, image_patch).await?;

        debug!(image_id = %image_id, vehicle_id = %vehicle.id, "Image linked");
        Ok(true)
    }

    /// Unlink protocol.
    ///
    /// 1. Load the vehicle; if it does not exist, stop.
    /// 2. Remove the image ID from its list and persist the vehicle.
    /// 3. Clear `vehicleId` and `vehicleName` on the image.
    pub(super) async fn unlink(
        &self,
        image_id: &ImageId,
        vehicle_id: &VehicleId,
    ) -> Result<(), CatalogError> {
        if !self.detach_from_vehicle(image_id, vehicle_id).await? {
            return Ok(());
        }
        self.clear_image_vehicle(image_id).await?;

        debug!(image_id = %image_id, vehicle_id = %vehicle_id, "Image unlinked");
        Ok(())
    }

    /// Steps 1 and 2 of the unlink protocol. Returns `false` when the
    /// vehicle does not exist.
    pub(super) async fn detach_from_vehicle(
        &self,
        image_id: &ImageId,
        vehicle_id: &VehicleId,
    ) -> Result<bool, CatalogError> {
        let Some(mut vehicle) = self.load_vehicle(vehicle_id).await? else {
            debug!(image_id = %image_id, vehicle_id = %vehicle_id, "Vehicle gone, nothing to unlink");
            return Ok(false);
        };

        let before = vehicle.images.len();
        vehicle.images.retain(|id| id != image_id);
        if vehicle.images.len() != before {
            let mut patch = touched(Utc::now())?;
            patch.insert(fields::IMAGES.into(), to_value(&vehicle.images)?);
            self.patch_vehicle(vehicle_id, patch).await?;
        }
        Ok(true)
    }

    /// Clear the image side of an association, leaving the image otherwise intact.
    pub(super) async fn clear_image_vehicle(&self, image_id: &ImageId) -> Result<(), CatalogError> {
        let mut patch = touched(Utc::now())?;
        patch.insert(fields::VEHICLE_ID.into(), Value::Null);
        patch.insert(fields::VEHICLE_NAME.into(), Value::Null);
        self.patch_image(image_id, patch).await
    }

    /// Clear an image's reference to a vehicle being deleted.
    ///
    /// Returns `false` without writing when the image is gone or records a
    /// different owner.
    pub(super) async fn release_image(
        &self,
        image_id: &ImageId,
        vehicle_id: &VehicleId,
    ) -> Result<bool, CatalogError> {
        let Some(image) = self.load_image(image_id).await? else {
            debug!(image_id = %image_id, "Listed image no longer exists");
            return Ok(false);
        };
        if image.vehicle_id.as_ref().is_some_and(|owner| owner != vehicle_id) {
            return Ok(false);
        }
        self.clear_image_vehicle(image_id).await?;
        Ok(true)
    }
}
