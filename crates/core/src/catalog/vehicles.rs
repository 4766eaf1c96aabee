//! Vehicle operations.

use chrono::Utc;
use ndiambour_shared::types::{ImageId, VehicleId};
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::error::CatalogError;
use super::service::{CatalogService, fields, to_value, touched};
use super::types::{
    NewVehicle, RESERVED_VEHICLE_FIELDS, ReleaseFailure, Vehicle, VehicleDeletion, VehicleUpdate,
};
use crate::storage::BlobStore;
use crate::store::{DocumentStore, ID_FIELD, collections, from_documents, to_document};

impl<S: DocumentStore, B: BlobStore> CatalogService<S, B> {
    /// All vehicles.
    pub async fn list_vehicles(&self) -> Result<Vec<Vehicle>, CatalogError> {
        let docs = self.store.get_all(collections::VEHICLES).await?;
        Ok(from_documents(docs)?)
    }

    /// One vehicle, or `None` if it does not exist.
    pub async fn get_vehicle(&self, id: &VehicleId) -> Result<Option<Vehicle>, CatalogError> {
        self.load_vehicle(id).await
    }

    /// Create a vehicle with an empty image list.
    pub async fn add_vehicle(&self, input: NewVehicle) -> Result<Vehicle, CatalogError> {
        let make = required("make", &input.make)?;
        let model = required("model", &input.model)?;
        check_attributes(&input.attributes)?;

        let now = Utc::now();
        let vehicle = Vehicle {
            id: VehicleId::new(),
            make,
            model,
            year: input.year,
            images: Vec::new(),
            attributes: input.attributes,
            created_at: now,
            updated_at: now,
        };

        self.store
            .create(collections::VEHICLES, to_document(&vehicle)?)
            .await?;

        info!(vehicle_id = %vehicle.id, name = %vehicle.display_name(), "Vehicle created");
        Ok(vehicle)
    }

    /// Update scalar fields and attributes of a vehicle.
    ///
    /// When the display name changes, the cached `vehicleName` of linked
    /// images is refreshed. That refresh is best-effort.
    pub async fn update_vehicle(
        &self,
        id: &VehicleId,
        update: VehicleUpdate,
    ) -> Result<Vehicle, CatalogError> {
        let current = self.require_vehicle(id).await?;
        check_attributes(&update.attributes)?;

        let mut patch = touched(Utc::now())?;
        if let Some(make) = &update.make {
            patch.insert("make".into(), Value::from(required("make", make)?));
        }
        if let Some(model) = &update.model {
            patch.insert("model".into(), Value::from(required("model", model)?));
        }
        if let Some(year) = update.year {
            patch.insert("year".into(), to_value(&year)?);
        }
        patch.extend(update.attributes);

        self.patch_vehicle(id, patch).await?;
        let updated = self.require_vehicle(id).await?;

        let name = updated.display_name();
        if name != current.display_name() {
            self.refresh_vehicle_name(&updated, &name).await;
        }

        info!(vehicle_id = %id, "Vehicle updated");
        Ok(updated)
    }

    /// Delete a vehicle, first clearing the vehicle fields of every image
    /// that references it.
    ///
    /// Images are found both through the vehicle's list and by querying
    /// `vehicleId`, so drifted references are released too. Per-image
    /// failures are collected rather than aborting the deletion.
    pub async fn delete_vehicle(&self, id: &VehicleId) -> Result<VehicleDeletion, CatalogError> {
        let vehicle = self.require_vehicle(id).await?;

        let mut targets = vehicle.images.clone();
        match self
            .store
            .query_equals(
                collections::IMAGES,
                fields::VEHICLE_ID,
                &Value::from(id.as_str()),
            )
            .await
        {
            Ok(docs) => {
                let referencing = docs
                    .iter()
                    .filter_map(|doc| doc.get(ID_FIELD).and_then(Value::as_str))
                    .filter_map(|raw| raw.parse::<ImageId>().ok());
                for image_id in referencing {
                    if !targets.contains(&image_id) {
                        targets.push(image_id);
                    }
                }
            }
            Err(e) => {
                warn!(vehicle_id = %id, error = %e, "Image lookup by vehicle failed, using vehicle list only");
            }
        }

        let mut released = Vec::new();
        let mut failures = Vec::new();
        for image_id in targets {
            match self.release_image(&image_id, id).await {
                Ok(true) => released.push(image_id),
                Ok(false) => {}
                Err(e) => {
                    warn!(vehicle_id = %id, image_id = %image_id, error = %e, "Failed to release image");
                    failures.push(ReleaseFailure {
                        image_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        self.store.delete(collections::VEHICLES, id.as_str()).await?;

        info!(
            vehicle_id = %id,
            released = released.len(),
            failures = failures.len(),
            "Vehicle deleted"
        );
        Ok(VehicleDeletion {
            vehicle,
            released,
            failures,
        })
    }

    /// Images of a vehicle in gallery order, skipping IDs that no longer resolve.
    pub async fn vehicle_gallery(
        &self,
        id: &VehicleId,
    ) -> Result<Vec<super::types::Image>, CatalogError> {
        let vehicle = self.require_vehicle(id).await?;
        let mut gallery = Vec::with_capacity(vehicle.images.len());
        for image_id in &vehicle.images {
            if let Some(image) = self.load_image(image_id).await? {
                gallery.push(image);
            }
        }
        Ok(gallery)
    }

    /// Rewrite the cached name on the images this vehicle owns. Listed
    /// images recorded under another vehicle are left alone.
    async fn refresh_vehicle_name(&self, vehicle: &Vehicle, name: &str) {
        for image_id in &vehicle.images {
            match self.load_image(image_id).await {
                Ok(Some(image)) if image.vehicle_id.as_ref() == Some(&vehicle.id) => {}
                Ok(_) => continue,
                Err(e) => {
                    warn!(image_id = %image_id, error = %e, "Failed to load image for name refresh");
                    continue;
                }
            }
            let mut patch = match touched(Utc::now()) {
                Ok(patch) => patch,
                Err(e) => {
                    warn!(image_id = %image_id, error = %e, "Failed to build name refresh");
                    continue;
                }
            };
            patch.insert(fields::VEHICLE_NAME.into(), Value::from(name));
            if let Err(e) = self.patch_image(image_id, patch).await {
                warn!(image_id = %image_id, error = %e, "Failed to refresh cached vehicle name");
            }
        }
    }
}

fn required(field: &str, value: &str) -> Result<String, CatalogError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CatalogError::validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn check_attributes(attributes: &Map<String, Value>) -> Result<(), CatalogError> {
    match attributes
        .keys()
        .find(|key| RESERVED_VEHICLE_FIELDS.contains(&key.as_str()))
    {
        Some(key) => Err(CatalogError::validation(format!(
            "'{key}' cannot be set as an attribute"
        ))),
        None => Ok(()),
    }
}
