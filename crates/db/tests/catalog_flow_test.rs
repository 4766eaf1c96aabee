//! Catalog flows over the local store and in-memory blob storage.

use std::sync::Arc;

use bytes::Bytes;
use ndiambour_core::catalog::{
    CatalogService, Cleanup, ImageUpdate, NewImage, NewVehicle, Upload,
};
use ndiambour_core::storage::{StorageConfig, StorageProvider, StorageService};
use ndiambour_db::LocalStore;

type Catalog = CatalogService<LocalStore, StorageService>;

async fn catalog(store: LocalStore) -> Catalog {
    let storage = StorageService::from_config(
        StorageConfig::new(StorageProvider::Memory)
            .with_public_base_url("https://media.ndiambour.test"),
    )
    .unwrap();
    let catalog = CatalogService::new(Arc::new(store), Arc::new(storage));
    catalog.init().await.unwrap();
    catalog
}

async fn count(catalog: &Catalog, category: &str) -> u64 {
    catalog
        .get_category(&category.into())
        .await
        .unwrap()
        .unwrap()
        .count
}

#[tokio::test]
async fn test_toyota_corolla_scenario() {
    let catalog = catalog(LocalStore::in_memory()).await;

    let vehicle = catalog
        .add_vehicle(NewVehicle {
            make: "Toyota".into(),
            model: "Corolla".into(),
            year: Some(2020),
            ..NewVehicle::default()
        })
        .await
        .unwrap();
    assert!(vehicle.images.is_empty());

    let image = catalog
        .add_image(NewImage {
            category: Some("vehicles".into()),
            vehicle_id: Some(vehicle.id.clone()),
            ..NewImage::default()
        })
        .await
        .unwrap();

    assert_eq!(count(&catalog, "vehicles").await, 1);
    let stored = catalog.get_vehicle(&vehicle.id).await.unwrap().unwrap();
    assert_eq!(stored.images, vec![image.id.clone()]);
    assert_eq!(image.vehicle_name.as_deref(), Some("Toyota Corolla 2020"));

    let moved = catalog
        .update_image(&image.id, ImageUpdate::category("interiors"))
        .await
        .unwrap();
    assert_eq!(count(&catalog, "vehicles").await, 0);
    assert_eq!(count(&catalog, "interiors").await, 1);
    assert_eq!(moved.vehicle_id, Some(vehicle.id.clone()));

    catalog.delete_vehicle(&vehicle.id).await.unwrap();
    let released = catalog.get_image(&image.id).await.unwrap().unwrap();
    assert_eq!(released.vehicle_id, None);
    assert_eq!(released.vehicle_name, None);
    assert!(catalog.get_vehicle(&vehicle.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_uploaded_image_lifecycle_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");

    let image_id = {
        let catalog = catalog(LocalStore::open(&path).await.unwrap()).await;
        let image = catalog
            .upload_image(
                Upload {
                    bytes: Bytes::from_static(b"\x89PNG"),
                    filename: "tableau de bord.png".into(),
                    content_type: "image/png".into(),
                },
                NewImage {
                    category: Some("interiors".into()),
                    ..NewImage::default()
                },
            )
            .await
            .unwrap();
        assert!(image.src.starts_with("https://media.ndiambour.test/images/"));
        assert!(catalog.blobs().exists(image.storage_path.as_deref().unwrap()).await);
        image.id
    };

    let reopened = catalog(LocalStore::open(&path).await.unwrap()).await;
    assert_eq!(count(&reopened, "interiors").await, 1);

    let deletion = reopened.delete_image(&image_id).await.unwrap();
    // the memory blob store did not survive the reopen; deleting is still fine
    assert_eq!(deletion.blob, Cleanup::Done);
    assert_eq!(count(&reopened, "interiors").await, 0);
}

#[tokio::test]
async fn test_reconcile_clean_after_normal_use() {
    let catalog = catalog(LocalStore::in_memory()).await;
    let a = catalog
        .add_vehicle(NewVehicle {
            make: "Hyundai".into(),
            model: "Tucson".into(),
            ..NewVehicle::default()
        })
        .await
        .unwrap();
    for category in ["vehicles", "interiors", "exteriors"] {
        catalog
            .add_image(NewImage {
                category: Some(category.into()),
                vehicle_id: Some(a.id.clone()),
                ..NewImage::default()
            })
            .await
            .unwrap();
    }

    assert!(catalog.reconcile().await.unwrap().is_clean());
}
