//! Demo catalog seeder for development.
//!
//! Seeds the default categories and site settings, then a handful of demo
//! vehicles with CDN-hosted photos. Vehicles are only added to an empty
//! catalog, so the seeder can be re-run safely.
//!
//! Usage: cargo run --bin seeder [-- --reset]

use std::sync::Arc;

use anyhow::Context;
use ndiambour_core::catalog::{CatalogService, CategoryId, NewImage, NewVehicle};
use ndiambour_core::settings::SettingsService;
use ndiambour_core::storage::{StorageConfig, StorageService};
use ndiambour_db::StoreBackend;
use ndiambour_shared::AppConfig;
use serde_json::{Map, Value, json};
use tracing::{info, warn};

const DEMO_CLOUD: &str = "https://res.cloudinary.com/ndiambour/image/upload";

struct DemoVehicle {
    make: &'static str,
    model: &'static str,
    year: i32,
    attributes: Value,
    photos: &'static [(&'static str, &'static str)],
}

fn demo_vehicles() -> Vec<DemoVehicle> {
    vec![
        DemoVehicle {
            make: "Toyota",
            model: "Corolla",
            year: 2020,
            attributes: json!({ "type": "berline", "price": 35000, "seats": 5, "transmission": "automatique" }),
            photos: &[
                (CategoryId::VEHICLES, "v1/demo/corolla-front.jpg"),
                (CategoryId::INTERIORS, "v1/demo/corolla-dash.jpg"),
            ],
        },
        DemoVehicle {
            make: "Hyundai",
            model: "Tucson",
            year: 2022,
            attributes: json!({ "type": "suv", "price": 50000, "seats": 5, "transmission": "automatique" }),
            photos: &[
                (CategoryId::VEHICLES, "v1/demo/tucson-side.jpg"),
                (CategoryId::EXTERIORS, "v1/demo/tucson-rims.jpg"),
            ],
        },
        DemoVehicle {
            make: "Toyota",
            model: "Hiace",
            year: 2019,
            attributes: json!({ "type": "minibus", "price": 75000, "seats": 14, "transmission": "manuelle" }),
            photos: &[(CategoryId::VEHICLES, "v1/demo/hiace.jpg")],
        },
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ndiambour=info,seeder=info".into()),
        )
        .init();

    let reset = std::env::args().any(|arg| arg == "--reset");
    let config = AppConfig::load().context("failed to load configuration")?;

    let store = Arc::new(
        StoreBackend::open(&config.store)
            .await
            .context("failed to open document store")?,
    );
    let storage = StorageService::from_config(StorageConfig::from_settings(&config.blob)?)?;
    let catalog = CatalogService::new(Arc::clone(&store), Arc::new(storage));
    let settings = SettingsService::new(store);

    if reset {
        warn!("Clearing every collection");
        catalog.clear_all().await?;
    }

    let seeded = catalog.init().await?;
    info!(seeded, "Categories ready");
    if settings.init().await? {
        info!("Default site settings written");
    }

    if !catalog.list_vehicles().await?.is_empty() {
        info!("Catalog already has vehicles, skipping demo data");
        return Ok(());
    }

    let mut images = 0;
    for demo in demo_vehicles() {
        let attributes: Map<String, Value> = match demo.attributes {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let vehicle = catalog
            .add_vehicle(NewVehicle {
                make: demo.make.to_string(),
                model: demo.model.to_string(),
                year: Some(demo.year),
                attributes,
            })
            .await?;

        for (category, path) in demo.photos {
            catalog
                .add_image(NewImage {
                    category: Some(CategoryId::new(*category)),
                    src: format!("{DEMO_CLOUD}/{path}"),
                    vehicle_id: Some(vehicle.id.clone()),
                    title: Some(vehicle.display_name()),
                    alt: Some(vehicle.display_name()),
                    ..NewImage::default()
                })
                .await?;
            images += 1;
        }
        info!(vehicle_id = %vehicle.id, name = %vehicle.display_name(), "Seeded vehicle");
    }

    info!(images, "Seeding complete");
    Ok(())
}
