//! Site-wide settings stored as a single document.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::store::{
    Document, DocumentStore, ID_FIELD, StoreError, collections, from_document, to_document,
};

/// ID of the settings document.
pub const SETTINGS_ID: &str = "site";

/// Site settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteSettings {
    /// Name shown in page titles.
    pub site_name: String,
    /// Currency prices are quoted in.
    pub currency: String,
    /// Interface language.
    pub language: String,
    /// Any other setting.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_name: "Ndiambour Location".to_string(),
            currency: "FCFA".to_string(),
            language: "fr".to_string(),
            extra: Map::new(),
        }
    }
}

/// Reads and merges site settings.
pub struct SettingsService<S: DocumentStore> {
    store: Arc<S>,
}

impl<S: DocumentStore> Clone for SettingsService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: DocumentStore> SettingsService<S> {
    /// Create a new settings service.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Write the default settings if none are stored. Returns whether it wrote.
    pub async fn init(&self) -> Result<bool, StoreError> {
        if self
            .store
            .get_by_id(collections::SETTINGS, SETTINGS_ID)
            .await?
            .is_some()
        {
            return Ok(false);
        }
        self.store
            .create(collections::SETTINGS, settings_document(&SiteSettings::default())?)
            .await?;
        info!("Default site settings seeded");
        Ok(true)
    }

    /// Current settings; defaults when none are stored.
    pub async fn get(&self) -> Result<SiteSettings, StoreError> {
        match self
            .store
            .get_by_id(collections::SETTINGS, SETTINGS_ID)
            .await?
        {
            Some(mut doc) => {
                doc.remove(ID_FIELD);
                from_document(doc)
            }
            None => Ok(SiteSettings::default()),
        }
    }

    /// Merge `updates` into the stored settings and return the result.
    ///
    /// Top-level keys replace existing ones; a `null` value removes a setting,
    /// which for the named settings means falling back to the default. The
    /// document ID cannot be changed.
    pub async fn update(&self, mut updates: Document) -> Result<SiteSettings, StoreError> {
        updates.remove(ID_FIELD);
        self.init().await?;
        self.store
            .update(collections::SETTINGS, SETTINGS_ID, updates)
            .await?;
        self.get().await
    }
}

fn settings_document(settings: &SiteSettings) -> Result<Document, StoreError> {
    let mut doc = to_document(settings)?;
    doc.insert(ID_FIELD.to_string(), Value::from(SETTINGS_ID));
    Ok(doc)
}
