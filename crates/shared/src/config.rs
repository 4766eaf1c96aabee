//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Document store configuration.
    pub store: StoreConfig,
    /// Blob storage configuration.
    pub blob: BlobConfig,
    /// Media CDN configuration.
    pub media: MediaConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Which document store backs the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackendKind {
    /// Local key-value store persisted to a JSON file.
    #[default]
    Local,
    /// Remote document database on PostgreSQL.
    Postgres,
}

/// Document store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Selected backend.
    #[serde(default)]
    pub backend: StoreBackendKind,
    /// File backing the local store.
    #[serde(default = "default_local_path")]
    pub local_path: PathBuf,
    /// Database connection URL for the remote backend.
    #[serde(default)]
    pub database_url: Option<String>,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackendKind::default(),
            local_path: default_local_path(),
            database_url: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
        }
    }
}

fn default_local_path() -> PathBuf {
    PathBuf::from("data/catalog.json")
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Blob storage provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlobProviderKind {
    /// Local filesystem (development only).
    #[default]
    Local,
    /// S3-compatible storage.
    S3,
    /// Azure Blob Storage.
    AzureBlob,
    /// In-process memory (tests only).
    Memory,
}

/// Blob storage configuration.
///
/// Only the fields relevant to the selected provider are read.
#[derive(Debug, Clone, Deserialize)]
pub struct BlobConfig {
    /// Selected provider.
    #[serde(default)]
    pub provider: BlobProviderKind,
    /// Root directory for the local provider.
    #[serde(default = "default_blob_root")]
    pub root: PathBuf,
    /// S3 endpoint URL.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// S3 bucket name.
    #[serde(default)]
    pub bucket: Option<String>,
    /// S3 access key ID.
    #[serde(default)]
    pub access_key_id: Option<String>,
    /// S3 secret access key.
    #[serde(default)]
    pub secret_access_key: Option<String>,
    /// S3 region.
    #[serde(default)]
    pub region: Option<String>,
    /// Azure storage account name.
    #[serde(default)]
    pub account: Option<String>,
    /// Azure storage access key.
    #[serde(default)]
    pub access_key: Option<String>,
    /// Azure container name.
    #[serde(default)]
    pub container: Option<String>,
    /// Public URL prefix under which uploaded blobs are served.
    #[serde(default)]
    pub public_base_url: Option<String>,
    /// Maximum upload size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            provider: BlobProviderKind::default(),
            root: default_blob_root(),
            endpoint: None,
            bucket: None,
            access_key_id: None,
            secret_access_key: None,
            region: None,
            account: None,
            access_key: None,
            container: None,
            public_base_url: None,
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_blob_root() -> PathBuf {
    PathBuf::from("./storage")
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024 // 10 MiB
}

/// Media CDN configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// Host fragment identifying URLs the CDN can transform.
    #[serde(default = "default_cdn_host")]
    pub cdn_host: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            cdn_host: default_cdn_host(),
        }
    }
}

fn default_cdn_host() -> String {
    "cloudinary.com".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("NDIAMBOUR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
