//! Blob storage settings.

use std::path::PathBuf;

use ndiambour_shared::config::{BlobConfig, BlobProviderKind};

use super::error::StorageError;

/// Where image files are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageProvider {
    /// S3-compatible bucket (R2, Supabase, AWS, Spaces).
    S3 {
        /// Endpoint URL.
        endpoint: String,
        /// Bucket name.
        bucket: String,
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Region, `auto` for R2.
        region: String,
    },
    /// Azure Blob Storage container.
    AzureBlob {
        /// Storage account.
        account: String,
        /// Account key.
        access_key: String,
        /// Container name.
        container: String,
    },
    /// Directory on the local disk, served by the API under `/media`.
    LocalFs {
        /// Directory holding the files.
        root: PathBuf,
    },
    /// Process memory; contents vanish on exit.
    Memory,
}

impl StorageProvider {
    /// S3-compatible provider.
    #[must_use]
    pub fn s3(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Azure provider.
    #[must_use]
    pub fn azure_blob(
        account: impl Into<String>,
        access_key: impl Into<String>,
        container: impl Into<String>,
    ) -> Self {
        Self::AzureBlob {
            account: account.into(),
            access_key: access_key.into(),
            container: container.into(),
        }
    }

    /// Local directory provider.
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Short name for logs and health output.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::AzureBlob { .. } => "azure_blob",
            Self::LocalFs { .. } => "local",
            Self::Memory => "memory",
        }
    }

    /// Bucket, container or directory the files land in.
    #[must_use]
    pub fn bucket(&self) -> &str {
        match self {
            Self::S3 { bucket, .. } => bucket,
            Self::AzureBlob { container, .. } => container,
            Self::LocalFs { root } => root.to_str().unwrap_or("local"),
            Self::Memory => "memory",
        }
    }
}

/// Provider plus upload limits and URL policy.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Where files go.
    pub provider: StorageProvider,
    /// Largest accepted upload, in bytes.
    pub max_file_size: u64,
    /// Prefix of public file URLs. Without it, URLs are presigned.
    pub public_base_url: Option<String>,
    /// Lifetime of presigned URLs, in seconds.
    pub presign_download_ttl_secs: u64,
    /// Accepted image MIME types.
    pub allowed_mime_types: Vec<String>,
}

impl StorageConfig {
    /// 10 MiB.
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
    /// One week.
    pub const DEFAULT_DOWNLOAD_TTL: u64 = 7 * 24 * 3600;
    /// URL prefix under which the API serves the local provider's files.
    pub const LOCAL_PUBLIC_PREFIX: &'static str = "/media";
    /// Image types accepted by default.
    pub const DEFAULT_MIME_TYPES: [&'static str; 5] =
        ["image/png", "image/jpeg", "image/gif", "image/webp", "image/avif"];

    /// Defaults for `provider`: 10 MiB limit, presigned URLs, common image types.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
            public_base_url: None,
            presign_download_ttl_secs: Self::DEFAULT_DOWNLOAD_TTL,
            allowed_mime_types: Self::DEFAULT_MIME_TYPES.map(String::from).to_vec(),
        }
    }

    /// Translate the `blob` configuration section.
    ///
    /// The local provider gets [`Self::LOCAL_PUBLIC_PREFIX`] as its public
    /// base URL unless one is configured.
    ///
    /// # Errors
    ///
    /// Fails when a setting the selected provider needs is missing.
    pub fn from_settings(settings: &BlobConfig) -> Result<Self, StorageError> {
        let need = |value: Option<&String>, field: &str| {
            value
                .cloned()
                .ok_or_else(|| StorageError::configuration(format!("blob.{field} is required")))
        };

        let provider = match settings.provider {
            BlobProviderKind::Local => StorageProvider::local_fs(settings.root.clone()),
            BlobProviderKind::Memory => StorageProvider::Memory,
            BlobProviderKind::S3 => StorageProvider::s3(
                need(settings.endpoint.as_ref(), "endpoint")?,
                need(settings.bucket.as_ref(), "bucket")?,
                need(settings.access_key_id.as_ref(), "access_key_id")?,
                need(settings.secret_access_key.as_ref(), "secret_access_key")?,
                settings.region.clone().unwrap_or_else(|| "auto".to_string()),
            ),
            BlobProviderKind::AzureBlob => StorageProvider::azure_blob(
                need(settings.account.as_ref(), "account")?,
                need(settings.access_key.as_ref(), "access_key")?,
                need(settings.container.as_ref(), "container")?,
            ),
        };

        let public_base_url = match (&settings.public_base_url, &provider) {
            (Some(url), _) => Some(url.clone()),
            (None, StorageProvider::LocalFs { .. }) => Some(Self::LOCAL_PUBLIC_PREFIX.to_string()),
            (None, _) => None,
        };

        let config = Self::new(provider).with_max_file_size(settings.max_file_size);
        Ok(match public_base_url {
            Some(url) => config.with_public_base_url(url),
            None => config,
        })
    }

    /// Override the upload limit.
    #[must_use]
    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Serve files under `url`; a trailing slash is dropped.
    #[must_use]
    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.public_base_url = Some(url.trim_end_matches('/').to_string());
        self
    }

    /// Whether uploads of `mime_type` are accepted.
    #[must_use]
    pub fn is_mime_type_allowed(&self, mime_type: &str) -> bool {
        self.allowed_mime_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(mime_type))
    }
}
