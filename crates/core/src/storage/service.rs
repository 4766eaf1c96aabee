//! Storage service implementation using Apache OpenDAL.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use ndiambour_shared::types::ImageId;
use opendal::{Operator, services};
use tracing::debug;

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;

/// Binary object storage used for catalog images.
///
/// A locator is the storage key returned by [`BlobStore::upload`].
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `path` and return its locator.
    fn upload(
        &self,
        bytes: Bytes,
        path: &str,
        content_type: &str,
    ) -> impl Future<Output = Result<String, StorageError>> + Send;

    /// Resolve a locator to a URL clients can fetch.
    fn resolve_url(&self, locator: &str)
    -> impl Future<Output = Result<String, StorageError>> + Send;

    /// Delete an object. Deleting a missing object is not an error.
    fn delete(&self, locator: &str) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Recover the locator of an object from its public URL.
    ///
    /// Returns `None` when the URL does not point into this store.
    fn managed_locator(&self, url: &str) -> Option<String>;

    /// Check an upload against size and content-type limits.
    fn validate_upload(&self, content_type: &str, size: u64) -> Result<(), StorageError>;
}

/// Storage service for catalog images.
#[derive(Debug)]
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl StorageService {
    /// Open the configured provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider rejects its settings.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = match &config.provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => build(
                services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region),
            )?,
            StorageProvider::AzureBlob {
                account,
                access_key,
                container,
            } => build(
                services::Azblob::default()
                    .account_name(account)
                    .account_key(access_key)
                    .container(container),
            )?,
            StorageProvider::LocalFs { root } => {
                let root = root
                    .to_str()
                    .ok_or_else(|| StorageError::configuration("blob.root is not valid UTF-8"))?;
                build(services::Fs::default().root(root))?
            }
            StorageProvider::Memory => build(services::Memory::default())?,
        };
        Ok(Self { operator, config })
    }

    /// Generate the storage key for an uploaded image.
    ///
    /// Format: `images/{image_id}/{sanitized_filename}`
    #[must_use]
    pub fn image_key(image_id: &ImageId, filename: &str) -> String {
        let sanitized = sanitize_filename(filename);
        let name = if sanitized.is_empty() {
            "upload".to_string()
        } else {
            sanitized
        };
        format!("images/{image_id}/{name}")
    }

    /// Check if a file exists in storage.
    pub async fn exists(&self, key: &str) -> bool {
        self.operator.stat(key).await.is_ok()
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the bucket/container name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        self.config.provider.bucket()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

impl BlobStore for StorageService {
    async fn upload(
        &self,
        bytes: Bytes,
        path: &str,
        content_type: &str,
    ) -> Result<String, StorageError> {
        if path.is_empty() || path.ends_with('/') {
            return Err(StorageError::InvalidKey(path.to_string()));
        }
        self.validate_upload(content_type, bytes.len() as u64)?;

        let content_type_supported = self
            .operator
            .info()
            .full_capability()
            .write_with_content_type;

        if content_type_supported {
            self.operator
                .write_with(path, bytes)
                .content_type(content_type)
                .await?;
        } else {
            self.operator.write(path, bytes).await?;
        }

        debug!(key = %path, provider = self.provider_name(), "Blob uploaded");
        Ok(path.to_string())
    }

    async fn resolve_url(&self, locator: &str) -> Result<String, StorageError> {
        if let Some(base) = &self.config.public_base_url {
            return Ok(format!("{base}/{}", locator.trim_start_matches('/')));
        }

        let ttl = Duration::from_secs(self.config.presign_download_ttl_secs);
        let presigned = self
            .operator
            .presign_read(locator, ttl)
            .await
            .map_err(StorageError::from)?;

        Ok(presigned.uri().to_string())
    }

    async fn delete(&self, locator: &str) -> Result<(), StorageError> {
        self.operator
            .delete(locator)
            .await
            .map_err(StorageError::from)
    }

    fn managed_locator(&self, url: &str) -> Option<String> {
        let base = self.config.public_base_url.as_deref()?;
        url.strip_prefix(base)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|key| !key.is_empty())
            .map(str::to_string)
    }

    fn validate_upload(&self, content_type: &str, size: u64) -> Result<(), StorageError> {
        // Check file size
        if size > self.config.max_file_size {
            return Err(StorageError::too_large(
                size,
                self.config.max_file_size,
            ));
        }

        // Check MIME type
        if !self.config.is_mime_type_allowed(content_type) {
            return Err(StorageError::unsupported_type(content_type));
        }

        Ok(())
    }
}

/// Sanitize filename for storage key.
///
/// Removes or replaces characters that could cause issues in storage paths.
/// Only allows ASCII alphanumeric characters, dots, hyphens, and underscores.
fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn build(builder: impl opendal::Builder) -> Result<Operator, StorageError> {
    Ok(Operator::new(builder)
        .map_err(|e| StorageError::configuration(e.to_string()))?
        .finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_service() -> StorageService {
        let config = StorageConfig::new(StorageProvider::Memory)
            .with_public_base_url("https://media.example.com/catalog");
        StorageService::from_config(config).expect("memory storage")
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("corolla.jpg"), "corolla.jpg");
        assert_eq!(sanitize_filename("my photo (1).jpg"), "my_photo__1_.jpg");
        assert_eq!(sanitize_filename("intérieur.png"), "int_rieur.png");
    }

    #[test]
    fn test_image_key() {
        let id: ImageId = "img-1".parse().unwrap();
        assert_eq!(
            StorageService::image_key(&id, "Front View.jpg"),
            "images/img-1/Front_View.jpg"
        );
        assert_eq!(StorageService::image_key(&id, ""), "images/img-1/upload");
    }

    #[tokio::test]
    async fn test_upload_resolve_delete_roundtrip() {
        let service = memory_service();
        let locator = service
            .upload(Bytes::from_static(b"jpeg"), "images/a/front.jpg", "image/jpeg")
            .await
            .unwrap();

        assert_eq!(locator, "images/a/front.jpg");
        assert!(service.exists(&locator).await);

        let url = service.resolve_url(&locator).await.unwrap();
        assert_eq!(url, "https://media.example.com/catalog/images/a/front.jpg");
        assert_eq!(service.managed_locator(&url), Some(locator.clone()));

        service.delete(&locator).await.unwrap();
        assert!(!service.exists(&locator).await);

        // Deleting twice is fine
        service.delete(&locator).await.unwrap();
    }

    #[tokio::test]
    async fn test_upload_rejects_invalid_mime_type() {
        let service = memory_service();
        let err = service
            .upload(Bytes::from_static(b"%PDF"), "images/a/doc.pdf", "application/pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::UnsupportedType { .. }));
    }

    #[test]
    fn test_validate_upload_size() {
        let config = StorageConfig::new(StorageProvider::Memory).with_max_file_size(1024);
        let service = StorageService::from_config(config).expect("should create service");

        assert!(service.validate_upload("image/png", 512).is_ok());

        let err = service.validate_upload("image/png", 2048).unwrap_err();
        assert!(matches!(err, StorageError::TooLarge { .. }));
    }

    #[test]
    fn test_managed_locator_foreign_urls() {
        let service = memory_service();
        assert_eq!(
            service.managed_locator("https://res.cloudinary.com/demo/image/upload/car.jpg"),
            None
        );
        assert_eq!(
            service.managed_locator("https://media.example.com/catalog/"),
            None
        );
        assert_eq!(
            service.managed_locator("https://media.example.com/catalogue/x.jpg"),
            None
        );
    }

    #[tokio::test]
    async fn test_resolve_without_public_url_needs_presign() {
        let service =
            StorageService::from_config(StorageConfig::new(StorageProvider::Memory)).unwrap();
        let err = service.resolve_url("images/a/front.jpg").await.unwrap_err();
        assert!(matches!(err, StorageError::NoPublicUrl));
        assert_eq!(service.managed_locator("images/a/front.jpg"), None);
    }
}
