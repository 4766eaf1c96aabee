//! Blob storage failures.

use thiserror::Error;

/// Errors raised by [`BlobStore`](super::BlobStore) implementations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The upload is bigger than `blob.max_file_size`.
    #[error("upload of {size} bytes exceeds the {max} byte limit")]
    TooLarge {
        /// Upload size.
        size: u64,
        /// Configured limit.
        max: u64,
    },

    /// The upload is not an accepted image type.
    #[error("unsupported image type '{content_type}'")]
    UnsupportedType {
        /// Declared MIME type.
        content_type: String,
    },

    /// The locator is empty or names a directory.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// No object under the locator.
    #[error("no stored file at {locator}")]
    Missing {
        /// Locator or backend message.
        locator: String,
    },

    /// The provider cannot sign URLs and no public base URL is configured.
    #[error("cannot build a public URL; set blob.public_base_url")]
    NoPublicUrl,

    /// Provider settings are incomplete or rejected.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// The provider failed the request.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl StorageError {
    /// Upload over the size limit.
    #[must_use]
    pub fn too_large(size: u64, max: u64) -> Self {
        Self::TooLarge { size, max }
    }

    /// Upload of an unaccepted type.
    #[must_use]
    pub fn unsupported_type(content_type: impl Into<String>) -> Self {
        Self::UnsupportedType {
            content_type: content_type.into(),
        }
    }

    /// Bad provider settings.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Provider-side failure.
    #[must_use]
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Whether the upload itself was refused, as opposed to the backend failing.
    #[must_use]
    pub const fn is_rejected_upload(&self) -> bool {
        matches!(
            self,
            Self::TooLarge { .. } | Self::UnsupportedType { .. } | Self::InvalidKey(_)
        )
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::Missing {
                locator: err.to_string(),
            },
            opendal::ErrorKind::Unsupported => Self::NoPublicUrl,
            _ => Self::Backend(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_uploads() {
        assert!(StorageError::too_large(20, 10).is_rejected_upload());
        assert!(StorageError::unsupported_type("text/plain").is_rejected_upload());
        assert!(!StorageError::backend("timeout").is_rejected_upload());
        assert!(!StorageError::NoPublicUrl.is_rejected_upload());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            StorageError::too_large(2048, 1024).to_string(),
            "upload of 2048 bytes exceeds the 1024 byte limit"
        );
        assert_eq!(
            StorageError::unsupported_type("application/pdf").to_string(),
            "unsupported image type 'application/pdf'"
        );
    }
}
