//! Error type shared by every layer, with its HTTP mapping.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Failure of a catalog, intake or settings operation, as seen by callers.
#[derive(Debug, Error)]
pub enum AppError {
    /// The addressed vehicle, image or category does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The input was rejected.
    #[error("invalid input: {0}")]
    Validation(String),

    /// An entity with that ID already exists.
    #[error("{0}")]
    Conflict(String),

    /// The document store failed.
    #[error("document store failure: {0}")]
    Store(String),

    /// The blob store failed.
    #[error("blob storage failure: {0}")]
    Blob(String),

    /// Anything else.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Store(_) | Self::Internal(_) => 500,
            Self::Blob(_) => 502,
        }
    }

    /// Stable code sent in API error bodies.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Store(_) => "STORE_ERROR",
            Self::Blob(_) => "BLOB_STORAGE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// The message without the variant prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(msg)
            | Self::Validation(msg)
            | Self::Conflict(msg)
            | Self::Store(msg)
            | Self::Blob(msg)
            | Self::Internal(msg) => msg,
        }
    }

    /// Whether the message can be shown to an API client.
    ///
    /// Store, blob and internal failures carry backend details.
    #[must_use]
    pub const fn is_client_facing(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::Validation(_) | Self::Conflict(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::NotFound(String::new()), 404, "NOT_FOUND")]
    #[case(AppError::Validation(String::new()), 400, "VALIDATION_ERROR")]
    #[case(AppError::Conflict(String::new()), 409, "CONFLICT")]
    #[case(AppError::Store(String::new()), 500, "STORE_ERROR")]
    #[case(AppError::Blob(String::new()), 502, "BLOB_STORAGE_ERROR")]
    #[case(AppError::Internal(String::new()), 500, "INTERNAL_ERROR")]
    fn test_error_status_and_code(#[case] err: AppError, #[case] status: u16, #[case] code: &str) {
        assert_eq!(err.status_code(), status);
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_display_and_message() {
        let err = AppError::Validation("make is required".into());
        assert_eq!(err.to_string(), "invalid input: make is required");
        assert_eq!(err.message(), "make is required");

        let err = AppError::NotFound("vehicle not found: v1".into());
        assert_eq!(err.to_string(), "vehicle not found: v1");
    }

    #[test]
    fn test_client_facing_errors() {
        assert!(AppError::Validation("x".into()).is_client_facing());
        assert!(AppError::Conflict("x".into()).is_client_facing());
        assert!(!AppError::Store("x".into()).is_client_facing());
        assert!(!AppError::Blob("x".into()).is_client_facing());
    }
}
