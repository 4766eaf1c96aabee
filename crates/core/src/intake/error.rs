//! Intake error types.

use ndiambour_shared::AppError;
use thiserror::Error;
use validator::ValidationErrors;

use crate::store::StoreError;

/// Intake errors.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// The submitted form failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Document store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<ValidationErrors> for IntakeError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let reasons: Vec<String> = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map_or_else(|| e.code.to_string(), ToString::to_string)
                    })
                    .collect();
                if field == "__all__" {
                    reasons.join(", ")
                } else {
                    format!("{field}: {}", reasons.join(", "))
                }
            })
            .collect();
        fields.sort();
        if fields.is_empty() {
            fields.push(errors.to_string());
        }
        Self::Validation(fields.join("; "))
    }
}

impl From<IntakeError> for AppError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::Validation(msg) => Self::Validation(msg),
            IntakeError::Store(e) => Self::Store(e.to_string()),
        }
    }
}
