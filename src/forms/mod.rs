//! Input validation and payload building for the create/edit views.
//!
//! Each form is a pure input-to-payload step: validate, convert the local
//! schedule time to UTC, and produce the request DTO. Submission and
//! navigation stay in the UI layer.

pub mod bulk;
pub mod edit;
pub mod email;
pub mod schedule;
pub mod upload;

use thiserror::Error;
use validator::ValidationErrors;

/// Why a form refused to build its payload
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Scheduled time is required")]
    MissingTime,

    #[error("Frequency is required for interval jobs")]
    MissingFrequency,

    #[error("Invalid scheduled time: {0}")]
    BadTime(String),

    #[error("Please select a file")]
    MissingFile,

    #[error("{0}")]
    Invalid(String),
}

/// Flatten validator output to the first human-readable message
pub(crate) fn first_message(errors: &ValidationErrors) -> FormError {
    let msg = errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .next()
        .unwrap_or_else(|| "Validation failed".to_string());
    FormError::Invalid(msg)
}
