use thiserror::Error;

/// Client-side errors for job service operations
///
/// Every variant is rendered inline at the view boundary; nothing here
/// crashes a view.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport or connectivity failure (includes body-decode failures)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The requested job does not exist
    #[error("Job not found: {0}")]
    NotFound(i64),

    /// The service rejected the payload
    #[error("{0}")]
    Validation(String),

    /// The action is not permitted in the job's current state
    #[error("{0}")]
    StateConflict(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;
