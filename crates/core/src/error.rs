// Central Error Type for the Application

use crate::port::ServiceError;
use thiserror::Error;

/// Application-level error type
///
/// Each remote failure is tagged with the lifecycle step it happened in, so
/// callers can tell a rejected submission from a broken status poll.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Change set submission rejected: {0}")]
    Submission(#[source] ServiceError),

    #[error("Change set upload failed: {0}")]
    Upload(#[source] ServiceError),

    #[error("Change set status check failed: {0}")]
    StatusCheck(#[source] ServiceError),

    #[error("Change set result fetch failed: {0}")]
    Fetch(#[source] ServiceError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// The remote error behind this failure, if any
    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            AppError::Submission(e)
            | AppError::Upload(e)
            | AppError::StatusCheck(e)
            | AppError::Fetch(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
