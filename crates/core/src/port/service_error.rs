// Service Error (shared by every port that talks to a remote service)

use thiserror::Error;

/// What went wrong on the remote side, as a matchable tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceErrorKind {
    NotFound,
    Unauthorized,
    RateLimited { retry_after_secs: Option<u64> },
    /// Network failure before a response was received
    Transport,
    /// Response body could not be decoded
    Decode,
    /// Any other non-success response
    Unknown { status: u16, code: Option<String> },
}

impl std::fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceErrorKind::NotFound => write!(f, "not found"),
            ServiceErrorKind::Unauthorized => write!(f, "unauthorized"),
            ServiceErrorKind::RateLimited {
                retry_after_secs: Some(secs),
            } => write!(f, "rate limited (retry after {}s)", secs),
            ServiceErrorKind::RateLimited { retry_after_secs: None } => write!(f, "rate limited"),
            ServiceErrorKind::Transport => write!(f, "transport"),
            ServiceErrorKind::Decode => write!(f, "decode"),
            ServiceErrorKind::Unknown {
                status,
                code: Some(code),
            } => write!(f, "HTTP {} [{}]", status, code),
            ServiceErrorKind::Unknown { status, code: None } => write!(f, "HTTP {}", status),
        }
    }
}

/// Error returned by a remote collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct ServiceError {
    pub kind: ServiceErrorKind,
    pub message: String,
}

impl ServiceError {
    pub fn new(kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::NotFound, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Transport, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Decode, message)
    }
}
