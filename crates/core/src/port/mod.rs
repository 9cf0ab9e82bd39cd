// Port Layer - Interfaces for external dependencies

pub mod change_set_service;
pub mod content_transfer;
pub mod jitter; // For deterministic testing
pub mod service_error;
pub mod time_provider;

// Re-exports
pub use change_set_service::ChangeSetService;
pub use content_transfer::{ContentTransfer, NdjsonStream};
pub use jitter::{FixedJitter, JitterSource, UniformJitter};
pub use service_error::{ServiceError, ServiceErrorKind};
pub use time_provider::{MonotonicTimeProvider, TimeProvider};
