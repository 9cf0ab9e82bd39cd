// Domain Layer - Pure change set entities

pub mod change_set;
pub mod error;
pub mod record;

// Re-exports
pub use change_set::{ChangeSetHandle, ChangeSetId, ChangeSetRequest, ChangeSetStatus};
pub use error::DomainError;
pub use record::{ChangeRecord, ErrorRecord, NodeChange, PSetChange, ResultRecord};
