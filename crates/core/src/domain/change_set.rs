// Change Set Domain Model

use serde::{Deserialize, Serialize};

/// Change set ID (opaque, service-assigned)
pub type ChangeSetId = String;

/// Change Set Status
///
/// Only the non-terminal set is closed-world. Any status the service reports
/// that is not `AwaitingUpload`, `Queued` or `Processing` is terminal, including
/// statuses this enum does not name (kept in `Other`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChangeSetStatus {
    AwaitingUpload,
    Queued,
    Processing,
    Done,
    Failed,
    Other(String),
}

impl ChangeSetStatus {
    /// True while the service is still waiting for or working on the upload
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            ChangeSetStatus::AwaitingUpload | ChangeSetStatus::Queued | ChangeSetStatus::Processing
        )
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_in_flight()
    }

    /// Wire name as the services spell it
    pub fn as_str(&self) -> &str {
        match self {
            ChangeSetStatus::AwaitingUpload => "WaitingUpload",
            ChangeSetStatus::Queued => "Queued",
            ChangeSetStatus::Processing => "Processing",
            ChangeSetStatus::Done => "Done",
            ChangeSetStatus::Failed => "Failed",
            ChangeSetStatus::Other(s) => s,
        }
    }
}

impl From<&str> for ChangeSetStatus {
    fn from(s: &str) -> Self {
        // Services compare status names case-insensitively
        match s.trim().to_ascii_lowercase().as_str() {
            "waitingupload" | "awaitingupload" => ChangeSetStatus::AwaitingUpload,
            "queued" => ChangeSetStatus::Queued,
            "processing" => ChangeSetStatus::Processing,
            "done" => ChangeSetStatus::Done,
            "failed" => ChangeSetStatus::Failed,
            _ => ChangeSetStatus::Other(s.to_string()),
        }
    }
}

impl From<String> for ChangeSetStatus {
    fn from(s: String) -> Self {
        ChangeSetStatus::from(s.as_str())
    }
}

impl From<ChangeSetStatus> for String {
    fn from(status: ChangeSetStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for ChangeSetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Change set handle (one status snapshot returned by the service)
///
/// Handles are never mutated by the poller: every status check produces a
/// fresh snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSetHandle {
    pub id: ChangeSetId,
    pub status: ChangeSetStatus,

    /// Pre-signed upload URL, present only while awaiting upload
    #[serde(default, alias = "uploadURL", skip_serializing_if = "Option::is_none")]
    pub upload_url: Option<String>,

    /// Present on successful completion
    #[serde(default, alias = "resultsURL", skip_serializing_if = "Option::is_none")]
    pub results_url: Option<String>,

    /// Present when some records could not be applied
    #[serde(default, alias = "errorsURL", skip_serializing_if = "Option::is_none")]
    pub errors_url: Option<String>,
}

impl ChangeSetHandle {
    pub fn new(id: impl Into<String>, status: ChangeSetStatus) -> Self {
        Self {
            id: id.into(),
            status,
            upload_url: None,
            results_url: None,
            errors_url: None,
        }
    }

    pub fn with_upload_url(mut self, url: impl Into<String>) -> Self {
        self.upload_url = Some(url.into());
        self
    }

    pub fn with_results_url(mut self, url: impl Into<String>) -> Self {
        self.results_url = Some(url.into());
        self
    }

    pub fn with_errors_url(mut self, url: impl Into<String>) -> Self {
        self.errors_url = Some(url.into());
        self
    }
}

/// Change set creation request (identifies the bulk context)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "service", rename_all = "snake_case")]
pub enum ChangeSetRequest {
    /// Node upserts into one organizer tree
    Organizer { forest_id: String, tree_id: String },
    /// Property set upserts (service-wide, no required fields)
    PropertySet,
}

impl ChangeSetRequest {
    pub fn organizer(forest_id: impl Into<String>, tree_id: impl Into<String>) -> Self {
        ChangeSetRequest::Organizer {
            forest_id: forest_id.into(),
            tree_id: tree_id.into(),
        }
    }

    /// Reject requests the service would refuse anyway
    pub fn validate(&self) -> crate::domain::error::Result<()> {
        if let ChangeSetRequest::Organizer { forest_id, tree_id } = self {
            if forest_id.trim().is_empty() {
                return Err(crate::domain::DomainError::ValidationError(
                    "forest_id cannot be empty".to_string(),
                ));
            }
            if tree_id.trim().is_empty() {
                return Err(crate::domain::DomainError::ValidationError(
                    "tree_id cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn service_name(&self) -> &'static str {
        match self {
            ChangeSetRequest::Organizer { .. } => "organizer",
            ChangeSetRequest::PropertySet => "pset",
        }
    }
}
