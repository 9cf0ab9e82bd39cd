// Change set records (upload payload, results and errors)

use serde::{Deserialize, Serialize};

/// One unit of bulk work, serialized as a single NDJSON line
///
/// Records are independent; the service gives no ordering guarantee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeRecord(serde_json::Value);

impl ChangeRecord {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Build a record from any serializable change (e.g. `NodeChange`, `PSetChange`)
    pub fn from_change<T: Serialize>(change: &T) -> Result<Self, serde_json::Error> {
        Ok(Self(serde_json::to_value(change)?))
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Organizer node upsert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeChange {
    /// Optional, the service generates an ID when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<String>>,
}

/// Property set upsert, keyed by (library, definition, link)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PSetChange {
    pub library_id: String,
    pub definition_id: String,
    pub link: String,
    #[serde(default)]
    pub props: serde_json::Map<String, serde_json::Value>,
}

/// One line of a change set results document (created/updated entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultRecord(serde_json::Value);

impl ResultRecord {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Best-effort identity for display (`id`, else `link`)
    pub fn identity(&self) -> Option<&str> {
        self.0
            .get("id")
            .or_else(|| self.0.get("link"))
            .and_then(|v| v.as_str())
    }
}

/// One line of a change set errors document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    #[serde(default, alias = "errorcode", alias = "errorCode")]
    pub code: String,
    #[serde(default)]
    pub message: String,
    /// Identity of the record the service could not apply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<serde_json::Value>,
}
