// ── Provenance files ──

use serde::Serialize;

use super::cell::ValidationMessage;
use super::ids::FileId;

/// An imported file that produced entities and attributes.
///
/// Timestamps are kept as the display strings the service renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContainer {
    pub id: FileId,
    pub name: String,
    pub ext: String,
    pub full_name: String,
    pub created_by: String,
    pub created_at: String,
    pub loaded_at: String,
    pub modified_at: String,
    pub messages: Vec<ValidationMessage>,
}

impl FileContainer {
    /// The import itself reported problems.
    pub fn has_errors(&self) -> bool {
        !self.messages.is_empty()
    }
}

/// Outcome of checking an exported document against the metadata service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub passed: bool,
    /// The service's explanation, when it gave one.
    pub message: Option<String>,
}
