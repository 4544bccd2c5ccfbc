use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One tracked project and the public locator of its correspondence folder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub name: String,
    /// Opaque provider reference; passed through, never interpreted.
    pub folder_locator: String,
}

/// One file entry in a remote folder listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFileMeta {
    pub name: String,
    pub path: String,
    pub modified: DateTime<Utc>,
    pub size: u64,
    pub mime_type: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub file_name: String,
    pub modified: DateTime<Utc>,
    pub text: String,
}

/// Inline failure for one file of a batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub file_name: String,
    pub error: String,
    pub kind: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FulltextEntry {
    Document(ExtractedDocument),
    Error(ErrorEntry),
}

impl FulltextEntry {
    pub fn file_name(&self) -> &str {
        match self {
            FulltextEntry::Document(d) => &d.file_name,
            FulltextEntry::Error(e) => &e.file_name,
        }
    }
}

/// Result of a fulltext window over an object's PDF/DOCX files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulltextPage {
    /// Count of PDF/DOCX files for the object, independent of the window.
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
    pub files: Vec<FulltextEntry>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Finance,
    Progress,
    Quality,
    Approval,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub direction: Direction,
    pub topic: Topic,
    pub risk: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAnalysis {
    pub file_name: String,
    pub classification: ClassificationResult,
    pub preview: String,
}
