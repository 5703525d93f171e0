//! Core data models used throughout Review Harness.
//!
//! These types represent the identifiers, remote handles, records, and
//! analysis results that flow through the ingestion and analysis pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name substituted when no person name can be parsed from a display name.
pub const UNKNOWN_STUDENT: &str = "Unknown Student";

/// Text substituted when the analysis service returns an empty response.
pub const NO_ANALYSIS: &str = "No analysis available.";

/// Content type every staged blob is uploaded with.
pub const STAGED_CONTENT_TYPE: &str = "application/pdf";

/// Opaque identifier of a blob in the source store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata returned by the source store for a single file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileMetadata {
    #[serde(default)]
    pub name: Option<String>,
}

/// Handle to a blob already registered in the remote analysis store.
///
/// Field names follow the remote store's camelCase JSON so that listing and
/// upload responses deserialize directly into this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteBlobHandle {
    /// Resource name (e.g. `"files/abc123"`).
    pub name: String,
    /// Dereferenceable URI passed to the analysis service.
    pub uri: String,
    /// Display name the blob was uploaded with; the catalog cache key.
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expiration_time: Option<DateTime<Utc>>,
}

/// A reference that made it through ingestion.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub identifier: FileId,
    pub display_name: String,
    pub resolved_name: String,
    pub remote: RemoteBlobHandle,
}

/// Analysis output for one [`FileRecord`], in its persisted shape.
///
/// Field names and order are consumed by downstream rendering and must not
/// change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub file_name: String,
    pub file_id: String,
    pub student_name: String,
    pub analysis: String,
}

impl AnalysisResult {
    pub fn from_record(record: &FileRecord, analysis: String) -> Self {
        Self {
            file_name: record.display_name.clone(),
            file_id: record.identifier.to_string(),
            student_name: record.resolved_name.clone(),
            analysis,
        }
    }
}

/// One row of the name roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterRow {
    Named {
        first_name: String,
        last_name: String,
        link: String,
    },
    Failed {
        reason: &'static str,
        link: String,
    },
}

impl RosterRow {
    /// Cells in sheet order: first name, last name, link.
    ///
    /// Failed rows carry `"ERROR"` in the first column and the reason in the
    /// second.
    pub fn cells(&self) -> [&str; 3] {
        match self {
            RosterRow::Named {
                first_name,
                last_name,
                link,
            } => [first_name, last_name, link],
            RosterRow::Failed { reason, link } => ["ERROR", reason, link],
        }
    }
}
