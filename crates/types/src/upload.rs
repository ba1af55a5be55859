// crates/types/src/upload.rs
//! Upload decisions, upload modes and the upload endpoint's wire shapes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::report::ReportId;

/// The user's answer when a report already exists for the upload's key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadDecision {
    Override,
    SaveAsNew,
    Cancel,
}

impl FromStr for UploadDecision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "override" | "o" => Ok(UploadDecision::Override),
            "new" | "save-as-new" | "save_as_new" | "n" => Ok(UploadDecision::SaveAsNew),
            "cancel" | "c" => Ok(UploadDecision::Cancel),
            other => Err(format!("unknown upload decision: {other}")),
        }
    }
}

/// How the backend should treat an upload. Exactly one mode per call, so
/// `override` and `save_as_new` can never both be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadMode {
    /// No existing report was found for the key.
    Fresh,
    /// Replace the existing report for the key.
    Override,
    /// Keep the existing report and add another under the same key.
    SaveAsNew,
}

impl UploadMode {
    pub fn override_existing(self) -> bool {
        matches!(self, UploadMode::Override)
    }

    pub fn save_as_new(self) -> bool {
        matches!(self, UploadMode::SaveAsNew)
    }
}

impl fmt::Display for UploadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UploadMode::Fresh => "fresh",
            UploadMode::Override => "override",
            UploadMode::SaveAsNew => "save_as_new",
        })
    }
}

/// A file picked for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// `POST /upload-report` success body.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub report: UploadedReport,
}

/// The report the backend created or replaced. Only `file_name` is
/// guaranteed to be present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedReport {
    #[serde(default)]
    pub id: Option<ReportId>,
    pub file_name: String,
    #[serde(default)]
    pub file_type: Option<String>,
}
