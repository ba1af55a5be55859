// crates/core/src/resolver/types.rs
//! Types for the upload conflict workflow.

use report_portal_types::{
    Category, Report, ReportDate, ReportKey, SiteId, UploadFile, UploadedReport,
};

use crate::error::ValidationError;

/// Where the workflow is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    CheckingExisting,
    AwaitingDecision,
    Uploading,
    Done,
    Failed,
}

impl UploadPhase {
    /// Phases during which a second submission is refused.
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            UploadPhase::CheckingExisting | UploadPhase::AwaitingDecision | UploadPhase::Uploading
        )
    }
}

/// The upload form as the user filled it in. `date` is kept raw so an
/// unparseable value can be reported back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadForm {
    pub category: Category,
    pub date: String,
    pub file: Option<UploadFile>,
}

impl UploadForm {
    pub fn new(category: Category, date: impl Into<String>, file: Option<UploadFile>) -> Self {
        Self {
            category,
            date: date.into(),
            file,
        }
    }

    /// Check the form locally. Nothing here touches the network.
    pub fn validate(&self) -> Result<(ReportDate, &UploadFile), ValidationError> {
        let file = self
            .file
            .as_ref()
            .filter(|f| !f.file_name.trim().is_empty())
            .ok_or(ValidationError::MissingFile)?;
        if self.date.trim().is_empty() {
            return Err(ValidationError::MissingDate);
        }
        let date = self
            .date
            .parse::<ReportDate>()
            .map_err(|_| ValidationError::InvalidDate(self.date.clone()))?;
        Ok((date, file))
    }
}

/// A validated upload held between "duplicate detected" and the user's
/// decision.
#[derive(Debug, Clone)]
pub(crate) struct PendingUpload {
    pub key: ReportKey,
    pub file: UploadFile,
}

impl PendingUpload {
    pub fn into_form(self) -> UploadForm {
        UploadForm {
            category: self.key.category,
            date: self.key.date.to_string(),
            file: Some(self.file),
        }
    }
}

/// What the user is asked to decide about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictSummary {
    pub key: ReportKey,
    pub file_name: String,
    pub existing: Vec<Report>,
}

impl ConflictSummary {
    pub fn site(&self) -> SiteId {
        self.key.site
    }

    pub fn prompt(&self) -> String {
        format!(
            "A report already exists for {} on {}.",
            self.key.category, self.key.date
        )
    }
}

/// Result of a step that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded(UploadedReport),
    Conflict(ConflictSummary),
    Cancelled,
}

/// Point-in-time view of the workflow for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadStatus {
    pub phase: UploadPhase,
    pub message: Option<String>,
    pub conflict: Option<ConflictSummary>,
    pub last_upload: Option<UploadedReport>,
    /// A failed attempt's form is kept for resubmission.
    pub has_retained_form: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file() -> Option<UploadFile> {
        Some(UploadFile::new("macd.pdf", b"%PDF-1.4".to_vec()))
    }

    #[test]
    fn test_validate_ok() {
        let form = UploadForm::new(Category::Macd, "2024-01-05", file());
        let (date, f) = form.validate().unwrap();
        assert_eq!(date.to_string(), "2024-01-05");
        assert_eq!(f.file_name, "macd.pdf");
    }

    #[test]
    fn test_validate_missing_file_first() {
        let form = UploadForm::new(Category::Macd, "", None);
        assert_eq!(form.validate().unwrap_err(), ValidationError::MissingFile);
    }

    #[test]
    fn test_validate_missing_and_bad_date() {
        let form = UploadForm::new(Category::Rsi, "  ", file());
        assert_eq!(form.validate().unwrap_err(), ValidationError::MissingDate);

        let form = UploadForm::new(Category::Rsi, "05/01/2024", file());
        assert_eq!(
            form.validate().unwrap_err(),
            ValidationError::InvalidDate("05/01/2024".into())
        );
    }

    #[test]
    fn test_validate_rejects_date_with_junk_suffix() {
        let form = UploadForm::new(Category::Rsi, "2024-01-05Tgarbage", file());
        assert_eq!(
            form.validate().unwrap_err(),
            ValidationError::InvalidDate("2024-01-05Tgarbage".into())
        );
    }

    #[test]
    fn test_in_flight_phases() {
        assert!(UploadPhase::CheckingExisting.is_in_flight());
        assert!(UploadPhase::AwaitingDecision.is_in_flight());
        assert!(UploadPhase::Uploading.is_in_flight());
        assert!(!UploadPhase::Idle.is_in_flight());
        assert!(!UploadPhase::Done.is_in_flight());
        assert!(!UploadPhase::Failed.is_in_flight());
    }
}
