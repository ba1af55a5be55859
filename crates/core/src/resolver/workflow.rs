// crates/core/src/resolver/workflow.rs
//! The upload conflict state machine.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use report_portal_types::{
    AccessToken, Report, ReportKey, SiteId, UploadDecision, UploadMode, UploadedReport,
};

use super::types::{ConflictSummary, PendingUpload, UploadForm, UploadOutcome, UploadPhase, UploadStatus};
use crate::cache::ReportCache;
use crate::error::{GatewayError, UploadError};
use crate::gateway::{ReportGateway, UploadRequest};

/// Identifies one workflow run. Results of network calls are applied only
/// while their ticket is still current.
type Ticket = u64;

struct Inner {
    phase: UploadPhase,
    ticket: Ticket,
    message: Option<String>,
    pending: Option<PendingUpload>,
    conflict: Option<ConflictSummary>,
    retained: Option<UploadForm>,
    last_upload: Option<UploadedReport>,
}

impl Inner {
    fn new() -> Self {
        Self {
            phase: UploadPhase::Idle,
            ticket: 0,
            message: None,
            pending: None,
            conflict: None,
            retained: None,
            last_upload: None,
        }
    }
}

/// Drives one upload at a time through existence check, user decision and
/// final upload.
///
/// The state lock is never held across a network call, so the status can
/// be read (and the workflow abandoned) while a call is outstanding.
pub struct UploadResolver {
    gateway: Arc<dyn ReportGateway>,
    cache: Arc<ReportCache>,
    inner: Mutex<Inner>,
}

impl UploadResolver {
    pub fn new(gateway: Arc<dyn ReportGateway>, cache: Arc<ReportCache>) -> Self {
        Self {
            gateway,
            cache,
            inner: Mutex::new(Inner::new()),
        }
    }

    pub fn phase(&self) -> UploadPhase {
        self.lock().phase
    }

    pub fn status(&self) -> UploadStatus {
        let inner = self.lock();
        UploadStatus {
            phase: inner.phase,
            message: inner.message.clone(),
            conflict: inner.conflict.clone(),
            last_upload: inner.last_upload.clone(),
            has_retained_form: inner.retained.is_some(),
        }
    }

    /// The form of the last failed attempt, for resubmission without
    /// re-entering it.
    pub fn retained_form(&self) -> Option<UploadForm> {
        self.lock().retained.clone()
    }

    /// Start a workflow for `form` on `site`.
    ///
    /// Returns `Uploaded` when no report existed for the key, or `Conflict`
    /// when the workflow is now parked waiting for [`decide`](Self::decide).
    /// Refused with `Busy` while another workflow is in flight.
    pub async fn submit(
        &self,
        token: &AccessToken,
        site: SiteId,
        form: &UploadForm,
    ) -> Result<UploadOutcome, UploadError> {
        let (date, file) = form.validate()?;
        let key = ReportKey::new(site, form.category, date);
        let ticket = self.begin()?;
        let pending = PendingUpload {
            key,
            file: file.clone(),
        };

        debug!(%key, file = %pending.file.file_name, "Checking for existing reports");
        let existing = match self.gateway.list_reports(token, &key).await {
            Ok(existing) => existing,
            Err(e) => return Err(self.fail(ticket, pending, e)),
        };

        if existing.is_empty() {
            return self.upload(token, ticket, pending, UploadMode::Fresh).await;
        }

        let mut inner = self.lock();
        if inner.ticket != ticket {
            debug!(%key, "Discarding existence check for abandoned workflow");
            return Err(UploadError::Abandoned);
        }
        let conflict = ConflictSummary {
            key,
            file_name: pending.file.file_name.clone(),
            existing: existing
                .into_iter()
                .map(|summary| Report::from_summary(summary, &key))
                .collect(),
        };
        info!(%key, existing = conflict.existing.len(), "Existing report found; awaiting decision");
        inner.phase = UploadPhase::AwaitingDecision;
        inner.message = Some(conflict.prompt());
        inner.pending = Some(pending);
        inner.conflict = Some(conflict.clone());
        Ok(UploadOutcome::Conflict(conflict))
    }

    /// Apply the user's decision to a parked workflow.
    pub async fn decide(
        &self,
        token: &AccessToken,
        decision: UploadDecision,
    ) -> Result<UploadOutcome, UploadError> {
        let (ticket, pending) = {
            let mut inner = self.lock();
            if inner.phase != UploadPhase::AwaitingDecision {
                return Err(UploadError::NoPendingDecision);
            }
            let Some(pending) = inner.pending.take() else {
                return Err(UploadError::NoPendingDecision);
            };
            inner.conflict = None;
            if decision == UploadDecision::Cancel {
                info!(key = %pending.key, "Upload cancelled");
                inner.phase = UploadPhase::Idle;
                inner.message = Some("Upload cancelled.".to_string());
                return Ok(UploadOutcome::Cancelled);
            }
            (inner.ticket, pending)
        };

        let mode = match decision {
            UploadDecision::Override => UploadMode::Override,
            UploadDecision::SaveAsNew => UploadMode::SaveAsNew,
            UploadDecision::Cancel => return Ok(UploadOutcome::Cancelled),
        };
        self.upload(token, ticket, pending, mode).await
    }

    /// Drop the current workflow without side effects: the pending upload is
    /// discarded and results of calls still in flight will be ignored.
    pub fn abandon(&self) {
        let mut inner = self.lock();
        inner.ticket += 1;
        if let Some(pending) = inner.pending.take() {
            debug!(key = %pending.key, "Discarded pending upload");
        }
        inner.phase = UploadPhase::Idle;
        inner.message = None;
        inner.conflict = None;
        inner.retained = None;
        inner.last_upload = None;
    }

    fn begin(&self) -> Result<Ticket, UploadError> {
        let mut inner = self.lock();
        if inner.phase.is_in_flight() {
            return Err(UploadError::Busy);
        }
        inner.ticket += 1;
        inner.phase = UploadPhase::CheckingExisting;
        inner.message = Some("Checking for existing reports...".to_string());
        inner.retained = None;
        inner.last_upload = None;
        Ok(inner.ticket)
    }

    async fn upload(
        &self,
        token: &AccessToken,
        ticket: Ticket,
        pending: PendingUpload,
        mode: UploadMode,
    ) -> Result<UploadOutcome, UploadError> {
        {
            let mut inner = self.lock();
            if inner.ticket != ticket {
                return Err(UploadError::Abandoned);
            }
            inner.phase = UploadPhase::Uploading;
            inner.message = Some("Uploading...".to_string());
        }

        let request = UploadRequest {
            key: pending.key,
            file: pending.file,
            mode,
        };
        debug!(key = %request.key, %mode, "Uploading report");
        let result = self.gateway.upload_report(token, &request).await;

        let mut inner = self.lock();
        if inner.ticket != ticket {
            warn!(key = %request.key, "Upload finished after the workflow was abandoned; result ignored");
            return Err(UploadError::Abandoned);
        }
        match result {
            Ok(uploaded) => {
                self.cache.record_upload(&request.key, &uploaded, mode);
                info!(key = %request.key, file = %uploaded.file_name, %mode, "Report uploaded");
                inner.phase = UploadPhase::Done;
                inner.message = Some(format!("Uploaded: {}", uploaded.file_name));
                inner.last_upload = Some(uploaded.clone());
                Ok(UploadOutcome::Uploaded(uploaded))
            }
            Err(e) => {
                let pending = PendingUpload {
                    key: request.key,
                    file: request.file,
                };
                drop(inner);
                Err(self.fail(ticket, pending, e))
            }
        }
    }

    /// Move to `Failed`, keeping the user's input for resubmission.
    fn fail(&self, ticket: Ticket, pending: PendingUpload, err: GatewayError) -> UploadError {
        let mut inner = self.lock();
        if inner.ticket != ticket {
            debug!(key = %pending.key, error = %err, "Ignoring failure of abandoned workflow");
            return UploadError::Abandoned;
        }
        warn!(key = %pending.key, error = %err, "Upload workflow failed");
        let err = UploadError::Gateway(err);
        inner.phase = UploadPhase::Failed;
        inner.message = Some(err.to_string());
        inner.retained = Some(pending.into_form());
        err
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            tracing::error!("Upload resolver mutex poisoned; recovering state");
            poisoned.into_inner()
        })
    }
}
