//! In-memory gateways for workflow tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Notify;

use report_portal_types::{
    AccessToken, AllowedSites, Category, LoginResponse, ReportDate, ReportId, ReportKey,
    ReportSummary, SiteId, UploadMode, UploadedReport,
};

use crate::error::GatewayError;
use crate::gateway::{AuthGateway, ReportGateway, UploadRequest};

/// One upload call as the backend saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedUpload {
    pub key: ReportKey,
    pub file_name: String,
    pub override_existing: bool,
    pub save_as_new: bool,
}

#[derive(Default)]
pub(crate) struct MockGateway {
    pub existing: Mutex<HashMap<ReportKey, Vec<ReportSummary>>>,
    pub dates: Mutex<Vec<ReportDate>>,
    pub uploads: Mutex<Vec<RecordedUpload>>,
    pub list_calls: AtomicUsize,
    pub date_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub fail_list: AtomicBool,
    pub fail_upload: AtomicBool,
    /// When set, the next `list_reports` call parks until `release` fires.
    pub hold_list: AtomicBool,
    pub entered: Notify,
    pub release: Notify,
    next_id: AtomicI64,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(100),
            ..Default::default()
        }
    }

    pub fn with_existing(self, key: ReportKey, file_name: &str) -> Self {
        self.existing
            .lock()
            .unwrap()
            .entry(key)
            .or_default()
            .push(ReportSummary {
                id: 1,
                file_name: file_name.to_string(),
                file_type: "pdf".to_string(),
            });
        self
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn recorded_uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn query_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst) + self.date_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReportGateway for MockGateway {
    async fn list_dates(
        &self,
        _token: &AccessToken,
        _site: SiteId,
        _category: Category,
    ) -> Result<Vec<ReportDate>, GatewayError> {
        self.date_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.dates.lock().unwrap().clone())
    }

    async fn list_reports(
        &self,
        _token: &AccessToken,
        key: &ReportKey,
    ) -> Result<Vec<ReportSummary>, GatewayError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.hold_list.swap(false, Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(GatewayError::Transport("connection refused".into()));
        }
        Ok(self
            .existing
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    async fn upload_report(
        &self,
        _token: &AccessToken,
        request: &UploadRequest,
    ) -> Result<UploadedReport, GatewayError> {
        self.uploads.lock().unwrap().push(RecordedUpload {
            key: request.key,
            file_name: request.file.file_name.clone(),
            override_existing: request.mode.override_existing(),
            save_as_new: request.mode.save_as_new(),
        });
        if self.fail_upload.load(Ordering::SeqCst) {
            return Err(GatewayError::Server {
                status: 500,
                detail: "storage unavailable".into(),
            });
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let summary = ReportSummary {
            id,
            file_name: request.file.file_name.clone(),
            file_type: "pdf".into(),
        };
        let mut existing = self.existing.lock().unwrap();
        let listing = existing.entry(request.key).or_default();
        if request.mode == UploadMode::Override {
            listing.clear();
        }
        listing.push(summary);
        Ok(UploadedReport {
            id: Some(id),
            file_name: request.file.file_name.clone(),
            file_type: Some("pdf".into()),
        })
    }

    async fn delete_report(&self, _token: &AccessToken, id: ReportId) -> Result<(), GatewayError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        let mut existing = self.existing.lock().unwrap();
        let mut found = false;
        for listing in existing.values_mut() {
            let before = listing.len();
            listing.retain(|r| r.id != id);
            found |= listing.len() != before;
        }
        if found {
            Ok(())
        } else {
            Err(GatewayError::NotFound("Report not found".into()))
        }
    }
}

/// Accepts one password and grants a fixed allowed-site string.
pub(crate) struct MockAuth {
    pub allowed_sites: &'static str,
}

#[async_trait]
impl AuthGateway for MockAuth {
    async fn login(&self, _email: &str, password: &str) -> Result<LoginResponse, GatewayError> {
        if password != "secret" {
            return Err(GatewayError::Unauthorized("Invalid credentials".into()));
        }
        Ok(LoginResponse {
            access_token: AccessToken::new("test-token"),
            allowed_sites: AllowedSites::Delimited(self.allowed_sites.to_string()),
        })
    }
}
