// crates/core/src/gateway.rs
//! Traits for the backend the client talks to.
//!
//! Implementations include:
//! - `PortalClient` (report-portal-client): reqwest against the HTTP API
//! - in-crate mocks used by the workflow tests
//!
//! Every call may fail or stall; callers never assume ordering between
//! concurrent calls for different keys.

use async_trait::async_trait;
use report_portal_types::{
    AccessToken, Category, LoginResponse, ReportDate, ReportId, ReportKey, ReportSummary, SiteId,
    UploadFile, UploadMode, UploadedReport,
};

use crate::error::GatewayError;

/// Credential exchange.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// `POST /login`. A 401 surfaces as [`GatewayError::Unauthorized`].
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, GatewayError>;
}

/// A fully resolved upload call.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub key: ReportKey,
    pub file: UploadFile,
    pub mode: UploadMode,
}

/// Report queries and mutations, each authorized with the session token.
#[async_trait]
pub trait ReportGateway: Send + Sync {
    /// Dates with at least one report for (site, category). May contain
    /// duplicates when several reports share a date.
    async fn list_dates(
        &self,
        token: &AccessToken,
        site: SiteId,
        category: Category,
    ) -> Result<Vec<ReportDate>, GatewayError>;

    /// Reports filed under `key`. A non-empty result is also the conflict
    /// signal for uploads.
    async fn list_reports(
        &self,
        token: &AccessToken,
        key: &ReportKey,
    ) -> Result<Vec<ReportSummary>, GatewayError>;

    /// `POST /upload-report` with the flags derived from `request.mode`.
    async fn upload_report(
        &self,
        token: &AccessToken,
        request: &UploadRequest,
    ) -> Result<UploadedReport, GatewayError>;

    /// `DELETE /delete-report/{id}`.
    async fn delete_report(&self, token: &AccessToken, id: ReportId) -> Result<(), GatewayError>;
}
