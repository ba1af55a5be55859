// crates/client/src/http.rs
//! reqwest-backed gateway for the portal's HTTP API.
//!
//! | call           | request                                      |
//! |----------------|----------------------------------------------|
//! | login          | `POST /login` (JSON)                         |
//! | list_dates     | `GET /report-dates/{site}/{category}`        |
//! | list_reports   | `GET /reports/{site}/{category}/{date}`      |
//! | upload_report  | `POST /upload-report` (multipart)            |
//! | delete_report  | `DELETE /delete-report/{id}`                 |

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use report_portal_core::{AuthGateway, GatewayError, ReportGateway, UploadRequest};
use report_portal_types::{
    AccessToken, Category, ErrorBody, LoginRequest, LoginResponse, Report, ReportDate, ReportId,
    ReportKey, ReportSummary, SiteId, UploadResponse, UploadedReport,
};

use crate::config::ClientConfig;

/// Portal backend client. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct PortalClient {
    http: reqwest::Client,
    base_url: String,
}

impl PortalClient {
    pub fn new(config: &ClientConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Transport(format!("HTTP client setup failed: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute location of a report's stored file.
    pub fn report_url(&self, report: &Report) -> String {
        format!("{}{}", self.base_url, report.content_path())
    }

    fn url(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        for segment in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }
}

#[async_trait]
impl AuthGateway for PortalClient {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, GatewayError> {
        let resp = self
            .http
            .post(self.url(&["login"]))
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(transport)?;
        decode(check(resp).await?).await
    }
}

#[async_trait]
impl ReportGateway for PortalClient {
    async fn list_dates(
        &self,
        token: &AccessToken,
        site: SiteId,
        category: Category,
    ) -> Result<Vec<ReportDate>, GatewayError> {
        let url = self.url(&["report-dates", site.as_str(), category.as_str()]);
        debug!(%url, "GET report dates");
        let resp = self
            .http
            .get(url)
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(transport)?;
        decode(check(resp).await?).await
    }

    async fn list_reports(
        &self,
        token: &AccessToken,
        key: &ReportKey,
    ) -> Result<Vec<ReportSummary>, GatewayError> {
        let date = key.date.to_string();
        let url = self.url(&["reports", key.site.as_str(), key.category.as_str(), &date]);
        debug!(%url, "GET reports");
        let resp = self
            .http
            .get(url)
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(transport)?;
        decode(check(resp).await?).await
    }

    async fn upload_report(
        &self,
        token: &AccessToken,
        request: &UploadRequest,
    ) -> Result<UploadedReport, GatewayError> {
        let file = Part::bytes(request.file.bytes.clone())
            .file_name(request.file.file_name.clone());
        let form = Form::new()
            .text("site_name", request.key.site.as_str())
            .text("category", request.key.category.as_str())
            .text("date", request.key.date.to_string())
            .part("file", file)
            .text("override", request.mode.override_existing().to_string())
            .text("save_as_new", request.mode.save_as_new().to_string());

        debug!(key = %request.key, file = %request.file.file_name, mode = %request.mode, "POST upload");
        let resp = self
            .http
            .post(self.url(&["upload-report"]))
            .bearer_auth(token.as_str())
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        let body: UploadResponse = decode(check(resp).await?).await?;
        Ok(body.report)
    }

    async fn delete_report(&self, token: &AccessToken, id: ReportId) -> Result<(), GatewayError> {
        let id = id.to_string();
        let resp = self
            .http
            .delete(self.url(&["delete-report", &id]))
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(transport)?;
        check(resp).await?;
        Ok(())
    }
}

fn transport(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Transport("request timed out".to_string())
    } else {
        GatewayError::Transport(e.to_string())
    }
}

/// Pass 2xx responses through; turn everything else into a `GatewayError`
/// carrying the server's `detail` when it sent one.
async fn check(resp: Response) -> Result<Response, GatewayError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let detail = resp
        .bytes()
        .await
        .ok()
        .and_then(|body| serde_json::from_slice::<ErrorBody>(&body).ok())
        .map(|body| body.message());
    warn!(%status, detail = detail.as_deref().unwrap_or(""), "Backend returned an error");

    let reason = || status.canonical_reason().unwrap_or("error").to_string();
    Err(match status {
        StatusCode::UNAUTHORIZED => GatewayError::Unauthorized(detail.unwrap_or_else(reason)),
        StatusCode::FORBIDDEN => GatewayError::Forbidden(detail.unwrap_or_else(reason)),
        StatusCode::NOT_FOUND => GatewayError::NotFound(detail.unwrap_or_else(reason)),
        _ => match detail {
            Some(detail) => GatewayError::Server {
                status: status.as_u16(),
                detail,
            },
            None => GatewayError::Transport(format!("HTTP {status}")),
        },
    })
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, GatewayError> {
    let body = resp.bytes().await.map_err(transport)?;
    serde_json::from_slice(&body).map_err(|e| GatewayError::Decode(e.to_string()))
}
