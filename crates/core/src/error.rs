// crates/core/src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Errors from the backend collaborator (login, report queries, uploads,
/// deletions).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Server error {status}: {detail}")]
    Server { status: u16, detail: String },

    #[error("Backend unreachable: {0}")]
    Transport(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Text for the user-facing status line. Server-reported details are
    /// shown verbatim; everything else falls back to the error's display.
    pub fn detail(&self) -> String {
        match self {
            GatewayError::Unauthorized(d)
            | GatewayError::NotFound(d)
            | GatewayError::Forbidden(d)
            | GatewayError::Server { detail: d, .. } => d.clone(),
            GatewayError::Transport(_) | GatewayError::Decode(_) => "Unknown error".to_string(),
        }
    }
}

/// Errors from logging in, restoring or clearing the persisted session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Email and password are required")]
    MissingCredentials,

    #[error("Login rejected: {0}")]
    Rejected(String),

    #[error("Login failed: {0}")]
    Gateway(GatewayError),

    #[error("IO error accessing session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed session file {path}: {message}")]
    Corrupt { path: PathBuf, message: String },
}

impl SessionError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<GatewayError> for SessionError {
    /// A 401 from the login endpoint is a rejection, not a transport fault.
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Unauthorized(detail) => SessionError::Rejected(detail),
            other => SessionError::Gateway(other),
        }
    }
}

/// Bad or missing local input. Never reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select a file to upload.")]
    MissingFile,

    #[error("Please select a date.")]
    MissingDate,

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

/// Errors from the upload conflict workflow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Another upload is already in progress")]
    Busy,

    #[error("No upload is waiting for a decision")]
    NoPendingDecision,

    #[error("Upload failed: {}", .0.detail())]
    Gateway(GatewayError),

    #[error("Upload workflow was abandoned")]
    Abandoned,
}

/// Errors surfaced by the [`Portal`](crate::portal::Portal) facade.
#[derive(Debug, Error)]
pub enum PortalError {
    #[error("Not logged in")]
    NotLoggedIn,

    #[error("The upload form is not open for an administrative site")]
    NotOnUploadForm,

    #[error("There is no failed upload to retry")]
    NothingToRetry,

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}
