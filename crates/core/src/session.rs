// crates/core/src/session.rs
//! The logged-in session: bearer token plus the sites the user may open.
//!
//! `SessionStore` is an owned context object. It is created once, handed to
//! whatever needs authorization, and only `login`/`logout` mutate it. When
//! backed by a file the session survives restarts until an explicit logout.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use report_portal_types::{AccessToken, SiteId};

use crate::error::SessionError;
use crate::gateway::AuthGateway;
use crate::paths;

/// An authenticated session. A session always has a non-empty token and an
/// allowed-site set, which may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    token: AccessToken,
    allowed_sites: BTreeSet<SiteId>,
}

impl Session {
    pub fn new(token: AccessToken, allowed_sites: BTreeSet<SiteId>) -> Self {
        Self {
            token,
            allowed_sites,
        }
    }

    pub fn token(&self) -> &AccessToken {
        &self.token
    }

    /// Allowed sites in picker order.
    pub fn allowed_sites(&self) -> impl Iterator<Item = SiteId> + '_ {
        self.allowed_sites.iter().copied()
    }

    pub fn is_authorized(&self, site: SiteId) -> bool {
        self.allowed_sites.contains(&site)
    }
}

/// Holder of the current session, optionally persisted to disk.
#[derive(Debug)]
pub struct SessionStore {
    path: Option<PathBuf>,
    session: Option<Session>,
}

impl SessionStore {
    /// A store that forgets the session when dropped.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            session: None,
        }
    }

    /// Restore the session persisted at `path`. A missing file means
    /// logged out.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let session = match std::fs::read(&path) {
            Ok(bytes) => {
                let session: Session =
                    serde_json::from_slice(&bytes).map_err(|e| SessionError::Corrupt {
                        path: path.clone(),
                        message: e.to_string(),
                    })?;
                if session.token.is_empty() {
                    return Err(SessionError::Corrupt {
                        path,
                        message: "empty access token".into(),
                    });
                }
                debug!(path = %path.display(), "Restored persisted session");
                Some(session)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(SessionError::io(path, e)),
        };
        Ok(Self {
            path: Some(path),
            session,
        })
    }

    /// Open the store at the default location, or fall back to an
    /// in-memory store when no data directory can be resolved.
    pub fn open_default() -> Result<Self, SessionError> {
        match paths::session_file() {
            Some(path) => Self::open(path),
            None => {
                warn!("No data directory available; session will not be persisted");
                Ok(Self::in_memory())
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn current(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    /// `site ∈ allowed sites` of the current session. Pure.
    pub fn is_authorized(&self, site: SiteId) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_authorized(site))
    }

    /// Exchange credentials for a session and persist it. On failure the
    /// previous session, if any, is left untouched.
    pub async fn login(
        &mut self,
        auth: &dyn AuthGateway,
        email: &str,
        password: &str,
    ) -> Result<&Session, SessionError> {
        let session = Self::authenticate(auth, email, password).await?;
        self.install(session)
    }

    /// The credential exchange alone: no store is touched, so callers that
    /// keep the store behind a lock need not hold it across the call.
    pub async fn authenticate(
        auth: &dyn AuthGateway,
        email: &str,
        password: &str,
    ) -> Result<Session, SessionError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(SessionError::MissingCredentials);
        }

        debug!(%email, "Logging in");
        let response = auth.login(email, password).await?;
        if response.access_token.is_empty() {
            return Err(SessionError::Rejected("empty access token".into()));
        }
        let session = Session::new(response.access_token, response.allowed_sites.to_set());
        info!(%email, sites = ?session.allowed_sites, "Logged in");
        Ok(session)
    }

    /// Make `session` current and persist it.
    pub fn install(&mut self, session: Session) -> Result<&Session, SessionError> {
        self.persist(&session)?;
        Ok(&*self.session.insert(session))
    }

    /// Forget the session and remove its persisted copy. Calling this while
    /// logged out is a no-op.
    pub fn logout(&mut self) -> Result<(), SessionError> {
        let was_logged_in = self.session.take().is_some();
        if let Some(path) = &self.path {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(SessionError::io(path, e)),
            }
        }
        if was_logged_in {
            info!("Logged out");
        }
        Ok(())
    }

    /// Write via a sibling temp file and rename, so a crash never leaves a
    /// half-written session behind.
    fn persist(&self, session: &Session) -> Result<(), SessionError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SessionError::io(parent, e))?;
        }
        let json = serde_json::to_vec_pretty(session).map_err(|e| SessionError::Corrupt {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| SessionError::io(&tmp, e))?;
        std::fs::rename(&tmp, path).map_err(|e| SessionError::io(path, e))?;
        Ok(())
    }
}
