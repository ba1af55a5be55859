// crates/types/src/auth.rs
//! Login wire shapes and the bearer token.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::site::AllowedSites;

/// Opaque bearer token issued by the login endpoint.
///
/// `Debug` is redacted so the token never ends up in log output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// `POST /login` body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// `POST /login` success body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: AccessToken,
    #[serde(default)]
    pub allowed_sites: AllowedSites,
}

/// Structured error body: `{"detail": "..."}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    /// The detail as display text. Validation errors arrive as arrays or
    /// objects rather than strings; those are rendered as compact JSON.
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::SiteId;

    #[test]
    fn test_token_debug_is_redacted() {
        let token = AccessToken::new("eyJhbGciOiJIUzI1NiJ9.secret");
        let debug = format!("{token:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_login_response_with_delimited_sites() {
        let resp: LoginResponse = serde_json::from_str(
            r#"{"access_token": "abc", "allowed_sites": "personal,admin", "token_type": "bearer"}"#,
        )
        .unwrap();
        assert_eq!(resp.access_token.as_str(), "abc");
        let sites = resp.allowed_sites.to_set();
        assert!(sites.contains(&SiteId::Personal));
        assert!(sites.contains(&SiteId::Admin));
        assert!(!sites.contains(&SiteId::Shared));
    }

    #[test]
    fn test_login_response_without_sites() {
        let resp: LoginResponse = serde_json::from_str(r#"{"access_token": "abc"}"#).unwrap();
        assert!(resp.allowed_sites.to_set().is_empty());
    }

    #[test]
    fn test_error_body_message() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail": "Invalid credentials"}"#).unwrap();
        assert_eq!(body.message(), "Invalid credentials");

        let body: ErrorBody =
            serde_json::from_str(r#"{"detail": [{"loc": ["body", "date"], "msg": "field required"}]}"#)
                .unwrap();
        assert!(body.message().contains("field required"));
    }
}
