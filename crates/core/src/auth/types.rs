use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Cryptographically random session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tokens issued by the identity provider for an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub id_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Raw result of an authorization-code exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Absent when the provider did not issue an ID token.
    pub id_token: Option<String>,
    pub expires_in: Option<Duration>,
}

/// Claims extracted from a verified ID token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    pub subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// Where to send the browser to start a login, and the state bound to it.
#[derive(Debug, Clone)]
pub struct LoginRedirect {
    pub state: String,
    pub authorization_url: Url,
}

/// Outcome of a successful code exchange and ID-token verification.
#[derive(Debug, Clone)]
pub struct CompletedLogin {
    pub session_token: SessionId,
    pub session: Session,
    pub claims: IdTokenClaims,
}

impl CompletedLogin {
    pub fn access_token(&self) -> &str {
        &self.session.access_token
    }
}
