use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use super::{IdTokenClaims, Session, SessionId, TokenSet};
use crate::error::Result;

/// Builds the identity provider's authorization URL.
pub trait AuthorizationUrlBuilder: Send + Sync {
    /// URL the browser is sent to, bound to the given CSRF `state`.
    fn authorization_url(&self, state: &str) -> Result<Url>;
}

/// Exchanges an authorization code at the identity provider's token endpoint.
#[async_trait]
pub trait CodeExchanger: Send + Sync {
    async fn exchange_code(&self, code: &str) -> Result<TokenSet>;
}

/// Verifies a raw ID token (signature, issuer, audience, expiry).
#[async_trait]
pub trait IdTokenVerifier: Send + Sync {
    async fn verify_id_token(&self, raw_id_token: &str) -> Result<IdTokenClaims>;
}

/// Session key-value storage.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Store a session under `id`, expiring after `ttl`.
    async fn put_session(&self, id: &SessionId, session: &Session, ttl: Duration) -> Result<()>;

    /// Retrieve a session by ID.
    async fn get_session(&self, id: &SessionId) -> Result<Option<Session>>;

    /// Delete a session. Deleting a missing session is not an error.
    async fn delete_session(&self, id: &SessionId) -> Result<()>;
}
