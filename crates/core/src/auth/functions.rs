use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, TryRngCore};

use super::{Session, SessionId};
use crate::error::{AppError, BoxError, ErrorCode, Result};

/// Random bytes per token (256 bits).
pub const TOKEN_BYTES: usize = 32;

/// Source of cryptographically secure random bytes.
pub trait EntropySource: Send + Sync {
    fn fill(&self, dest: &mut [u8]) -> std::result::Result<(), BoxError>;
}

/// The operating system's CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, dest: &mut [u8]) -> std::result::Result<(), BoxError> {
        OsRng.try_fill_bytes(dest).map_err(Into::into)
    }
}

/// Issues unguessable tokens for CSRF state and session identifiers.
///
/// Tokens are [`TOKEN_BYTES`] random bytes, base64url-encoded without padding.
#[derive(Clone)]
pub struct TokenGenerator {
    source: Arc<dyn EntropySource>,
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new(Arc::new(OsEntropy))
    }
}

impl TokenGenerator {
    pub fn new(source: Arc<dyn EntropySource>) -> Self {
        Self { source }
    }

    /// Generate a fresh token.
    ///
    /// # Errors
    ///
    /// Returns `INTERNAL_ERROR` if the entropy source fails.
    pub fn generate(&self) -> Result<String> {
        let mut bytes = [0u8; TOKEN_BYTES];
        self.source.fill(&mut bytes).map_err(|e| {
            AppError::wrap(ErrorCode::InternalError, e, "failed to generate secure token")
        })?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Generate a fresh session identifier.
    pub fn session_id(&self) -> Result<SessionId> {
        self.generate().map(SessionId::new)
    }
}

/// Check if a session has expired.
pub fn is_session_expired(session: &Session, now: DateTime<Utc>) -> bool {
    session.expires_at <= now
}

/// Calculate session expiry from creation time and TTL.
pub fn calculate_expiry(created_at: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    created_at + ttl
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ExhaustedEntropy;

    impl EntropySource for ExhaustedEntropy {
        fn fill(&self, _dest: &mut [u8]) -> std::result::Result<(), BoxError> {
            Err("entropy source exhausted".into())
        }
    }

    fn session_expiring_at(expires_at: DateTime<Utc>) -> Session {
        Session {
            access_token: "access".to_string(),
            refresh_token: None,
            id_token: "id".to_string(),
            expires_at,
        }
    }

    #[test]
    fn generate_produces_base64url_of_32_bytes() {
        let token = TokenGenerator::default().generate().unwrap();
        assert_eq!(token.len(), 43);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));

        let decoded = URL_SAFE_NO_PAD.decode(&token).unwrap();
        assert_eq!(decoded.len(), TOKEN_BYTES);
    }

    #[test]
    fn generate_is_unique() {
        let generator = TokenGenerator::default();
        assert_ne!(generator.generate().unwrap(), generator.generate().unwrap());
    }

    #[test]
    fn exhausted_entropy_is_an_internal_error() {
        let generator = TokenGenerator::new(Arc::new(ExhaustedEntropy));
        let err = generator.generate().unwrap_err();
        assert_eq!(err.code(), ErrorCode::InternalError);
        assert_eq!(err.chain(), "failed to generate secure token: entropy source exhausted");
    }

    #[test]
    fn session_id_uses_generated_token() {
        let id = TokenGenerator::default().session_id().unwrap();
        assert_eq!(id.as_str().len(), 43);
    }

    #[test]
    fn is_session_expired_returns_false_for_future_expiry() {
        let now = Utc::now();
        assert!(!is_session_expired(&session_expiring_at(now + Duration::hours(1)), now));
    }

    #[test]
    fn is_session_expired_returns_true_at_exact_expiry() {
        let now = Utc::now();
        assert!(is_session_expired(&session_expiring_at(now), now));
    }

    #[test]
    fn calculate_expiry_adds_ttl_to_created_at() {
        let created = Utc::now();
        let ttl = Duration::hours(24);
        assert_eq!(calculate_expiry(created, ttl), created + ttl);
    }
}
