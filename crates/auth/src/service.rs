//! Login flow logic, independent of HTTP.

use std::{sync::Arc, time::Duration};

use bff_core::{
    auth::{
        calculate_expiry, AuthorizationUrlBuilder, CodeExchanger, CompletedLogin,
        IdTokenVerifier, LoginRedirect, Session, TokenGenerator,
    },
    error::Result,
    AppError, ErrorCode,
};
use chrono::Utc;

/// Upper bound for the token endpoint round trip.
pub const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds authorization URLs and turns authorization codes into sessions.
///
/// Holds no per-login state: the caller carries the CSRF state between
/// [`begin_login`](Self::begin_login) and [`complete_login`](Self::complete_login)
/// and persists the resulting session.
#[derive(Clone)]
pub struct AuthFlow {
    urls: Arc<dyn AuthorizationUrlBuilder>,
    exchanger: Arc<dyn CodeExchanger>,
    verifier: Arc<dyn IdTokenVerifier>,
    tokens: TokenGenerator,
    exchange_timeout: Duration,
}

impl AuthFlow {
    pub fn new(
        urls: Arc<dyn AuthorizationUrlBuilder>,
        exchanger: Arc<dyn CodeExchanger>,
        verifier: Arc<dyn IdTokenVerifier>,
    ) -> Self {
        Self {
            urls,
            exchanger,
            verifier,
            tokens: TokenGenerator::default(),
            exchange_timeout: EXCHANGE_TIMEOUT,
        }
    }

    /// Flow backed by a single provider implementing every capability.
    pub fn from_provider<P>(provider: Arc<P>) -> Self
    where
        P: AuthorizationUrlBuilder + CodeExchanger + IdTokenVerifier + 'static,
    {
        Self::new(provider.clone(), provider.clone(), provider)
    }

    pub fn with_token_generator(mut self, tokens: TokenGenerator) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn with_exchange_timeout(mut self, timeout: Duration) -> Self {
        self.exchange_timeout = timeout;
        self
    }

    /// Start a login: fresh CSRF state and the URL to send the browser to.
    pub fn begin_login(&self) -> Result<LoginRedirect> {
        let state = self.tokens.generate()?;
        let authorization_url = self.urls.authorization_url(&state)?;
        Ok(LoginRedirect {
            state,
            authorization_url,
        })
    }

    /// Exchange `code` for tokens and verify the ID token.
    ///
    /// # Errors
    ///
    /// - `DEPENDENCY_FAILED` if the token endpoint does not answer in time
    /// - `EXTERNAL_SERVICE_ERROR` if the provider rejects the exchange
    /// - `UNAUTHORIZED` if the ID token is missing or fails verification
    /// - `INTERNAL_ERROR` if no session token can be generated
    pub async fn complete_login(&self, code: &str) -> Result<CompletedLogin> {
        let exchange = self.exchanger.exchange_code(code);
        let tokens = tokio::time::timeout(self.exchange_timeout, exchange)
            .await
            .map_err(|e| {
                AppError::wrap(ErrorCode::DependencyFailed, e, "token exchange timed out")
            })??;

        let raw_id_token = tokens.id_token.ok_or_else(|| {
            AppError::new(ErrorCode::Unauthorized, "no id_token in token response")
        })?;

        let claims = self
            .verifier
            .verify_id_token(&raw_id_token)
            .await
            .map_err(|e| AppError::wrap(ErrorCode::Unauthorized, e, "failed to verify ID token"))?;

        let expires_at = match tokens.expires_in {
            Some(expires_in) => {
                let lifetime = chrono::Duration::from_std(expires_in).map_err(|e| {
                    AppError::wrap(ErrorCode::InternalError, e, "token lifetime out of range")
                })?;
                calculate_expiry(Utc::now(), lifetime)
            }
            None => claims.expires_at,
        };

        let session_token = self.tokens.session_id()?;

        tracing::debug!(subject = %claims.subject, %expires_at, "login completed");

        Ok(CompletedLogin {
            session_token,
            session: Session {
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
                id_token: raw_id_token,
                expires_at,
            },
            claims,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::test_provider_config,
        providers::{MockBehavior, MockProvider, MOCK_ACCESS_TOKEN, MOCK_ID_TOKEN, MOCK_SUBJECT},
    };
    use bff_core::{auth::EntropySource, error::BoxError};

    fn provider(behavior: MockBehavior) -> Arc<MockProvider> {
        Arc::new(
            MockProvider::new(&test_provider_config())
                .unwrap()
                .with_behavior(behavior),
        )
    }

    struct BrokenEntropy;

    impl EntropySource for BrokenEntropy {
        fn fill(&self, _dest: &mut [u8]) -> std::result::Result<(), BoxError> {
            Err("entropy pool unavailable".into())
        }
    }

    #[test]
    fn begin_login_binds_a_fresh_state_to_the_url() {
        let flow = AuthFlow::from_provider(provider(MockBehavior::Succeed));

        let first = flow.begin_login().unwrap();
        let second = flow.begin_login().unwrap();

        assert_eq!(first.state.len(), 43);
        assert_ne!(first.state, second.state);
        let state_param = first
            .authorization_url
            .query_pairs()
            .find(|(key, _)| key == "state")
            .map(|(_, value)| value.into_owned());
        assert_eq!(state_param.as_deref(), Some(first.state.as_str()));
    }

    #[test]
    fn begin_login_fails_without_entropy() {
        let flow = AuthFlow::from_provider(provider(MockBehavior::Succeed))
            .with_token_generator(TokenGenerator::new(Arc::new(BrokenEntropy)));

        let err = flow.begin_login().unwrap_err();
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[tokio::test]
    async fn complete_login_builds_a_session() {
        let flow = AuthFlow::from_provider(provider(MockBehavior::Succeed));
        let before = Utc::now();

        let login = flow.complete_login("code-123").await.unwrap();

        assert_eq!(login.access_token(), MOCK_ACCESS_TOKEN);
        assert_eq!(login.session.id_token, MOCK_ID_TOKEN);
        assert_eq!(login.claims.subject, MOCK_SUBJECT);
        assert_eq!(login.session_token.as_str().len(), 43);
        assert!(login.session.expires_at >= before + chrono::Duration::seconds(300));
    }

    #[tokio::test]
    async fn session_expiry_falls_back_to_id_token_expiry() {
        let mock = MockProvider::new(&test_provider_config())
            .unwrap()
            .with_expires_in(None);
        let flow = AuthFlow::from_provider(Arc::new(mock));

        let login = flow.complete_login("code-123").await.unwrap();
        assert_eq!(login.session.expires_at, login.claims.expires_at);
    }

    #[tokio::test]
    async fn failures_map_to_their_codes() {
        let cases = [
            (MockBehavior::RejectCode, ErrorCode::ExternalService),
            (MockBehavior::OmitIdToken, ErrorCode::Unauthorized),
            (MockBehavior::RejectIdToken, ErrorCode::Unauthorized),
        ];

        for (behavior, code) in cases {
            let flow = AuthFlow::from_provider(provider(behavior));
            let err = flow.complete_login("code-123").await.unwrap_err();
            assert_eq!(err.code(), code, "{behavior:?}");
        }
    }

    #[tokio::test]
    async fn slow_token_endpoint_is_a_dependency_failure() {
        let flow = AuthFlow::from_provider(provider(MockBehavior::Hang))
            .with_exchange_timeout(Duration::from_millis(10));

        let err = flow.complete_login("code-123").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::DependencyFailed);
    }
}
