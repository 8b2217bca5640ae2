//! Mock OIDC provider for development and testing.
//!
//! Builds Keycloak-shaped authorization URLs and accepts any authorization
//! code, so the full login flow runs without a real identity provider.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use bff_core::{
    auth::{AuthorizationUrlBuilder, CodeExchanger, IdTokenClaims, IdTokenVerifier, TokenSet},
    error::Result,
    AppError, ErrorCode,
};
use chrono::Utc;
use url::Url;

use crate::config::OidcProviderConfig;

pub const MOCK_ACCESS_TOKEN: &str = "mock-access-token";
pub const MOCK_REFRESH_TOKEN: &str = "mock-refresh-token";
pub const MOCK_ID_TOKEN: &str = "mock-id-token";
pub const MOCK_SUBJECT: &str = "mock-user";

/// How the mock token endpoint answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MockBehavior {
    #[default]
    Succeed,
    /// The token endpoint rejects the code.
    RejectCode,
    /// The token endpoint never answers.
    Hang,
    /// The token response has no ID token.
    OmitIdToken,
    /// The ID token fails verification.
    RejectIdToken,
}

/// Mock provider that implements every provider capability in memory.
#[derive(Debug, Clone)]
pub struct MockProvider {
    auth_endpoint: Url,
    client_id: String,
    redirect_uri: Url,
    behavior: MockBehavior,
    expires_in: Option<Duration>,
    exchange_calls: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Create a mock for the given client registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the issuer URL cannot be built.
    pub fn new(config: &OidcProviderConfig) -> Result<Self> {
        let issuer = config
            .issuer_url()
            .map_err(|e| AppError::wrap(ErrorCode::InvalidInput, e, "invalid issuer URL"))?;
        let auth_endpoint = Url::parse(&format!(
            "{}/protocol/openid-connect/auth",
            issuer.as_str()
        ))
        .map_err(|e| AppError::wrap(ErrorCode::InvalidInput, e, "invalid issuer URL"))?;

        Ok(Self {
            auth_endpoint,
            client_id: config.client_id.clone(),
            redirect_uri: config.callback_url.clone(),
            behavior: MockBehavior::default(),
            expires_in: Some(Duration::from_secs(300)),
            exchange_calls: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn with_behavior(mut self, behavior: MockBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_expires_in(mut self, expires_in: Option<Duration>) -> Self {
        self.expires_in = expires_in;
        self
    }

    /// Number of code exchanges attempted, shared across clones.
    pub fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }
}

impl AuthorizationUrlBuilder for MockProvider {
    fn authorization_url(&self, state: &str) -> Result<Url> {
        let mut url = self.auth_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", self.redirect_uri.as_str())
            .append_pair("scope", "openid profile email")
            .append_pair("state", state);
        Ok(url)
    }
}

#[async_trait]
impl CodeExchanger for MockProvider {
    async fn exchange_code(&self, code: &str) -> Result<TokenSet> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockBehavior::RejectCode => {
                return Err(AppError::new(
                    ErrorCode::ExternalService,
                    format!("invalid_grant: code {code:?} is not valid"),
                ))
            }
            MockBehavior::Hang => std::future::pending::<()>().await,
            _ => {}
        }

        Ok(TokenSet {
            access_token: MOCK_ACCESS_TOKEN.to_string(),
            refresh_token: Some(MOCK_REFRESH_TOKEN.to_string()),
            id_token: (self.behavior != MockBehavior::OmitIdToken)
                .then(|| MOCK_ID_TOKEN.to_string()),
            expires_in: self.expires_in,
        })
    }
}

#[async_trait]
impl IdTokenVerifier for MockProvider {
    async fn verify_id_token(&self, raw_id_token: &str) -> Result<IdTokenClaims> {
        if self.behavior == MockBehavior::RejectIdToken || raw_id_token != MOCK_ID_TOKEN {
            return Err(AppError::new(
                ErrorCode::Unauthorized,
                "ID token signature is invalid",
            ));
        }

        Ok(IdTokenClaims {
            subject: MOCK_SUBJECT.to_string(),
            email: Some("mock@example.com".to_string()),
            name: Some("Mock User".to_string()),
            expires_at: Utc::now() + chrono::Duration::hours(1),
        })
    }
}
