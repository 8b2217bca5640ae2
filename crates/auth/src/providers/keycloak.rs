//! Keycloak OIDC provider.

use std::{str::FromStr, time::Duration};

use async_trait::async_trait;
use bff_core::{
    auth::{AuthorizationUrlBuilder, CodeExchanger, IdTokenClaims, IdTokenVerifier, TokenSet},
    error::Result,
    AppError, ErrorCode,
};
use openidconnect::{
    core::{CoreAuthenticationFlow, CoreClient, CoreIdToken, CoreProviderMetadata},
    reqwest, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointMaybeSet,
    EndpointNotSet, EndpointSet, IssuerUrl, Nonce, OAuth2TokenResponse, RedirectUrl, Scope,
    TokenResponse,
};
use url::Url;

use crate::config::OidcProviderConfig;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Client built from discovered metadata: auth URL always set, token and
/// userinfo URLs only if advertised.
type ConfiguredCoreClient = CoreClient<
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointMaybeSet,
    EndpointMaybeSet,
>;

/// Keycloak realm acting as the identity provider.
pub struct KeycloakProvider {
    client: ConfiguredCoreClient,
    http_client: reqwest::Client,
}

impl KeycloakProvider {
    /// Create a provider by discovering the realm's OIDC metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The issuer or callback URL is invalid
    /// - Discovery fails (network error or invalid metadata)
    pub async fn discover(config: &OidcProviderConfig) -> Result<Self> {
        let issuer = config
            .issuer_url()
            .map_err(|e| AppError::wrap(ErrorCode::InvalidInput, e, "invalid issuer URL"))?;
        let issuer_url = IssuerUrl::new(issuer.as_str().to_string())
            .map_err(|e| AppError::wrap(ErrorCode::InvalidInput, e, "invalid issuer URL"))?;

        // Redirects are never followed.
        let http_client = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| {
                AppError::wrap(ErrorCode::InternalError, e, "failed to build HTTP client")
            })?;

        let provider_metadata = CoreProviderMetadata::discover_async(issuer_url, &http_client)
            .await
            .map_err(|e| {
                AppError::wrap(
                    ErrorCode::ExternalService,
                    e,
                    "failed to discover OIDC provider metadata",
                )
            })?;

        let redirect_url = RedirectUrl::new(config.callback_url.to_string())
            .map_err(|e| AppError::wrap(ErrorCode::InvalidInput, e, "invalid callback URL"))?;

        let client = CoreClient::from_provider_metadata(
            provider_metadata,
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
        )
        .set_redirect_uri(redirect_url);

        tracing::info!(issuer = %issuer, "discovered OIDC provider");

        Ok(Self {
            client,
            http_client,
        })
    }
}

impl AuthorizationUrlBuilder for KeycloakProvider {
    fn authorization_url(&self, state: &str) -> Result<Url> {
        let state = state.to_string();
        let (auth_url, _csrf_token, _nonce) = self
            .client
            .authorize_url(
                CoreAuthenticationFlow::AuthorizationCode,
                move || CsrfToken::new(state),
                Nonce::new_random,
            )
            .add_scope(Scope::new("profile".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .url();

        Ok(auth_url)
    }
}

#[async_trait]
impl CodeExchanger for KeycloakProvider {
    async fn exchange_code(&self, code: &str) -> Result<TokenSet> {
        let token_response = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .map_err(|e| {
                AppError::wrap(ErrorCode::ExternalService, e, "token endpoint not configured")
            })?
            .request_async(&self.http_client)
            .await
            .map_err(|e| {
                AppError::wrap(
                    ErrorCode::ExternalService,
                    e,
                    "failed to exchange authorization code",
                )
            })?;

        Ok(TokenSet {
            access_token: token_response.access_token().secret().clone(),
            refresh_token: token_response
                .refresh_token()
                .map(|token| token.secret().clone()),
            id_token: token_response.id_token().map(|token| token.to_string()),
            expires_in: token_response.expires_in(),
        })
    }
}

#[async_trait]
impl IdTokenVerifier for KeycloakProvider {
    async fn verify_id_token(&self, raw_id_token: &str) -> Result<IdTokenClaims> {
        let id_token = CoreIdToken::from_str(raw_id_token)
            .map_err(|e| AppError::wrap(ErrorCode::Unauthorized, e, "malformed ID token"))?;

        // No nonce is stored between login and callback; the state cookie
        // binds the two.
        let claims = id_token
            .claims(&self.client.id_token_verifier(), |_: Option<&Nonce>| Ok(()))
            .map_err(|e| {
                AppError::wrap(ErrorCode::Unauthorized, e, "failed to verify ID token")
            })?;

        Ok(IdTokenClaims {
            subject: claims.subject().to_string(),
            email: claims.email().map(|e| e.to_string()),
            name: claims
                .name()
                .and_then(|n| n.get(None))
                .map(|n| n.to_string()),
            expires_at: claims.expiration(),
        })
    }
}
