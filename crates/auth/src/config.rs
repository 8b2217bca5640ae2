use std::time::Duration;

use url::Url;

/// Lifetime of the `session_token` and `access_token` cookies and of the
/// stored session.
pub const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Lifetime of the `oauth_state` and `return_to` cookies.
pub const FLOW_COOKIE_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {field} {value:?}: {reason}")]
    Invalid {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            field,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Keycloak client registration.
#[derive(Debug, Clone)]
pub struct OidcProviderConfig {
    pub base_url: Url,
    pub realm: String,
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: Url,
}

impl OidcProviderConfig {
    /// The realm's issuer, `<base>/realms/<realm>`.
    pub fn issuer_url(&self) -> Result<Url, ConfigError> {
        let issuer = format!(
            "{}/realms/{}",
            self.base_url.as_str().trim_end_matches('/'),
            self.realm
        );
        Url::parse(&issuer).map_err(|e| ConfigError::invalid("issuer", &issuer, e))
    }

    /// Keycloak's end-session endpoint, sending the browser back to
    /// `post_logout_redirect` afterwards.
    pub fn logout_url(&self, post_logout_redirect: &str) -> Result<Url, ConfigError> {
        let issuer = self.issuer_url()?;
        let endpoint = format!("{}/protocol/openid-connect/logout", issuer.as_str());
        let mut url =
            Url::parse(&endpoint).map_err(|e| ConfigError::invalid("logout url", &endpoint, e))?;
        url.query_pairs_mut()
            .append_pair("post_logout_redirect_uri", post_logout_redirect)
            .append_pair("client_id", &self.client_id);
        Ok(url)
    }
}

/// Settings the auth handlers need at request time.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Frontend origin, without a trailing slash.
    pub frontend_base_url: String,
    pub logout_url: Url,
    /// Sets the `Secure` attribute on every cookie.
    pub use_https: bool,
    pub session_ttl: Duration,
    pub flow_cookie_ttl: Duration,
}

impl AuthConfig {
    pub fn new(
        provider: &OidcProviderConfig,
        frontend_base_url: &str,
        use_https: bool,
    ) -> Result<Self, ConfigError> {
        let frontend = Url::parse(frontend_base_url)
            .map_err(|e| ConfigError::invalid("frontend base url", frontend_base_url, e))?;
        if !matches!(frontend.scheme(), "http" | "https") || !frontend.has_host() {
            return Err(ConfigError::invalid(
                "frontend base url",
                frontend_base_url,
                "must be an absolute http(s) URL",
            ));
        }
        let frontend_base_url = frontend.as_str().trim_end_matches('/').to_string();

        Ok(Self {
            logout_url: provider.logout_url(&frontend_base_url)?,
            frontend_base_url,
            use_https,
            session_ttl: SESSION_TTL,
            flow_cookie_ttl: FLOW_COOKIE_TTL,
        })
    }

    /// Absolute frontend URL for an application-relative path.
    pub fn frontend_url(&self, path: &str) -> String {
        format!("{}{}", self.frontend_base_url, path)
    }
}

#[cfg(test)]
pub(crate) fn test_provider_config() -> OidcProviderConfig {
    OidcProviderConfig {
        base_url: Url::parse("http://keycloak:8080").unwrap(),
        realm: "app".to_string(),
        client_id: "bff".to_string(),
        client_secret: "secret".to_string(),
        callback_url: Url::parse("http://localhost:8000/auth/callback").unwrap(),
    }
}
