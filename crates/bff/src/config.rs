use bff_auth::OidcProviderConfig;
use clap::{Parser, ValueEnum};
use url::Url;

/// Default `RUST_LOG` directives.
pub const DEFAULT_LOG_FILTER: &str = "bff=info,bff_api=info,bff_auth=info,tower_http=info";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// BFF - Runs the OIDC login flow on behalf of a browser app
#[derive(Parser, Debug)]
#[command(name = "bff")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Host address to bind the server to
    #[arg(long, short = 'H', default_value = "0.0.0.0", env = "HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(long, short, env = "SERVER_PORT")]
    pub port: u16,

    /// Keycloak base URL, e.g. http://keycloak:8080
    #[arg(long, env = "KEYCLOAK_BASE_URL")]
    pub keycloak_base_url: Url,

    /// Keycloak realm
    #[arg(long, env = "KEYCLOAK_REALM")]
    pub keycloak_realm: String,

    /// OIDC client id
    #[arg(long, env = "KEYCLOAK_CLIENT_ID")]
    pub keycloak_client_id: String,

    /// OIDC client secret
    #[arg(long, env = "KEYCLOAK_CLIENT_SECRET", hide_env_values = true)]
    pub keycloak_client_secret: String,

    /// Redirect URL registered with Keycloak, pointing at /auth/callback
    #[arg(long, env = "KEYCLOAK_CALLBACK_URL")]
    pub keycloak_callback_url: Url,

    /// Frontend origin: the only trusted CORS origin and the base for post-login redirects
    #[arg(long, env = "FRONTEND_BASE_URL")]
    pub frontend_base_url: String,

    /// Mark cookies Secure
    #[arg(long, env = "USE_HTTPS")]
    pub use_https: bool,

    /// Redis URL for the session store; sessions stay in memory when unset
    #[arg(long, env = "SESSION_STORE_URL")]
    pub session_store_url: Option<String>,

    /// Key prefix for stored sessions
    #[arg(long, env = "SESSION_STORE_NAMESPACE", default_value = "sessions")]
    pub session_store_namespace: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl Cli {
    pub fn provider_config(&self) -> OidcProviderConfig {
        OidcProviderConfig {
            base_url: self.keycloak_base_url.clone(),
            realm: self.keycloak_realm.clone(),
            client_id: self.keycloak_client_id.clone(),
            client_secret: self.keycloak_client_secret.clone(),
            callback_url: self.keycloak_callback_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 15] = [
        "bff",
        "--port",
        "8000",
        "--keycloak-base-url",
        "http://keycloak:8080",
        "--keycloak-realm",
        "app",
        "--keycloak-client-id",
        "bff",
        "--keycloak-client-secret",
        "secret",
        "--keycloak-callback-url",
        "http://localhost:8000/auth/callback",
        "--frontend-base-url",
        "http://localhost:3000",
    ];

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_apply_to_optional_settings() {
        let cli = Cli::try_parse_from(REQUIRED).unwrap();

        assert_eq!(cli.port, 8000);
        assert!(!cli.use_https);
        assert_eq!(cli.session_store_url, None);
        assert_eq!(cli.session_store_namespace, "sessions");
        assert_eq!(cli.log_format, LogFormat::Pretty);

        let provider = cli.provider_config();
        assert_eq!(provider.realm, "app");
        assert_eq!(provider.client_id, "bff");
    }

    #[test]
    fn flags_override_defaults() {
        let mut args = REQUIRED.to_vec();
        args.extend([
            "--use-https",
            "--log-format",
            "json",
            "--session-store-url",
            "redis://localhost:6379",
        ]);

        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.use_https);
        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(
            cli.session_store_url.as_deref(),
            Some("redis://localhost:6379")
        );
    }

    #[test]
    fn malformed_urls_are_rejected() {
        let mut args = REQUIRED.to_vec();
        args[4] = "not a url";
        assert!(Cli::try_parse_from(args).is_err());
    }
}
