//! OIDC authentication for the backend-for-frontend gateway.
//!
//! This crate provides:
//! - The authorization-code flow against Keycloak ([`AuthFlow`])
//! - Login, callback, logout and session routes ([`auth_routes`])
//! - Session storage (in-memory, or Redis via the `redis` feature)

mod config;
mod cookies;
mod handlers;
mod providers;
mod service;
mod sessions;
mod state;

pub use config::{AuthConfig, ConfigError, OidcProviderConfig, FLOW_COOKIE_TTL, SESSION_TTL};
pub use cookies::{ACCESS_TOKEN_COOKIE, RETURN_TO_COOKIE, SESSION_COOKIE, STATE_COOKIE};
pub use handlers::{auth_routes, CallbackQuery, LoginQuery, SessionStatus};
pub use providers::KeycloakProvider;
#[cfg(any(test, feature = "mock"))]
pub use providers::{
    MockBehavior, MockProvider, MOCK_ACCESS_TOKEN, MOCK_ID_TOKEN, MOCK_REFRESH_TOKEN,
    MOCK_SUBJECT,
};
pub use service::{AuthFlow, EXCHANGE_TIMEOUT};
pub use sessions::InMemorySessionStore;
#[cfg(feature = "redis")]
pub use sessions::RedisSessionStore;
pub use state::AuthState;
