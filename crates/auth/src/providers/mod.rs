//! Identity provider implementations.
//!
//! - Keycloak, through OIDC discovery
//! - An in-memory mock (`mock` feature)

mod keycloak;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use keycloak::KeycloakProvider;
#[cfg(any(test, feature = "mock"))]
pub use mock::{
    MockBehavior, MockProvider, MOCK_ACCESS_TOKEN, MOCK_ID_TOKEN, MOCK_REFRESH_TOKEN,
    MOCK_SUBJECT,
};
