//! Application state for auth.

use std::sync::Arc;

use bff_core::auth::SessionRepository;

use crate::{config::AuthConfig, service::AuthFlow};

/// Shared state for auth handlers.
#[derive(Clone)]
pub struct AuthState {
    pub flow: Arc<AuthFlow>,
    pub sessions: Arc<dyn SessionRepository>,
    pub config: Arc<AuthConfig>,
}

impl AuthState {
    pub fn new(flow: AuthFlow, sessions: Arc<dyn SessionRepository>, config: AuthConfig) -> Self {
        Self {
            flow: Arc::new(flow),
            sessions,
            config: Arc::new(config),
        }
    }
}
