//! Redis session storage implementation.

use std::{future::Future, time::Duration};

use async_trait::async_trait;
use bff_core::{
    auth::{Session, SessionId, SessionRepository},
    error::Result,
    AppError, ErrorCode,
};
use fred::prelude::*;

/// Upper bound for a single Redis round trip.
pub const OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

const POOL_SIZE: usize = 4;

/// Redis-backed session storage.
///
/// Sessions are stored as JSON under `<namespace>:<session id>` with an `EX`
/// expiry, so Redis evicts them on its own.
#[derive(Clone)]
pub struct RedisSessionStore {
    pool: Pool,
    namespace: String,
}

impl RedisSessionStore {
    /// Creates a store on top of an initialised pool.
    pub fn new(pool: Pool, namespace: impl Into<String>) -> Self {
        Self {
            pool,
            namespace: namespace.into(),
        }
    }

    /// Connects to `url` (e.g. `redis://localhost:6379/0`).
    ///
    /// # Errors
    ///
    /// Returns `DB_CONNECTION_FAILED` if the URL is invalid or the server is
    /// unreachable, `DB_TIMEOUT` if connecting takes too long.
    pub async fn connect(url: &str, namespace: impl Into<String>) -> Result<Self> {
        let config = Config::from_url(url).map_err(|e| {
            AppError::wrap(ErrorCode::DbConnection, e, "invalid session store URL")
        })?;
        let pool = Builder::from_config(config)
            .build_pool(POOL_SIZE)
            .map_err(|e| {
                AppError::wrap(ErrorCode::DbConnection, e, "failed to build session store pool")
            })?;

        with_timeout(pool.init(), "failed to connect to session store").await?;

        Ok(Self::new(pool, namespace))
    }

    fn session_key(&self, id: &SessionId) -> String {
        format!("{}:{}", self.namespace, id)
    }
}

/// Bounds `operation` by [`OPERATION_TIMEOUT`] and maps client errors.
async fn with_timeout<T, F>(operation: F, message: &'static str) -> Result<T>
where
    F: Future<Output = std::result::Result<T, Error>>,
{
    match tokio::time::timeout(OPERATION_TIMEOUT, operation).await {
        Ok(result) => result.map_err(|e| AppError::wrap(ErrorCode::DbConnection, e, message)),
        Err(elapsed) => Err(AppError::wrap(ErrorCode::DbTimeout, elapsed, message)),
    }
}

#[async_trait]
impl SessionRepository for RedisSessionStore {
    async fn put_session(&self, id: &SessionId, session: &Session, ttl: Duration) -> Result<()> {
        let key = self.session_key(id);
        let value = serde_json::to_string(session).map_err(|e| {
            AppError::wrap(ErrorCode::SerializationError, e, "failed to encode session")
        })?;
        let ttl_secs = ttl.as_secs().max(1) as i64;

        with_timeout(
            self.pool
                .set::<(), _, _>(&key, value, Some(Expiration::EX(ttl_secs)), None, false),
            "failed to store session",
        )
        .await
    }

    async fn get_session(&self, id: &SessionId) -> Result<Option<Session>> {
        let key = self.session_key(id);
        let value: Option<String> =
            with_timeout(self.pool.get(&key), "failed to load session").await?;

        value
            .map(|json| {
                serde_json::from_str(&json).map_err(|e| {
                    AppError::wrap(ErrorCode::SerializationError, e, "failed to decode session")
                })
            })
            .transpose()
    }

    async fn delete_session(&self, id: &SessionId) -> Result<()> {
        let key = self.session_key(id);
        with_timeout(self.pool.del::<(), _>(&key), "failed to delete session").await
    }
}
