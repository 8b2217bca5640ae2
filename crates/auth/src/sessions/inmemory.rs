//! In-memory session storage.

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use bff_core::{
    auth::{Session, SessionId, SessionRepository},
    error::Result,
    AppError, ErrorCode,
};

#[derive(Debug, Clone)]
struct Entry {
    session: Session,
    evict_at: DateTime<Utc>,
}

/// In-memory session store for single-instance deployments and tests.
///
/// Entries past their TTL are never returned and are purged when read.
/// Data is lost when the process exits.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Entry>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held, expired ones included.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionStore {
    async fn put_session(&self, id: &SessionId, session: &Session, ttl: Duration) -> Result<()> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| AppError::wrap(ErrorCode::InternalError, e, "session TTL out of range"))?;

        let mut sessions = self.sessions.write().await;
        sessions.insert(
            id.as_str().to_string(),
            Entry {
                session: session.clone(),
                evict_at: Utc::now() + ttl,
            },
        );
        Ok(())
    }

    async fn get_session(&self, id: &SessionId) -> Result<Option<Session>> {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(id.as_str()) {
                None => return Ok(None),
                Some(entry) if entry.evict_at > Utc::now() => {
                    return Ok(Some(entry.session.clone()))
                }
                Some(_) => {}
            }
        }

        let mut sessions = self.sessions.write().await;
        sessions.remove(id.as_str());
        Ok(None)
    }

    async fn delete_session(&self, id: &SessionId) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(id.as_str());
        Ok(())
    }
}
