//! services/api/src/adapters/memory_store.rs
//!
//! In-process implementation of the `SessionStore` port. Every mutation goes
//! through a single write lock, and `save` only lands when the caller's copy
//! still carries the stored version.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::domain::{QuestionId, Session};
use quiz_core::ports::{PortError, PortResult, SessionStore};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, user_id: &str, question_ids: Vec<QuestionId>) -> PortResult<Session> {
        let mut sessions = self.sessions.write().await;
        let mut session = Session::new(user_id, question_ids);
        // Keep versions increasing across replacements so a save holding the
        // abandoned attempt can never land on the new one.
        if let Some(previous) = sessions.get(user_id) {
            session.version = previous.version + 1;
        }
        sessions.insert(user_id.to_string(), session.clone());
        Ok(session)
    }

    async fn get(&self, user_id: &str) -> PortResult<Session> {
        self.sessions
            .read()
            .await
            .get(user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("session for user {}", user_id)))
    }

    async fn save(&self, mut session: Session) -> PortResult<Session> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions
            .get_mut(&session.user_id)
            .ok_or_else(|| PortError::NotFound(format!("session for user {}", session.user_id)))?;
        if stored.version != session.version || stored.attempt_id != session.attempt_id {
            return Err(PortError::Conflict(format!(
                "session for user {} is at version {}, not {}",
                session.user_id, stored.version, session.version
            )));
        }
        session.version += 1;
        *stored = session.clone();
        Ok(session)
    }

    async fn delete(&self, user_id: &str) -> PortResult<()> {
        self.sessions.write().await.remove(user_id);
        Ok(())
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> PortResult<usize> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.updated_at >= cutoff);
        Ok(before - sessions.len())
    }
}
