//! In-process session store
//!
//! A `RwLock<HashMap>` keyed by session id. Every mutation goes through the
//! domain's own methods, so the store enforces nothing on top of what
//! [`Session`] already guarantees. Snapshots returned to callers are clones;
//! holding one never blocks other sessions.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use roundtable_application::SessionStore;
use roundtable_domain::{
    ConfigPatch, DomainError, MessageDraft, Session, SessionId, SessionState,
};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory implementation of [`SessionStore`]
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    async fn mutate<F>(&self, id: &SessionId, f: F) -> Result<Session, DomainError>
    where
        F: FnOnce(&mut Session) -> Result<(), DomainError>,
    {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| DomainError::SessionNotFound(id.to_string()))?;
        f(session)?;
        Ok(session.clone())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: Session) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id().clone(), session);
    }

    async fn get(&self, id: &SessionId) -> Option<Session> {
        self.sessions.read().await.get(id).cloned()
    }

    async fn list_for_owner(&self, owner_id: &str) -> Vec<Session> {
        self.sessions
            .read()
            .await
            .values()
            .filter(|s| s.owner_id() == owner_id)
            .cloned()
            .collect()
    }

    async fn add_message(
        &self,
        id: &SessionId,
        draft: MessageDraft,
    ) -> Result<Session, DomainError> {
        self.mutate(id, |s| s.add_message(draft).map(|_| ())).await
    }

    async fn update_config(
        &self,
        id: &SessionId,
        patch: ConfigPatch,
    ) -> Result<Session, DomainError> {
        self.mutate(id, |s| {
            s.apply_config(patch);
            Ok(())
        })
        .await
    }

    async fn advance_turn(
        &self,
        id: &SessionId,
        turn: u32,
        speaker_index: usize,
    ) -> Result<Session, DomainError> {
        self.mutate(id, |s| {
            s.advance_turn(turn, speaker_index);
            Ok(())
        })
        .await
    }

    async fn set_state(
        &self,
        id: &SessionId,
        state: SessionState,
    ) -> Result<Session, DomainError> {
        self.mutate(id, |s| {
            s.set_state(state);
            Ok(())
        })
        .await
    }

    async fn remove(&self, id: &SessionId) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    async fn sweep_idle(&self, max_age: Duration) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, s| {
            let idle = now.signed_duration_since(s.updated_at()) > max_age;
            if idle {
                debug!("Sweeping idle session {}", id);
            }
            !idle
        });
        before - sessions.len()
    }
}
