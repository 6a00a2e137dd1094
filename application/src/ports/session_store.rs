//! Session store port
//!
//! The single shared mutable resource of the engine. All session mutation
//! goes through this narrow API so the domain invariants stay centrally
//! enforceable; the driver and the strategies never mutate fields directly.
//!
//! Implementations may be backed by any keyed storage — the in-process map
//! in the infrastructure layer, or an external key-value store for
//! multi-instance deployments. The orchestration logic must not assume
//! in-process storage.

use async_trait::async_trait;
use chrono::Duration;
use roundtable_domain::{
    ConfigPatch, DomainError, MessageDraft, Session, SessionId, SessionState,
};

/// Keyed storage for party sessions.
///
/// "Not found" is part of the normal return shape (`Option` / typed error),
/// never a panic.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a newly created session
    async fn insert(&self, session: Session);

    /// Snapshot of a session by id
    async fn get(&self, id: &SessionId) -> Option<Session>;

    /// Snapshots of every session belonging to the owner
    async fn list_for_owner(&self, owner_id: &str) -> Vec<Session>;

    /// Append a message; returns the updated session snapshot
    async fn add_message(
        &self,
        id: &SessionId,
        draft: MessageDraft,
    ) -> Result<Session, DomainError>;

    /// Merge a partial reconfiguration; returns the updated snapshot
    async fn update_config(
        &self,
        id: &SessionId,
        patch: ConfigPatch,
    ) -> Result<Session, DomainError>;

    /// Set turn bookkeeping explicitly (the driver computes the values)
    async fn advance_turn(
        &self,
        id: &SessionId,
        turn: u32,
        speaker_index: usize,
    ) -> Result<Session, DomainError>;

    /// Set the lifecycle state
    async fn set_state(
        &self,
        id: &SessionId,
        state: SessionState,
    ) -> Result<Session, DomainError>;

    /// Remove a session; returns whether it existed
    async fn remove(&self, id: &SessionId) -> bool;

    /// Remove every session idle for longer than `max_age`; returns the
    /// count removed. Meant to run on a periodic timer external to any
    /// single request.
    async fn sweep_idle(&self, max_age: Duration) -> usize;
}
