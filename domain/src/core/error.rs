//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// Every variant is a value returned to the caller. Nothing in this crate
/// unwinds on bad input — the transport layer maps these deterministically
/// to user-facing responses.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Forbidden: session {0} belongs to another user")]
    Forbidden(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Topic cannot be empty")]
    EmptyTopic,

    #[error("A party needs at least {required} participants, got {actual}")]
    NotEnoughParticipants { required: usize, actual: usize },

    #[error("Unknown participant: {0}")]
    UnknownParticipant(String),

    #[error("Session {0} is not active")]
    SessionNotActive(String),
}

impl DomainError {
    /// Check if this error means the referenced session does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::SessionNotFound(_))
    }

    /// Check if this error is an ownership violation
    pub fn is_forbidden(&self) -> bool {
        matches!(self, DomainError::Forbidden(_))
    }
}
