//! Domain layer for roundtable
//!
//! This crate contains the core business logic of party mode: several
//! independently defined personas take part in a shared, turn-based
//! discussion. A topic is posed, each persona contributes once per round, an
//! optional moderator opens the discussion and summarizes each round, and
//! participants hand the floor to one another with `@mentions`.
//!
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! - **Session**: the mutable record of one ongoing party — participants,
//!   append-only history, turn counters, configuration, lifecycle state.
//! - **Round**: one pass in which every non-moderator participant speaks
//!   once; identified by `turn_number`.
//! - **Turn ordering**: round-robin, relevance-weighted dynamic, or
//!   moderator-directed — pure functions dispatched on an enum.
//! - **Handoff**: explicit redirection of the floor via an `@mention`.

pub mod core;
pub mod mention;
pub mod moderator;
pub mod ordering;
pub mod participant;
pub mod prompt;
pub mod session;

// Re-export commonly used types
pub use crate::core::{
    error::DomainError,
    ids::{AgentId, SessionId},
    topic::Topic,
};
pub use mention::{find_handoff, handoff_target, parse_mentions, MentionScan};
pub use ordering::{
    next_speaker, scored_candidates, speakers_for_round, NoJitter, RandomJitter, ScoredSpeaker,
    TieBreaker, MAX_JITTER,
};
pub use participant::{Participant, PersonaProfile};
pub use prompt::PartyPromptTemplate;
pub use session::{
    ConfigPatch, Message, MessageDraft, MessageMetadata, Role, Session, SessionConfig,
    SessionState, TurnOrdering,
};
