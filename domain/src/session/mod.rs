//! Party session state: history, participants, configuration

pub mod config;
pub mod entities;

pub use config::{ConfigPatch, SessionConfig, SessionState, TurnOrdering};
pub use entities::{Message, MessageDraft, MessageMetadata, Role, Session};
