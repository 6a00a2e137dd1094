//! Session domain entities
//!
//! [`Session`] is the authoritative record of an ongoing party: participants,
//! append-only history, turn counters, configuration and lifecycle state.
//! All mutation goes through its narrow methods so the invariants (no
//! duplicate participants, single consistent moderator flag, non-decreasing
//! turn numbers, no dangling message attribution) are enforced in one place.

use crate::core::error::DomainError;
use crate::core::ids::{AgentId, SessionId};
use crate::core::topic::Topic;
use crate::participant::{Participant, PersonaProfile};
use crate::session::config::{ConfigPatch, SessionConfig, SessionState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Orchestration metadata attached to a message
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageMetadata {
    /// Participants mentioned (`@id`) in the content, first-seen order
    #[serde(default)]
    pub mentions: Vec<AgentId>,
    #[serde(default)]
    pub is_moderator_intro: bool,
    #[serde(default)]
    pub is_moderator_summary: bool,
    /// Dynamic-ordering score the speaker was selected with, if any
    #[serde(default)]
    pub relevance_score: Option<i64>,
}

/// A message in the party history (Entity)
///
/// Immutable once appended. Ordering is append order, which the sequence
/// `id` reflects; `timestamp_ms` is for display only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AgentId>,
    pub timestamp_ms: i64,
    /// The round this message belongs to
    pub turn_number: u32,
    #[serde(default)]
    pub metadata: MessageMetadata,
}

/// A message before the session assigns its id and timestamp
#[derive(Debug, Clone)]
pub struct MessageDraft {
    pub role: Role,
    pub content: String,
    pub agent_id: Option<AgentId>,
    pub turn_number: u32,
    pub metadata: MessageMetadata,
}

impl MessageDraft {
    pub fn user(content: impl Into<String>, turn_number: u32) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            agent_id: None,
            turn_number,
            metadata: MessageMetadata::default(),
        }
    }

    pub fn assistant(
        agent_id: impl Into<AgentId>,
        content: impl Into<String>,
        turn_number: u32,
    ) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            agent_id: Some(agent_id.into()),
            turn_number,
            metadata: MessageMetadata::default(),
        }
    }

    pub fn with_mentions(mut self, mentions: Vec<AgentId>) -> Self {
        self.metadata.mentions = mentions;
        self
    }

    pub fn as_moderator_intro(mut self) -> Self {
        self.metadata.is_moderator_intro = true;
        self
    }

    pub fn as_moderator_summary(mut self) -> Self {
        self.metadata.is_moderator_summary = true;
        self
    }

    pub fn with_relevance_score(mut self, score: i64) -> Self {
        self.metadata.relevance_score = Some(score);
        self
    }
}

/// The complete mutable state of one ongoing party discussion (Aggregate Root)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    owner_id: String,
    config: SessionConfig,
    topic: Topic,
    participants: Vec<Participant>,
    history: Vec<Message>,
    current_turn: u32,
    current_speaker_index: usize,
    state: SessionState,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a session from resolved persona profiles.
    ///
    /// Duplicate agent ids are dropped (first occurrence wins). Moderator
    /// flags are derived from `config.moderator_id`. Fails when fewer than
    /// two distinct participants remain.
    pub fn new(
        id: SessionId,
        owner_id: impl Into<String>,
        topic: Topic,
        profiles: &[PersonaProfile],
        config: SessionConfig,
    ) -> Result<Self, DomainError> {
        let mut participants: Vec<Participant> = Vec::with_capacity(profiles.len());
        for profile in profiles {
            if participants.iter().any(|p| p.agent_id == profile.id) {
                continue;
            }
            let is_moderator = config.moderator_id.as_ref() == Some(&profile.id);
            participants.push(Participant::from_profile(profile, is_moderator));
        }

        if participants.len() < 2 {
            return Err(DomainError::NotEnoughParticipants {
                required: 2,
                actual: participants.len(),
            });
        }

        let now = Utc::now();
        Ok(Self {
            id,
            owner_id: owner_id.into(),
            config,
            topic,
            participants,
            history: Vec::new(),
            current_turn: 0,
            current_speaker_index: 0,
            state: SessionState::Active,
            created_at: now,
            updated_at: now,
        })
    }

    // ==================== Accessors ====================

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Participants in insertion order (the default speaking order)
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// The highest fully processed round number
    pub fn current_turn(&self) -> u32 {
        self.current_turn
    }

    pub fn current_speaker_index(&self) -> usize {
        self.current_speaker_index
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn participant(&self, agent_id: &AgentId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.agent_id == agent_id)
    }

    pub fn is_participant(&self, agent_id: &AgentId) -> bool {
        self.participant(agent_id).is_some()
    }

    /// Participants in the regular speaking rotation (moderator excluded)
    pub fn non_moderators(&self) -> Vec<&Participant> {
        self.participants.iter().filter(|p| !p.is_moderator).collect()
    }

    pub fn moderator(&self) -> Option<&Participant> {
        self.participants.iter().find(|p| p.is_moderator)
    }

    /// Highest turn count among non-moderator participants
    pub fn max_turn_count(&self) -> u32 {
        self.participants
            .iter()
            .filter(|p| !p.is_moderator)
            .map(|p| p.turn_count)
            .max()
            .unwrap_or(0)
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.history.last()
    }

    pub fn messages_in_turn(&self, turn: u32) -> impl Iterator<Item = &Message> {
        self.history.iter().filter(move |m| m.turn_number == turn)
    }

    pub fn has_spoken_in_turn(&self, agent_id: &AgentId, turn: u32) -> bool {
        self.messages_in_turn(turn)
            .any(|m| m.agent_id.as_ref() == Some(agent_id))
    }

    // ==================== Mutation ====================

    /// Append a message, assigning its sequence id and timestamp.
    ///
    /// Bumps the speaking participant's turn count when the draft carries an
    /// attribution; attribution to an agent that is not enrolled is rejected
    /// so history never dangles.
    pub fn add_message(&mut self, draft: MessageDraft) -> Result<&Message, DomainError> {
        if let Some(agent_id) = &draft.agent_id {
            let Some(participant) = self.participants.iter_mut().find(|p| &p.agent_id == agent_id)
            else {
                return Err(DomainError::UnknownParticipant(agent_id.to_string()));
            };
            participant.turn_count += 1;
        }

        debug_assert!(
            self.history
                .last()
                .map(|m| m.turn_number <= draft.turn_number)
                .unwrap_or(true),
            "turn numbers must be non-decreasing"
        );

        let message = Message {
            id: self.history.len() as u64 + 1,
            role: draft.role,
            content: draft.content,
            agent_id: draft.agent_id,
            timestamp_ms: Utc::now().timestamp_millis(),
            turn_number: draft.turn_number,
            metadata: draft.metadata,
        };
        self.history.push(message);
        self.touch();
        // Just pushed, so last() is always present.
        Ok(self.history.last().unwrap())
    }

    /// Merge a partial reconfiguration, re-deriving moderator flags when the
    /// moderator changed.
    pub fn apply_config(&mut self, patch: ConfigPatch) {
        let moderator_changed = self.config.apply(patch);
        if moderator_changed {
            let moderator_id = self.config.moderator_id.clone();
            for participant in &mut self.participants {
                participant.is_moderator = Some(&participant.agent_id) == moderator_id.as_ref();
            }
        }
        self.touch();
    }

    /// Set turn bookkeeping explicitly; the driver computes the new values.
    pub fn advance_turn(&mut self, turn: u32, speaker_index: usize) {
        self.current_turn = turn;
        self.current_speaker_index = speaker_index;
        self.touch();
    }

    pub fn set_state(&mut self, state: SessionState) {
        self.state = state;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    #[cfg(test)]
    pub(crate) fn participant_mut_for_test(&mut self, agent_id: &AgentId) -> &mut Participant {
        self.participants
            .iter_mut()
            .find(|p| &p.agent_id == agent_id)
            .expect("participant not enrolled")
    }
}
