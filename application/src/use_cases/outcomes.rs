//! Outcome value objects returned by the party use cases

use chrono::{DateTime, Utc};
use roundtable_domain::{
    AgentId, Message, Participant, Session, SessionConfig, SessionId, SessionState, TurnOrdering,
};
use serde::{Deserialize, Serialize};

/// What kind of contribution a round response is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionKind {
    ModeratorIntro,
    Contribution,
    ModeratorSummary,
    ModeratorDirection,
}

/// One generated contribution within a round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundResponse {
    pub agent_id: AgentId,
    pub display_name: String,
    pub content: String,
    pub kind: ContributionKind,
    pub turn_number: u32,
    /// False when the provider call failed and its error text was recorded
    /// as the content instead
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RoundResponse {
    pub fn success(
        agent_id: AgentId,
        display_name: impl Into<String>,
        content: impl Into<String>,
        kind: ContributionKind,
        turn_number: u32,
    ) -> Self {
        Self {
            agent_id,
            display_name: display_name.into(),
            content: content.into(),
            kind,
            turn_number,
            success: true,
            error: None,
        }
    }

    pub fn failure(
        agent_id: AgentId,
        display_name: impl Into<String>,
        error_text: impl Into<String>,
        kind: ContributionKind,
        turn_number: u32,
    ) -> Self {
        let error_text = error_text.into();
        Self {
            agent_id,
            display_name: display_name.into(),
            content: error_text.clone(),
            kind,
            turn_number,
            success: false,
            error: Some(error_text),
        }
    }
}

/// Result of starting a party session
#[derive(Debug, Clone, Serialize)]
pub struct StartOutcome {
    pub session_id: SessionId,
    pub participants: Vec<Participant>,
    /// Requested ids that could not join: unknown to the catalog, filtered
    /// out by category, or duplicates
    pub skipped: Vec<AgentId>,
    pub responses: Vec<RoundResponse>,
    pub total_turns: u32,
    pub config: SessionConfig,
}

/// Result of continuing a party session by one round
#[derive(Debug, Clone, Serialize)]
pub struct ContinueOutcome {
    pub session_id: SessionId,
    pub responses: Vec<RoundResponse>,
    pub history: Vec<Message>,
    pub total_turns: u32,
}

/// Compact listing entry for a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub id: SessionId,
    pub topic: String,
    pub participant_names: Vec<String>,
    pub state: SessionState,
    pub turn_ordering: TurnOrdering,
    pub total_turns: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionSummary {
    pub fn of(session: &Session) -> Self {
        Self {
            id: session.id().clone(),
            topic: session.topic().content().to_string(),
            participant_names: session
                .participants()
                .iter()
                .map(|p| p.display_name.clone())
                .collect(),
            state: session.state(),
            turn_ordering: session.config().turn_ordering,
            total_turns: session.current_turn(),
            created_at: session.created_at(),
            updated_at: session.updated_at(),
        }
    }
}
