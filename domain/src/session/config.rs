//! Session configuration and lifecycle state

use crate::core::ids::AgentId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the next speaker is chosen within a round.
///
/// Strategy selection is a pure function of this value; the three variants
/// share one stateless function signature (see [`crate::ordering`]), so no
/// trait object or inheritance-style dispatch is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TurnOrdering {
    /// Participants speak in their stored (insertion) order
    #[default]
    RoundRobin,
    /// Relevance-weighted selection biased toward participants who have
    /// spoken least; explicit mentions always win
    Dynamic,
    /// The moderator's mentions direct the floor; falls back to round-robin
    ModeratorDirected,
}

impl TurnOrdering {
    /// Parse leniently: unrecognized values fall back to round-robin
    /// rather than failing. Used at configuration boundaries.
    pub fn from_str_lossy(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for TurnOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnOrdering::RoundRobin => write!(f, "round-robin"),
            TurnOrdering::Dynamic => write!(f, "dynamic"),
            TurnOrdering::ModeratorDirected => write!(f, "moderator-directed"),
        }
    }
}

impl std::str::FromStr for TurnOrdering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "round-robin" | "round_robin" | "roundrobin" => Ok(TurnOrdering::RoundRobin),
            "dynamic" => Ok(TurnOrdering::Dynamic),
            "moderator-directed" | "moderator_directed" | "moderated" => {
                Ok(TurnOrdering::ModeratorDirected)
            }
            _ => Err(format!("Invalid TurnOrdering: {}", s)),
        }
    }
}

/// Lifecycle state of a session.
///
/// `Active ⇄ Paused` is user-triggered; `Completed` is reached only by
/// explicit termination. `max_turns` never transitions a session on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Active,
    Paused,
    Completed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Active => write!(f, "active"),
            SessionState::Paused => write!(f, "paused"),
            SessionState::Completed => write!(f, "completed"),
        }
    }
}

/// Configuration of a party session (Entity)
///
/// Immutable during a round; reconfigured between rounds via
/// [`ConfigPatch`], which also re-derives each participant's moderator flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Persona categories admitted to the party; empty means unrestricted
    #[serde(default)]
    pub category_filter: Vec<String>,
    #[serde(default)]
    pub turn_ordering: TurnOrdering,
    #[serde(default)]
    pub moderator_id: Option<AgentId>,
    /// Advisory round budget; the state machine never enforces it
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
}

fn default_max_turns() -> u32 {
    10
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            category_filter: Vec::new(),
            turn_ordering: TurnOrdering::default(),
            moderator_id: None,
            max_turns: default_max_turns(),
        }
    }
}

impl SessionConfig {
    pub fn with_turn_ordering(mut self, ordering: TurnOrdering) -> Self {
        self.turn_ordering = ordering;
        self
    }

    pub fn with_moderator(mut self, moderator: impl Into<AgentId>) -> Self {
        self.moderator_id = Some(moderator.into());
        self
    }

    pub fn with_category_filter(mut self, categories: Vec<String>) -> Self {
        self.category_filter = categories;
        self
    }

    /// Check whether a persona category passes the filter
    pub fn allows_category(&self, category: &str) -> bool {
        self.category_filter.is_empty()
            || self
                .category_filter
                .iter()
                .any(|c| c.eq_ignore_ascii_case(category))
    }

    /// Merge a partial reconfiguration into this config.
    ///
    /// Returns true if the moderator changed, so the caller knows to
    /// re-derive participant moderator flags.
    pub fn apply(&mut self, patch: ConfigPatch) -> bool {
        if let Some(filter) = patch.category_filter {
            self.category_filter = filter;
        }
        if let Some(ordering) = patch.turn_ordering {
            self.turn_ordering = ordering;
        }
        if let Some(max_turns) = patch.max_turns {
            self.max_turns = max_turns;
        }
        let mut moderator_changed = false;
        if let Some(moderator_id) = patch.moderator_id {
            moderator_changed = self.moderator_id != moderator_id;
            self.moderator_id = moderator_id;
        }
        moderator_changed
    }
}

/// Partial session reconfiguration.
///
/// `moderator_id` is doubly optional: `None` leaves the moderator untouched,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigPatch {
    #[serde(default)]
    pub category_filter: Option<Vec<String>>,
    #[serde(default)]
    pub turn_ordering: Option<TurnOrdering>,
    #[serde(default)]
    pub moderator_id: Option<Option<AgentId>>,
    #[serde(default)]
    pub max_turns: Option<u32>,
}

impl ConfigPatch {
    pub fn set_moderator(moderator: Option<AgentId>) -> Self {
        Self {
            moderator_id: Some(moderator),
            ..Default::default()
        }
    }

    pub fn set_turn_ordering(ordering: TurnOrdering) -> Self {
        Self {
            turn_ordering: Some(ordering),
            ..Default::default()
        }
    }
}
