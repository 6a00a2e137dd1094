//! Participant domain entities

use crate::core::ids::AgentId;
use serde::{Deserialize, Serialize};

/// Display metadata and declared capabilities of a persona, as resolved from
/// the persona catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaProfile {
    pub id: AgentId,
    pub name: String,
    pub icon: String,
    pub category: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl PersonaProfile {
    pub fn new(
        id: impl Into<AgentId>,
        name: impl Into<String>,
        icon: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: icon.into(),
            category: category.into(),
            capabilities: Vec::new(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: Vec<String>) -> Self {
        self.capabilities = capabilities;
        self
    }
}

/// A persona enrolled in one session (Entity)
///
/// Owned exclusively by its [`Session`](crate::session::Session); `turn_count`
/// is bumped only when a message attributed to this participant is appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub agent_id: AgentId,
    pub display_name: String,
    pub category: String,
    pub icon: String,
    pub is_moderator: bool,
    pub turn_count: u32,
}

impl Participant {
    pub fn from_profile(profile: &PersonaProfile, is_moderator: bool) -> Self {
        Self {
            agent_id: profile.id.clone(),
            display_name: profile.name.clone(),
            category: profile.category.clone(),
            icon: profile.icon.clone(),
            is_moderator,
            turn_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_profile() {
        let profile = PersonaProfile::new("Maven", "Maven", "🦉", "facilitation")
            .with_capabilities(vec!["summarizing".to_string()]);
        let p = Participant::from_profile(&profile, true);
        assert_eq!(p.agent_id.as_str(), "maven");
        assert_eq!(p.display_name, "Maven");
        assert!(p.is_moderator);
        assert_eq!(p.turn_count, 0);
    }
}
