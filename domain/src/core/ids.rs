//! Identifier value objects

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a persona in the catalog (Value Object)
///
/// Stored lower-cased so that lookups, mentions and equality checks are all
/// case-insensitive without callers having to remember to normalize.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        AgentId::new(s)
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        AgentId::new(s)
    }
}

/// Identifier of a party session (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        SessionId::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_id_lowercases() {
        assert_eq!(AgentId::new("Alice").as_str(), "alice");
        assert_eq!(AgentId::new("  BOB  ").as_str(), "bob");
    }

    #[test]
    fn test_agent_id_equality_is_case_insensitive() {
        assert_eq!(AgentId::new("Alice"), AgentId::new("aLiCe"));
    }

    #[test]
    fn test_session_id_passthrough() {
        let id = SessionId::new("ABC-123");
        assert_eq!(id.as_str(), "ABC-123");
    }
}
