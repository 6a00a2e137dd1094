//! Topic value object

use serde::{Deserialize, Serialize};

/// The subject a party discusses (Value Object)
///
/// Set once at session creation. The moderator opens and summarizes around
/// it, and every contribution prompt quotes it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    content: String,
}

impl Topic {
    /// Try to create a topic, rejecting empty or whitespace-only content
    pub fn try_new(content: impl Into<String>) -> Option<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            None
        } else {
            Some(Self { content })
        }
    }

    /// Create a topic from content known to be non-empty
    ///
    /// # Panics
    /// Panics if the content is empty or only whitespace
    pub fn new(content: impl Into<String>) -> Self {
        match Self::try_new(content) {
            Some(topic) => topic,
            None => panic!("Topic cannot be empty"),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl From<&str> for Topic {
    fn from(s: &str) -> Self {
        Topic::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_new_rejects_blank_content() {
        assert!(Topic::try_new("").is_none());
        assert!(Topic::try_new("  \t ").is_none());
        assert!(Topic::try_new("Anything at all").is_some());
    }

    #[test]
    #[should_panic]
    fn test_empty_topic_panics() {
        Topic::new("");
    }

    #[test]
    fn test_content_and_display_agree() {
        let t: Topic = "Monolith or microservices?".into();
        assert_eq!(t.content(), "Monolith or microservices?");
        assert_eq!(t.to_string(), t.content());
    }
}
