//! Mention parsing and handoff resolution.
//!
//! Scans free text for `@identifier` tokens and classifies each against a
//! registry lookup. Pure domain logic — no I/O, no session access, just text
//! scanning. There is no escaping mechanism: a literal `@word` in any
//! context is always treated as a mention attempt.
//!
//! Mention syntax: `@` followed by one letter, then letters, digits or
//! hyphens. Matching is case-insensitive; emitted ids are lower-cased.

use crate::core::ids::AgentId;

/// Result of scanning a text for `@mentions`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionScan {
    /// Known ids, first-seen order, de-duplicated, lower-cased
    pub valid: Vec<AgentId>,
    /// Tokens that looked like mentions but matched no known id
    pub invalid: Vec<String>,
}

impl MentionScan {
    /// True when the text contained any mention attempt, valid or not
    pub fn has_mentions(&self) -> bool {
        !self.valid.is_empty() || !self.invalid.is_empty()
    }

    /// The first valid mention, if any
    pub fn primary(&self) -> Option<&AgentId> {
        self.valid.first()
    }
}

/// Scan `text` for mention tokens, classifying each via `is_known`.
///
/// `is_known` receives the lower-cased identifier.
pub fn parse_mentions(text: &str, is_known: impl Fn(&str) -> bool) -> MentionScan {
    let mut scan = MentionScan::default();
    let mut chars = text.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if c != '@' {
            continue;
        }
        // A mention must start with a letter
        let Some(&(start, first)) = chars.peek() else {
            break;
        };
        if !first.is_ascii_alphabetic() {
            continue;
        }

        let mut end = start;
        while let Some(&(i, c)) = chars.peek() {
            if c.is_ascii_alphanumeric() || c == '-' {
                end = i + c.len_utf8();
                chars.next();
            } else {
                break;
            }
        }

        let token = text[start..end].to_lowercase();
        if is_known(&token) {
            let id = AgentId::new(token);
            if !scan.valid.contains(&id) {
                scan.valid.push(id);
            }
        } else if !scan.invalid.contains(&token) {
            scan.invalid.push(token);
        }
    }

    scan
}

/// The first mentioned id that is also a current participant, if any.
pub fn find_handoff(text: &str, current: &[AgentId]) -> Option<AgentId> {
    parse_mentions(text, |id| current.iter().any(|c| c.as_str() == id))
        .valid
        .into_iter()
        .next()
}

/// Resolve an explicit handoff, degrading silently to `fallback` when the
/// text mentions nobody currently at the table. Never fails.
pub fn handoff_target(text: &str, current: &[AgentId], fallback: AgentId) -> AgentId {
    find_handoff(text, current).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known<'a>(ids: &'a [&'a str]) -> impl Fn(&str) -> bool + 'a {
        move |id| ids.contains(&id)
    }

    // ==================== parse_mentions Tests ====================

    #[test]
    fn test_parse_single_mention() {
        let scan = parse_mentions("I agree with @alice here", known(&["alice", "bob"]));
        assert_eq!(scan.valid, vec![AgentId::new("alice")]);
        assert!(scan.invalid.is_empty());
        assert!(scan.has_mentions());
        assert_eq!(scan.primary(), Some(&AgentId::new("alice")));
    }

    #[test]
    fn test_parse_is_case_insensitive_and_dedups() {
        let scan = parse_mentions("@Bob @BOB @bob", known(&["bob"]));
        assert_eq!(scan.valid, vec![AgentId::new("bob")]);
    }

    #[test]
    fn test_unknown_mentions_are_invalid() {
        let scan = parse_mentions("@ghost, any thoughts? cc @alice", known(&["alice"]));
        assert_eq!(scan.invalid, vec!["ghost".to_string()]);
        assert_eq!(scan.valid, vec![AgentId::new("alice")]);
    }

    #[test]
    fn test_first_seen_order_is_preserved() {
        let scan = parse_mentions("@bob then @alice then @bob", known(&["alice", "bob"]));
        assert_eq!(scan.valid, vec![AgentId::new("bob"), AgentId::new("alice")]);
    }

    #[test]
    fn test_mention_must_start_with_letter() {
        let scan = parse_mentions("ping me @ 5pm, or @1up", known(&["1up"]));
        assert!(!scan.has_mentions());
    }

    #[test]
    fn test_hyphens_and_digits_allowed_after_first_letter() {
        let scan = parse_mentions("ask @dev-rel-2 about it", known(&["dev-rel-2"]));
        assert_eq!(scan.valid, vec![AgentId::new("dev-rel-2")]);
    }

    #[test]
    fn test_punctuation_terminates_token() {
        let scan = parse_mentions("@alice, @bob!", known(&["alice", "bob"]));
        assert_eq!(scan.valid, vec![AgentId::new("alice"), AgentId::new("bob")]);
    }

    #[test]
    fn test_no_mentions() {
        let scan = parse_mentions("nothing to see here", known(&["alice"]));
        assert!(!scan.has_mentions());
        assert_eq!(scan.primary(), None);
    }

    #[test]
    fn test_trailing_at_sign() {
        let scan = parse_mentions("mail me @", known(&["alice"]));
        assert!(!scan.has_mentions());
    }

    // ==================== Handoff Tests ====================

    #[test]
    fn test_handoff_picks_first_current_participant() {
        let current = vec![AgentId::new("alice"), AgentId::new("bob")];
        let target = handoff_target("@ghost first, then @bob", &current, AgentId::new("alice"));
        assert_eq!(target, AgentId::new("bob"));
    }

    #[test]
    fn test_handoff_degrades_to_fallback() {
        let current = vec![AgentId::new("alice"), AgentId::new("bob")];
        let target = handoff_target("no mentions at all", &current, AgentId::new("alice"));
        assert_eq!(target, AgentId::new("alice"));

        let target = handoff_target("@stranger?", &current, AgentId::new("bob"));
        assert_eq!(target, AgentId::new("bob"));
    }
}
