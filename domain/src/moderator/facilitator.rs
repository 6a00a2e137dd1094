//! Moderator facilitation checks.
//!
//! Pure functions of the [`Session`] deciding *whether* the moderator should
//! speak. What to ask it is built by
//! [`PartyPromptTemplate`](crate::prompt::PartyPromptTemplate); the actual
//! generation is always delegated to the completion provider.

use crate::session::{Role, Session};

/// True iff the config names a moderator and a participant carries the flag
pub fn has_moderator(session: &Session) -> bool {
    session.config().moderator_id.is_some() && session.moderator().is_some()
}

/// True iff the moderator has never spoken in this session's lifetime.
///
/// Checked against the whole history, not just the current round, so an
/// intro happens at most once per session.
pub fn should_intro(session: &Session) -> bool {
    if !has_moderator(session) {
        return false;
    }
    let Some(moderator) = session.moderator() else {
        return false;
    };
    !session
        .history()
        .iter()
        .any(|m| m.role == Role::Assistant && m.agent_id.as_ref() == Some(&moderator.agent_id))
}

/// True iff every non-moderator participant has spoken in the current round
/// and no summary has been appended for it yet.
pub fn should_summarize(session: &Session) -> bool {
    if !has_moderator(session) {
        return false;
    }
    let round = session.current_turn();
    if round == 0 {
        return false;
    }

    let non_moderators = session.non_moderators();
    if non_moderators.is_empty() {
        return false;
    }
    let all_spoke = non_moderators
        .iter()
        .all(|p| session.has_spoken_in_turn(&p.agent_id, round));
    if !all_spoke {
        return false;
    }

    !session
        .messages_in_turn(round)
        .any(|m| m.metadata.is_moderator_summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ids::SessionId;
    use crate::core::topic::Topic;
    use crate::participant::PersonaProfile;
    use crate::session::{MessageDraft, SessionConfig};

    fn session(moderator: Option<&str>) -> Session {
        let profiles = vec![
            PersonaProfile::new("alice", "Alice", "🦊", "engineering"),
            PersonaProfile::new("bob", "Bob", "🐻", "design"),
            PersonaProfile::new("maven", "Maven", "🦉", "facilitation"),
        ];
        let mut config = SessionConfig::default();
        if let Some(id) = moderator {
            config = config.with_moderator(id);
        }
        Session::new(SessionId::new("s1"), "u1", Topic::new("t"), &profiles, config).unwrap()
    }

    #[test]
    fn test_has_moderator() {
        assert!(has_moderator(&session(Some("maven"))));
        assert!(!has_moderator(&session(None)));
        // Config names someone who never joined
        assert!(!has_moderator(&session(Some("ghost"))));
    }

    #[test]
    fn test_should_intro_only_before_first_moderator_message() {
        let mut s = session(Some("maven"));
        assert!(should_intro(&s));

        s.add_message(MessageDraft::assistant("maven", "Welcome!", 1).as_moderator_intro())
            .unwrap();
        assert!(!should_intro(&s));
    }

    #[test]
    fn test_should_intro_false_without_moderator() {
        assert!(!should_intro(&session(None)));
    }

    #[test]
    fn test_should_summarize_fires_exactly_once_per_round() {
        let mut s = session(Some("maven"));
        s.add_message(MessageDraft::assistant("alice", "point one", 1)).unwrap();
        // Bob has not spoken yet
        s.advance_turn(1, 0);
        assert!(!should_summarize(&s));

        s.add_message(MessageDraft::assistant("bob", "point two", 1)).unwrap();
        assert!(should_summarize(&s));

        s.add_message(
            MessageDraft::assistant("maven", "In summary...", 1).as_moderator_summary(),
        )
        .unwrap();
        assert!(!should_summarize(&s));
    }

    #[test]
    fn test_should_summarize_false_before_any_round() {
        let s = session(Some("maven"));
        assert!(!should_summarize(&s));
    }
}
