//! Turn-ordering strategies
//!
//! Three interchangeable algorithms decide which non-moderator participant
//! speaks next. They are pure functions dispatched on
//! [`TurnOrdering`](crate::session::TurnOrdering) — the moderator's own
//! placement in the conversation is decided by [`crate::moderator`], never
//! here.

use crate::core::ids::AgentId;
use crate::mention;
use crate::session::{Session, TurnOrdering};
use rand::Rng;

/// Upper bound of the random jitter added to dynamic relevance scores
pub const MAX_JITTER: i64 = 5;

/// Score weight for each round a participant has stayed quiet
const QUIET_WEIGHT: i64 = 10;

/// Score bonus when the last message names the participant
const NAME_DROP_BONUS: i64 = 50;

/// Injectable randomness for dynamic-ordering tie breaking.
///
/// The jitter exists purely to break exact ties unpredictably rather than by
/// list order. Tests pin it with [`NoJitter`].
pub trait TieBreaker: Send + Sync {
    /// A uniform value in `0..=MAX_JITTER`
    fn jitter(&self) -> i64;
}

/// Deterministic tie breaker: scores are exactly the fairness/relevance sum
pub struct NoJitter;

impl TieBreaker for NoJitter {
    fn jitter(&self) -> i64 {
        0
    }
}

/// Production tie breaker backed by the thread-local RNG
pub struct RandomJitter;

impl TieBreaker for RandomJitter {
    fn jitter(&self) -> i64 {
        rand::thread_rng().gen_range(0..=MAX_JITTER)
    }
}

/// A candidate speaker with its dynamic relevance score
#[derive(Debug, Clone)]
pub struct ScoredSpeaker {
    pub agent_id: AgentId,
    pub score: i64,
}

/// Decide the single next speaker for the session's configured strategy.
///
/// Returns `None` only when the session has no non-moderator participants,
/// which session construction prevents.
pub fn next_speaker(
    session: &Session,
    last_message: Option<&str>,
    tie: &dyn TieBreaker,
) -> Option<AgentId> {
    match session.config().turn_ordering {
        TurnOrdering::RoundRobin => round_robin_next(session),
        TurnOrdering::Dynamic => dynamic_next(session, last_message, tie),
        TurnOrdering::ModeratorDirected => moderator_directed_next(session, tie),
    }
}

/// Decide the speaker order for a whole round.
///
/// For moderator-directed sessions this returns the candidates without
/// imposing an order: the moderator's direction is discovered only after
/// each turn completes, so the driver picks one speaker at a time via
/// [`next_speaker`].
pub fn speakers_for_round(
    session: &Session,
    last_message: Option<&str>,
    tie: &dyn TieBreaker,
) -> Vec<AgentId> {
    match session.config().turn_ordering {
        TurnOrdering::RoundRobin | TurnOrdering::ModeratorDirected => stored_order(session),
        TurnOrdering::Dynamic => {
            let mut order: Vec<AgentId> = Vec::new();
            if let Some(text) = last_message {
                if let Some(target) = mention::find_handoff(text, &non_moderator_ids(session)) {
                    order.push(target);
                }
            }
            for candidate in scored_candidates(session, last_message, tie) {
                if !order.contains(&candidate.agent_id) {
                    order.push(candidate.agent_id);
                }
            }
            order
        }
    }
}

/// Every non-moderator participant scored by fairness, relevance and jitter,
/// sorted descending. The sort is stable, so with jitter pinned to zero equal
/// scores keep stored order.
pub fn scored_candidates(
    session: &Session,
    last_message: Option<&str>,
    tie: &dyn TieBreaker,
) -> Vec<ScoredSpeaker> {
    let max_turns = session.max_turn_count();
    let text_lower = last_message.map(|t| t.to_lowercase());

    let mut scored: Vec<ScoredSpeaker> = session
        .non_moderators()
        .into_iter()
        .map(|p| {
            let quiet = i64::from(max_turns - p.turn_count) * QUIET_WEIGHT;
            let name_drop = text_lower
                .as_deref()
                .map(|t| t.contains(&p.display_name.to_lowercase()))
                .unwrap_or(false);
            let score = quiet + if name_drop { NAME_DROP_BONUS } else { 0 } + tie.jitter();
            ScoredSpeaker {
                agent_id: p.agent_id.clone(),
                score,
            }
        })
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

fn stored_order(session: &Session) -> Vec<AgentId> {
    session
        .non_moderators()
        .into_iter()
        .map(|p| p.agent_id.clone())
        .collect()
}

fn non_moderator_ids(session: &Session) -> Vec<AgentId> {
    stored_order(session)
}

fn round_robin_next(session: &Session) -> Option<AgentId> {
    let candidates = session.non_moderators();
    if candidates.is_empty() {
        return None;
    }
    let index = session.current_speaker_index() % candidates.len();
    Some(candidates[index].agent_id.clone())
}

fn dynamic_next(
    session: &Session,
    last_message: Option<&str>,
    tie: &dyn TieBreaker,
) -> Option<AgentId> {
    // Mentions always win over the fairness bias
    if let Some(text) = last_message {
        if let Some(target) = mention::find_handoff(text, &non_moderator_ids(session)) {
            return Some(target);
        }
    }
    scored_candidates(session, last_message, tie)
        .into_iter()
        .next()
        .map(|s| s.agent_id)
}

fn moderator_directed_next(session: &Session, _tie: &dyn TieBreaker) -> Option<AgentId> {
    // A direction is consumed by the turn immediately after it: only the
    // moderator's message counts, and only while it is still the latest.
    let direction = session
        .moderator()
        .and_then(|m| {
            session
                .last_message()
                .filter(|msg| msg.agent_id.as_ref() == Some(&m.agent_id))
        })
        .and_then(|msg| mention::find_handoff(&msg.content, &non_moderator_ids(session)));

    match direction {
        Some(target) => Some(target),
        None => round_robin_next(session),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ids::SessionId;
    use crate::core::topic::Topic;
    use crate::participant::PersonaProfile;
    use crate::session::{MessageDraft, SessionConfig};

    fn profiles() -> Vec<PersonaProfile> {
        vec![
            PersonaProfile::new("alice", "Alice", "🦊", "engineering"),
            PersonaProfile::new("bob", "Bob", "🐻", "design"),
            PersonaProfile::new("carol", "Carol", "🐱", "product"),
        ]
    }

    fn session(config: SessionConfig) -> Session {
        Session::new(
            SessionId::new("s1"),
            "u1",
            Topic::new("testing"),
            &profiles(),
            config,
        )
        .unwrap()
    }

    // ==================== Round-Robin Tests ====================

    #[test]
    fn test_round_robin_is_deterministic() {
        let s = session(SessionConfig::default());
        let first = speakers_for_round(&s, None, &NoJitter);
        let second = speakers_for_round(&s, None, &NoJitter);
        assert_eq!(first, second);
        assert_eq!(
            first,
            vec![
                AgentId::new("alice"),
                AgentId::new("bob"),
                AgentId::new("carol")
            ]
        );
    }

    #[test]
    fn test_round_robin_next_wraps_on_index() {
        let mut s = session(SessionConfig::default());
        s.advance_turn(0, 4);
        assert_eq!(next_speaker(&s, None, &NoJitter), Some(AgentId::new("bob")));
    }

    #[test]
    fn test_round_robin_ignores_message_content() {
        let s = session(SessionConfig::default());
        let order = speakers_for_round(&s, Some("@carol please go first"), &NoJitter);
        assert_eq!(order[0], AgentId::new("alice"));
    }

    // ==================== Dynamic Tests ====================

    fn dynamic_session() -> Session {
        session(SessionConfig::default().with_turn_ordering(TurnOrdering::Dynamic))
    }

    #[test]
    fn test_dynamic_mention_wins_over_bias() {
        let mut s = dynamic_session();
        // Alice has spoken the most, so fairness alone would never pick her
        s.participant_mut_for_test(&AgentId::new("alice")).turn_count = 10;
        let next = next_speaker(&s, Some("@alice what do you think?"), &NoJitter);
        assert_eq!(next, Some(AgentId::new("alice")));
    }

    #[test]
    fn test_dynamic_fairness_picks_quietest() {
        let mut s = dynamic_session();
        s.participant_mut_for_test(&AgentId::new("alice")).turn_count = 10;
        s.participant_mut_for_test(&AgentId::new("carol")).turn_count = 10;
        // No mention, no name drop: the quiet participant must win
        let next = next_speaker(&s, Some("let us dig deeper into this"), &NoJitter);
        assert_eq!(next, Some(AgentId::new("bob")));
    }

    #[test]
    fn test_dynamic_name_drop_bonus() {
        let s = dynamic_session();
        // Equal turn counts; naming Carol (display name, not id) boosts her
        let next = next_speaker(&s, Some("I wonder what Carol would say"), &NoJitter);
        assert_eq!(next, Some(AgentId::new("carol")));
    }

    #[test]
    fn test_dynamic_round_is_sorted_by_score() {
        let mut s = dynamic_session();
        s.participant_mut_for_test(&AgentId::new("alice")).turn_count = 2;
        s.participant_mut_for_test(&AgentId::new("bob")).turn_count = 1;
        let order = speakers_for_round(&s, None, &NoJitter);
        assert_eq!(
            order,
            vec![
                AgentId::new("carol"),
                AgentId::new("bob"),
                AgentId::new("alice")
            ]
        );
    }

    #[test]
    fn test_dynamic_round_mention_leads() {
        let s = dynamic_session();
        let order = speakers_for_round(&s, Some("@bob, kick us off"), &NoJitter);
        assert_eq!(order[0], AgentId::new("bob"));
        assert_eq!(order.len(), 3);
    }

    #[test]
    fn test_dynamic_jitter_stays_in_range() {
        for _ in 0..100 {
            let j = RandomJitter.jitter();
            assert!((0..=MAX_JITTER).contains(&j));
        }
    }

    // ==================== Moderator-Directed Tests ====================

    fn directed_session() -> Session {
        session(
            SessionConfig::default()
                .with_turn_ordering(TurnOrdering::ModeratorDirected)
                .with_moderator("carol"),
        )
    }

    #[test]
    fn test_directed_follows_moderator_mention() {
        let mut s = directed_session();
        s.add_message(
            MessageDraft::assistant("carol", "@bob, your take on this?", 1).as_moderator_intro(),
        )
        .unwrap();
        assert_eq!(next_speaker(&s, None, &NoJitter), Some(AgentId::new("bob")));
    }

    #[test]
    fn test_directed_falls_back_to_round_robin() {
        let s = directed_session();
        // Moderator has not spoken yet
        assert_eq!(
            next_speaker(&s, None, &NoJitter),
            Some(AgentId::new("alice"))
        );
    }

    #[test]
    fn test_directed_ignores_mention_of_moderator() {
        let mut s = directed_session();
        // A self-mention is not a direction to a non-moderator
        s.add_message(MessageDraft::assistant("carol", "as @carol I will decide", 1))
            .unwrap();
        assert_eq!(
            next_speaker(&s, None, &NoJitter),
            Some(AgentId::new("alice"))
        );
    }

    #[test]
    fn test_directed_round_returns_candidates_in_stored_order() {
        let s = directed_session();
        let order = speakers_for_round(&s, None, &NoJitter);
        assert_eq!(order, vec![AgentId::new("alice"), AgentId::new("bob")]);
    }
}
