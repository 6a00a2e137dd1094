//! End-to-end party flows through the real adapters
//!
//! Drives [`PartyService`] with the in-memory store, the in-memory catalog
//! and the scripted gateway, covering session start, handoffs, moderator
//! facilitation, lifecycle transitions and failure absorption.

use chrono::Duration;
use roundtable_application::{ContinueTarget, ContributionKind, PartyService};
use roundtable_domain::{
    AgentId, DomainError, NoJitter, PersonaProfile, Role, SessionConfig, TurnOrdering,
};
use roundtable_infrastructure::{MemoryPersonaCatalog, MemorySessionStore, ScriptedGateway};
use std::sync::Arc;

struct Harness {
    service: PartyService<ScriptedGateway, MemoryPersonaCatalog, MemorySessionStore>,
    gateway: Arc<ScriptedGateway>,
    store: Arc<MemorySessionStore>,
}

async fn harness() -> Harness {
    let gateway = Arc::new(ScriptedGateway::new());
    let store = Arc::new(MemorySessionStore::new());
    let catalog = Arc::new(MemoryPersonaCatalog::new());

    catalog
        .register(
            PersonaProfile::new("alice", "Alice", "🦊", "engineering")
                .with_capabilities(vec!["architecture".to_string()]),
            Some("You are Alice, a pragmatic systems engineer.".to_string()),
        )
        .await;
    catalog
        .register(
            PersonaProfile::new("bob", "Bob", "🐻", "design"),
            Some("You are Bob, a product designer.".to_string()),
        )
        .await;
    catalog
        .register(PersonaProfile::new("carol", "Carol", "🐱", "product"), None)
        .await;
    catalog
        .register(
            PersonaProfile::new("maven", "Maven", "🦉", "facilitation"),
            Some("You are Maven, the discussion moderator.".to_string()),
        )
        .await;

    let service = PartyService::new(gateway.clone(), catalog, store.clone())
        .with_tie_breaker(Arc::new(NoJitter));
    Harness {
        service,
        gateway,
        store,
    }
}

fn ids(list: &[&str]) -> Vec<AgentId> {
    list.iter().map(|s| AgentId::new(*s)).collect()
}

// ==================== Start Tests ====================

#[tokio::test]
async fn test_start_round_robin_every_participant_speaks_once() {
    let h = harness().await;
    h.gateway.push_reply("I would start with the cache layer.").await;
    h.gateway.push_reply("Agreed, and the UI needs it too.").await;

    let outcome = h
        .service
        .start_session("u1", &ids(&["alice", "bob"]), "caching strategy", None, None)
        .await
        .unwrap();

    assert_eq!(outcome.participants.len(), 2);
    assert!(outcome.skipped.is_empty());
    assert_eq!(outcome.total_turns, 1);
    assert_eq!(outcome.responses.len(), 2);
    assert_eq!(outcome.responses[0].agent_id, AgentId::new("alice"));
    assert_eq!(outcome.responses[1].agent_id, AgentId::new("bob"));
    assert!(outcome
        .responses
        .iter()
        .all(|r| r.kind == ContributionKind::Contribution && r.turn_number == 1));

    let session = h.service.get_session(&outcome.session_id, "u1").await.unwrap();
    assert_eq!(session.history().len(), 2);
    assert!(session.history().iter().all(|m| m.role == Role::Assistant));
}

#[tokio::test]
async fn test_caller_context_reaches_the_gateway() {
    let h = harness().await;
    // No scripted replies: the gateway falls back to echoing the per-turn
    // instruction, so the caller's context must show up in the transcript.
    let outcome = h
        .service
        .start_session(
            "u1",
            &ids(&["alice", "bob"]),
            "caching strategy",
            None,
            Some("the cluster is memory-bound"),
        )
        .await
        .unwrap();

    assert_eq!(outcome.responses.len(), 2);
    assert!(outcome
        .responses
        .iter()
        .all(|r| r.content.contains("the cluster is memory-bound")));
}

#[tokio::test]
async fn test_start_with_moderator_brackets_the_round() {
    let h = harness().await;
    h.gateway.push_reply("Welcome! Today we discuss onboarding.").await;
    h.gateway.push_reply("The signup form asks too much.").await;
    h.gateway.push_reply("We could defer most fields.").await;
    h.gateway.push_reply("In short: trim the form, defer the rest.").await;

    let config = SessionConfig::default().with_moderator("maven");
    let outcome = h
        .service
        .start_session(
            "u1",
            &ids(&["maven", "alice", "bob"]),
            "onboarding flow",
            Some(config),
            None,
        )
        .await
        .unwrap();

    let kinds: Vec<ContributionKind> = outcome.responses.iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ContributionKind::ModeratorIntro,
            ContributionKind::Contribution,
            ContributionKind::Contribution,
            ContributionKind::ModeratorSummary,
        ]
    );
    assert_eq!(outcome.responses[0].agent_id, AgentId::new("maven"));
    assert_eq!(outcome.responses[3].agent_id, AgentId::new("maven"));

    let session = h.service.get_session(&outcome.session_id, "u1").await.unwrap();
    assert_eq!(session.history().len(), 4);
    assert!(session.history().iter().all(|m| m.turn_number == 1));
}

#[tokio::test]
async fn test_unresolvable_and_duplicate_ids_are_skipped() {
    let h = harness().await;
    let outcome = h
        .service
        .start_session(
            "u1",
            &ids(&["alice", "alice", "ghost", "bob"]),
            "skipping",
            None,
            None,
        )
        .await
        .unwrap();

    assert_eq!(outcome.participants.len(), 2);
    assert_eq!(outcome.skipped, ids(&["alice", "ghost"]));
}

#[tokio::test]
async fn test_category_filter_excludes_personas() {
    let h = harness().await;
    let config = SessionConfig::default()
        .with_category_filter(vec!["engineering".to_string(), "design".to_string()]);
    let outcome = h
        .service
        .start_session(
            "u1",
            &ids(&["alice", "bob", "carol"]),
            "filtered party",
            Some(config),
            None,
        )
        .await
        .unwrap();

    assert_eq!(outcome.participants.len(), 2);
    assert_eq!(outcome.skipped, ids(&["carol"]));
}

#[tokio::test]
async fn test_too_few_resolvable_participants_fails() {
    let h = harness().await;
    let err = h
        .service
        .start_session("u1", &ids(&["alice", "ghost"]), "lonely", None, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::NotEnoughParticipants {
            required: 2,
            actual: 1
        }
    ));
}

#[tokio::test]
async fn test_empty_topic_is_rejected() {
    let h = harness().await;
    let err = h
        .service
        .start_session("u1", &ids(&["alice", "bob"]), "   ", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::EmptyTopic));
}

// ==================== Continue Tests ====================

#[tokio::test]
async fn test_user_mention_hands_the_round_to_one_speaker() {
    let h = harness().await;
    let started = h
        .service
        .start_session(
            "u1",
            &ids(&["alice", "bob", "carol"]),
            "release plan",
            None,
            None,
        )
        .await
        .unwrap();

    h.gateway.push_reply("Happy to take that one.").await;
    let outcome = h
        .service
        .continue_session(
            "u1",
            ContinueTarget::Existing(started.session_id.clone()),
            Some("@bob, thoughts?"),
            None,
        )
        .await
        .unwrap();

    assert_eq!(outcome.responses.len(), 1);
    assert_eq!(outcome.responses[0].agent_id, AgentId::new("bob"));
    assert_eq!(outcome.total_turns, 2);

    // The user's message is part of the record, with the mention resolved
    let user_msg = outcome
        .history
        .iter()
        .find(|m| m.role == Role::User)
        .unwrap();
    assert_eq!(user_msg.metadata.mentions, ids(&["bob"]));
}

#[tokio::test]
async fn test_dynamic_ordering_boosts_named_participant() {
    let h = harness().await;
    let config = SessionConfig::default().with_turn_ordering(TurnOrdering::Dynamic);
    let started = h
        .service
        .start_session(
            "u1",
            &ids(&["alice", "bob"]),
            "retro format",
            Some(config),
            None,
        )
        .await
        .unwrap();

    // A name drop (not an @mention) reorders the round, it does not shrink it
    let outcome = h
        .service
        .continue_session(
            "u1",
            ContinueTarget::Existing(started.session_id),
            Some("I want to hear what Bob thinks first"),
            None,
        )
        .await
        .unwrap();

    assert_eq!(outcome.responses.len(), 2);
    assert_eq!(outcome.responses[0].agent_id, AgentId::new("bob"));
    assert_eq!(outcome.responses[1].agent_id, AgentId::new("alice"));
}

#[tokio::test]
async fn test_continue_into_new_session() {
    let h = harness().await;
    let outcome = h
        .service
        .continue_session(
            "u1",
            ContinueTarget::New {
                agent_ids: ids(&["alice", "bob"]),
                topic: "ad-hoc party".to_string(),
            },
            None,
            None,
        )
        .await
        .unwrap();

    assert_eq!(outcome.total_turns, 1);
    assert_eq!(outcome.responses.len(), 2);
    assert_eq!(h.service.list_sessions("u1").await.len(), 1);
}

// ==================== Moderator-Directed Tests ====================

#[tokio::test]
async fn test_directed_round_follows_moderator_mentions() {
    let h = harness().await;
    h.gateway.push_reply("Let's begin. @bob, set the scene.").await;
    h.gateway.push_reply("Here is where we stand.").await;
    h.gateway.push_reply("And the engineering angle.").await;
    h.gateway.push_reply("Good round, both perspectives covered.").await;
    h.gateway.push_reply("Over to you next, @alice.").await;

    let config = SessionConfig::default()
        .with_turn_ordering(TurnOrdering::ModeratorDirected)
        .with_moderator("maven");
    let outcome = h
        .service
        .start_session(
            "u1",
            &ids(&["maven", "alice", "bob"]),
            "quarterly review",
            Some(config),
            None,
        )
        .await
        .unwrap();

    let kinds: Vec<ContributionKind> = outcome.responses.iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ContributionKind::ModeratorIntro,
            ContributionKind::Contribution,
            ContributionKind::Contribution,
            ContributionKind::ModeratorSummary,
            ContributionKind::ModeratorDirection,
        ]
    );
    // The intro's @bob mention directed the first turn to Bob
    assert_eq!(outcome.responses[1].agent_id, AgentId::new("bob"));
    assert_eq!(outcome.responses[2].agent_id, AgentId::new("alice"));
}

// ==================== Failure Tests ====================

#[tokio::test]
async fn test_provider_failure_is_absorbed_and_round_continues() {
    let h = harness().await;
    h.gateway.push_failure("upstream timed out").await;
    h.gateway.push_reply("Carrying on regardless.").await;

    let outcome = h
        .service
        .start_session("u1", &ids(&["alice", "bob"]), "resilience", None, None)
        .await
        .unwrap();

    assert_eq!(outcome.responses.len(), 2);
    assert!(!outcome.responses[0].success);
    assert!(outcome.responses[0].content.contains("upstream timed out"));
    assert!(outcome.responses[1].success);

    // The failure text is absorbed into the transcript as Alice's message
    let session = h.service.get_session(&outcome.session_id, "u1").await.unwrap();
    assert_eq!(session.history().len(), 2);
    assert!(session.history()[0].content.contains("upstream timed out"));
}

// ==================== Lifecycle Tests ====================

#[tokio::test]
async fn test_pause_blocks_rounds_until_resumed() {
    let h = harness().await;
    let started = h
        .service
        .start_session("u1", &ids(&["alice", "bob"]), "lifecycle", None, None)
        .await
        .unwrap();
    let id = started.session_id;

    h.service.pause_session(&id, "u1").await.unwrap();
    let err = h
        .service
        .continue_session("u1", ContinueTarget::Existing(id.clone()), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::SessionNotActive(_)));

    h.service.resume_session(&id, "u1").await.unwrap();
    let outcome = h
        .service
        .continue_session("u1", ContinueTarget::Existing(id), None, None)
        .await
        .unwrap();
    assert_eq!(outcome.total_turns, 2);
}

#[tokio::test]
async fn test_resume_requires_paused_state() {
    let h = harness().await;
    let started = h
        .service
        .start_session("u1", &ids(&["alice", "bob"]), "lifecycle", None, None)
        .await
        .unwrap();

    let err = h
        .service
        .resume_session(&started.session_id, "u1")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidConfiguration(_)));
}

#[tokio::test]
async fn test_ownership_is_enforced() {
    let h = harness().await;
    let started = h
        .service
        .start_session("u1", &ids(&["alice", "bob"]), "private", None, None)
        .await
        .unwrap();
    let id = started.session_id;

    assert!(h.service.get_session(&id, "u2").await.unwrap_err().is_forbidden());
    assert!(h
        .service
        .delete_session(&id, "u2")
        .await
        .unwrap_err()
        .is_forbidden());

    // The rightful owner still has access
    assert!(h.service.get_session(&id, "u1").await.is_ok());
}

#[tokio::test]
async fn test_delete_removes_session() {
    let h = harness().await;
    let started = h
        .service
        .start_session("u1", &ids(&["alice", "bob"]), "ephemeral", None, None)
        .await
        .unwrap();
    let id = started.session_id;

    h.service.delete_session(&id, "u1").await.unwrap();
    assert!(h.service.get_session(&id, "u1").await.unwrap_err().is_not_found());
    assert!(h.service.list_sessions("u1").await.is_empty());
}

#[tokio::test]
async fn test_sweep_idle_reclaims_sessions() {
    let h = harness().await;
    h.service
        .start_session("u1", &ids(&["alice", "bob"]), "short-lived", None, None)
        .await
        .unwrap();

    assert_eq!(h.service.sweep_idle(Duration::hours(24)).await, 0);
    assert_eq!(h.service.sweep_idle(Duration::seconds(-1)).await, 1);
    assert_eq!(h.store.len().await, 0);
}

#[tokio::test]
async fn test_update_config_switches_strategy_between_rounds() {
    let h = harness().await;
    let started = h
        .service
        .start_session("u1", &ids(&["alice", "bob"]), "strategy swap", None, None)
        .await
        .unwrap();
    let id = started.session_id;

    let patch = roundtable_domain::ConfigPatch::set_turn_ordering(TurnOrdering::Dynamic);
    let session = h.service.update_config(&id, "u1", patch).await.unwrap();
    assert_eq!(session.config().turn_ordering, TurnOrdering::Dynamic);

    let outcome = h
        .service
        .continue_session("u1", ContinueTarget::Existing(id), None, None)
        .await
        .unwrap();
    assert_eq!(outcome.responses.len(), 2);
}
