//! Party orchestration driver
//!
//! The control loop behind "start" and "continue": consult the turn-ordering
//! strategy and the moderator facilitator, invoke the completion gateway once
//! per selected speaker, and commit every result to the session store.
//!
//! Contributions within a round are strictly sequential — each speaker's
//! prompt includes everything earlier speakers said in the same round, so
//! there is no parallel fan-out. Distinct sessions proceed concurrently; a
//! per-session lock keeps two drivers from computing the same round twice.

use crate::ports::{CompletionGateway, PersonaCatalog, SessionStore};
use crate::use_cases::outcomes::{
    ContinueOutcome, ContributionKind, RoundResponse, SessionSummary, StartOutcome,
};
use chrono::Duration;
use roundtable_domain::{
    mention, moderator, ordering, AgentId, DomainError, MessageDraft, Participant,
    PartyPromptTemplate, PersonaProfile, RandomJitter, Role, Session, SessionConfig, SessionId,
    SessionState, TieBreaker, Topic, TurnOrdering,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Which session a continue request addresses: an existing one by id, or a
/// fresh party created on the fly from agent ids and a topic.
#[derive(Debug, Clone)]
pub enum ContinueTarget {
    Existing(SessionId),
    New {
        agent_ids: Vec<AgentId>,
        topic: String,
    },
}

/// Orchestration service for party-mode discussions.
///
/// Holds the injected collaborators (completion gateway, persona catalog,
/// session store) plus one mutex per live session id.
pub struct PartyService<G, C, S>
where
    G: CompletionGateway,
    C: PersonaCatalog,
    S: SessionStore,
{
    gateway: Arc<G>,
    catalog: Arc<C>,
    store: Arc<S>,
    tie_breaker: Arc<dyn TieBreaker>,
    round_locks: Mutex<HashMap<SessionId, Arc<Mutex<()>>>>,
}

impl<G, C, S> PartyService<G, C, S>
where
    G: CompletionGateway,
    C: PersonaCatalog,
    S: SessionStore,
{
    pub fn new(gateway: Arc<G>, catalog: Arc<C>, store: Arc<S>) -> Self {
        Self {
            gateway,
            catalog,
            store,
            tie_breaker: Arc::new(RandomJitter),
            round_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the randomness source of the dynamic strategy. Tests pin it
    /// to [`NoJitter`](roundtable_domain::NoJitter).
    pub fn with_tie_breaker(mut self, tie_breaker: Arc<dyn TieBreaker>) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    // ==================== Session lifecycle ====================

    /// Create a session and play its first round.
    pub async fn start_session(
        &self,
        owner_id: &str,
        agent_ids: &[AgentId],
        topic: &str,
        config: Option<SessionConfig>,
        context: Option<&str>,
    ) -> Result<StartOutcome, DomainError> {
        let (session, skipped) = self
            .create_session(owner_id, agent_ids, topic, config)
            .await?;
        let session_id = session.id().clone();

        let lock = self.round_lock(&session_id).await;
        let _guard = lock.lock().await;

        let responses = self.run_round(&session_id, None, context).await?;
        let session = self.require(&session_id).await?;

        Ok(StartOutcome {
            session_id,
            participants: session.participants().to_vec(),
            skipped,
            responses,
            total_turns: session.current_turn(),
            config: session.config().clone(),
        })
    }

    /// Play one more round, optionally opened by a new user message.
    ///
    /// A valid `@mention` in the user message redirects the whole round to
    /// the mentioned participant; otherwise the configured strategy orders
    /// the full rotation.
    pub async fn continue_session(
        &self,
        requester: &str,
        target: ContinueTarget,
        user_message: Option<&str>,
        context: Option<&str>,
    ) -> Result<ContinueOutcome, DomainError> {
        let session_id = match target {
            ContinueTarget::Existing(id) => {
                self.owned(&id, requester).await?;
                id
            }
            ContinueTarget::New { agent_ids, topic } => {
                let (session, _skipped) = self
                    .create_session(requester, &agent_ids, &topic, None)
                    .await?;
                session.id().clone()
            }
        };

        let lock = self.round_lock(&session_id).await;
        let _guard = lock.lock().await;

        let responses = self.run_round(&session_id, user_message, context).await?;
        let session = self.require(&session_id).await?;

        Ok(ContinueOutcome {
            session_id,
            responses,
            history: session.history().to_vec(),
            total_turns: session.current_turn(),
        })
    }

    /// Snapshot of a session, with the mandatory ownership check.
    pub async fn get_session(
        &self,
        session_id: &SessionId,
        requester: &str,
    ) -> Result<Session, DomainError> {
        self.owned(session_id, requester).await
    }

    /// Merge a partial reconfiguration between rounds.
    pub async fn update_config(
        &self,
        session_id: &SessionId,
        requester: &str,
        patch: roundtable_domain::ConfigPatch,
    ) -> Result<Session, DomainError> {
        self.owned(session_id, requester).await?;
        let lock = self.round_lock(session_id).await;
        let _guard = lock.lock().await;
        self.store.update_config(session_id, patch).await
    }

    /// Suspend an active session.
    pub async fn pause_session(
        &self,
        session_id: &SessionId,
        requester: &str,
    ) -> Result<Session, DomainError> {
        let session = self.owned(session_id, requester).await?;
        if session.state() != SessionState::Active {
            return Err(DomainError::SessionNotActive(session_id.to_string()));
        }
        self.store.set_state(session_id, SessionState::Paused).await
    }

    /// Reactivate a paused session.
    pub async fn resume_session(
        &self,
        session_id: &SessionId,
        requester: &str,
    ) -> Result<Session, DomainError> {
        let session = self.owned(session_id, requester).await?;
        if session.state() != SessionState::Paused {
            return Err(DomainError::InvalidConfiguration(format!(
                "session {} is not paused",
                session_id
            )));
        }
        self.store.set_state(session_id, SessionState::Active).await
    }

    /// Terminate and remove a session.
    pub async fn delete_session(
        &self,
        session_id: &SessionId,
        requester: &str,
    ) -> Result<(), DomainError> {
        self.owned(session_id, requester).await?;
        // Completed is only ever reached by explicit termination.
        self.store
            .set_state(session_id, SessionState::Completed)
            .await?;
        self.store.remove(session_id).await;
        self.round_locks.lock().await.remove(session_id);
        info!("Deleted session {}", session_id);
        Ok(())
    }

    /// Compact summaries of every session the user owns.
    pub async fn list_sessions(&self, owner_id: &str) -> Vec<SessionSummary> {
        self.store
            .list_for_owner(owner_id)
            .await
            .iter()
            .map(SessionSummary::of)
            .collect()
    }

    /// Reclaim sessions idle for longer than `max_age`.
    pub async fn sweep_idle(&self, max_age: Duration) -> usize {
        let removed = self.store.sweep_idle(max_age).await;
        if removed > 0 {
            info!("Swept {} idle session(s)", removed);
            // Uncontended locks are recreated on demand; dropping them here
            // keeps the registry from growing with swept ids.
            self.round_locks
                .lock()
                .await
                .retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        removed
    }

    // ==================== Round driver ====================

    /// Play one round of the discussion and return its contributions.
    ///
    /// Caller must hold the session's round lock.
    async fn run_round(
        &self,
        session_id: &SessionId,
        user_message: Option<&str>,
        context: Option<&str>,
    ) -> Result<Vec<RoundResponse>, DomainError> {
        let mut session = self.require(session_id).await?;
        if session.state() != SessionState::Active {
            return Err(DomainError::SessionNotActive(session_id.to_string()));
        }

        let round = session.current_turn() + 1;
        let topic = session.topic().content().to_string();
        let mut responses = Vec::new();

        // The user's new message opens the round
        if let Some(text) = user_message {
            let mentions =
                mention::parse_mentions(text, |m| session.is_participant(&AgentId::new(m))).valid;
            let draft = MessageDraft::user(text, round).with_mentions(mentions);
            session = self.store.add_message(session_id, draft).await?;
        }

        // Moderator intro, once per session lifetime
        if moderator::should_intro(&session) {
            if let Some(m) = session.moderator().cloned() {
                let instruction =
                    PartyPromptTemplate::intro_prompt(&topic, &session.non_moderators());
                let (response, draft) = self
                    .moderator_turn(&session, &m, &instruction, ContributionKind::ModeratorIntro, round)
                    .await;
                session = self.store.add_message(session_id, draft).await?;
                responses.push(response);
            }
        }

        let rotation: Vec<AgentId> = session
            .non_moderators()
            .iter()
            .map(|p| p.agent_id.clone())
            .collect();
        if rotation.is_empty() {
            // Construction requires >= 2 participants; this is only reachable
            // when every participant was made the moderator's understudy by a
            // pathological reconfiguration. Nothing to orchestrate.
            warn!("Session {} has no speakers in rotation", session_id);
            return Ok(responses);
        }

        // Explicit user handoff redirects the whole round to one speaker
        let handoff = user_message.and_then(|t| mention::find_handoff(t, &rotation));
        let directed = handoff.is_none()
            && session.config().turn_ordering == TurnOrdering::ModeratorDirected;

        let spoken = match handoff {
            Some(target) => {
                info!("Round {} handed off to @{}", round, target);
                let planned = vec![target];
                let round_responses = self
                    .play_planned(
                        session_id,
                        &mut session,
                        &planned,
                        round,
                        context,
                        &HashMap::new(),
                    )
                    .await?;
                responses.extend(round_responses);
                1
            }
            None => match session.config().turn_ordering {
                TurnOrdering::ModeratorDirected => {
                    self.play_directed(
                        session_id,
                        &mut session,
                        &rotation,
                        round,
                        context,
                        &mut responses,
                    )
                    .await?
                }
                TurnOrdering::Dynamic => {
                    let (planned, scores) = self.plan_dynamic(&session, &rotation);
                    let round_responses = self
                        .play_planned(session_id, &mut session, &planned, round, context, &scores)
                        .await?;
                    let count = round_responses.len();
                    responses.extend(round_responses);
                    count
                }
                TurnOrdering::RoundRobin => {
                    let planned = ordering::speakers_for_round(&session, None, &*self.tie_breaker);
                    let round_responses = self
                        .play_planned(
                            session_id,
                            &mut session,
                            &planned,
                            round,
                            context,
                            &HashMap::new(),
                        )
                        .await?;
                    let count = round_responses.len();
                    responses.extend(round_responses);
                    count
                }
            },
        };

        // Commit the completed round before the summary check, so the
        // facilitator sees it as the current turn. Directed rounds already
        // moved the rotation index after each pick.
        let rotation_index = if directed {
            session.current_speaker_index() % rotation.len()
        } else {
            (session.current_speaker_index() + spoken) % rotation.len()
        };
        session = self
            .store
            .advance_turn(session_id, round, rotation_index)
            .await?;

        // Moderator summary, once per round
        if moderator::should_summarize(&session) {
            if let Some(m) = session.moderator().cloned() {
                let contributions = round_contributions(&session, round);
                let instruction = PartyPromptTemplate::summary_prompt(&topic, &contributions);
                let (response, draft) = self
                    .moderator_turn(
                        &session,
                        &m,
                        &instruction,
                        ContributionKind::ModeratorSummary,
                        round,
                    )
                    .await;
                session = self.store.add_message(session_id, draft).await?;
                responses.push(response);

                // In directed mode the moderator closes each round by handing
                // the floor onward; the mention in its reply (if any) steers
                // the next round's first pick.
                if session.config().turn_ordering == TurnOrdering::ModeratorDirected {
                    if let Some(response) = self
                        .direct_next_speaker(session_id, &mut session, &m, round)
                        .await?
                    {
                        responses.push(response);
                    }
                }
            }
        }

        debug!(
            "Round {} of session {} produced {} contribution(s)",
            round,
            session_id,
            responses.len()
        );
        Ok(responses)
    }

    /// Speak every planned participant in order.
    async fn play_planned(
        &self,
        session_id: &SessionId,
        session: &mut Session,
        planned: &[AgentId],
        round: u32,
        context: Option<&str>,
        scores: &HashMap<AgentId, i64>,
    ) -> Result<Vec<RoundResponse>, DomainError> {
        let mut responses = Vec::with_capacity(planned.len());
        for speaker in planned {
            let (response, draft) = self
                .speaker_turn(session, speaker, round, context, scores.get(speaker).copied())
                .await;
            *session = self.store.add_message(session_id, draft).await?;
            responses.push(response);
        }
        Ok(responses)
    }

    /// Moderator-directed rounds discover each speaker only after the
    /// previous turn completes.
    async fn play_directed(
        &self,
        session_id: &SessionId,
        session: &mut Session,
        rotation: &[AgentId],
        round: u32,
        context: Option<&str>,
        responses: &mut Vec<RoundResponse>,
    ) -> Result<usize, DomainError> {
        let mut spoken = 0;
        for _ in 0..rotation.len() {
            let Some(speaker) = ordering::next_speaker(session, None, &*self.tie_breaker) else {
                break;
            };
            let (response, draft) = self
                .speaker_turn(session, &speaker, round, context, None)
                .await;
            *session = self.store.add_message(session_id, draft).await?;
            responses.push(response);

            // Keep the rotation moving past whoever just spoke, so the
            // round-robin fallback does not stall on one participant.
            let position = rotation.iter().position(|id| id == &speaker).unwrap_or(0);
            let next_index = (position + 1) % rotation.len();
            *session = self
                .store
                .advance_turn(session_id, session.current_turn(), next_index)
                .await?;
            spoken += 1;
        }
        Ok(spoken)
    }

    /// Score all candidates once, so the speaking order and the per-message
    /// relevance metadata come from the same draw.
    fn plan_dynamic(
        &self,
        session: &Session,
        rotation: &[AgentId],
    ) -> (Vec<AgentId>, HashMap<AgentId, i64>) {
        let last_text = session.last_message().map(|m| m.content.clone());
        let scored =
            ordering::scored_candidates(session, last_text.as_deref(), &*self.tie_breaker);

        let mut scores = HashMap::new();
        for candidate in &scored {
            scores.insert(candidate.agent_id.clone(), candidate.score);
        }

        // Mentions always win: a mentioned participant leads the round.
        let mut planned: Vec<AgentId> = Vec::with_capacity(scored.len());
        if let Some(text) = last_text.as_deref() {
            if let Some(target) = mention::find_handoff(text, rotation) {
                planned.push(target);
            }
        }
        for candidate in scored {
            if !planned.contains(&candidate.agent_id) {
                planned.push(candidate.agent_id);
            }
        }
        (planned, scores)
    }

    // ==================== Single turns ====================

    /// Invoke the completion gateway for one regular speaker.
    ///
    /// A failing provider call never aborts the round: the provider's own
    /// error text is recorded as the message content and the round moves on.
    async fn speaker_turn(
        &self,
        session: &Session,
        speaker: &AgentId,
        round: u32,
        context: Option<&str>,
        relevance: Option<i64>,
    ) -> (RoundResponse, MessageDraft) {
        let display_name = session
            .participant(speaker)
            .map(|p| p.display_name.clone())
            .unwrap_or_else(|| speaker.to_string());

        let persona_prompt = self
            .catalog
            .system_prompt(speaker)
            .await
            .unwrap_or_else(|| PartyPromptTemplate::participant_system().to_string());
        let others: Vec<&Participant> = session
            .participants()
            .iter()
            .filter(|p| &p.agent_id != speaker)
            .collect();
        let system_prompt = format!(
            "{}\n\n{}",
            persona_prompt,
            PartyPromptTemplate::party_context(session.topic().content(), &display_name, &others)
        );
        let instruction =
            PartyPromptTemplate::contribution_prompt(session.topic().content(), context);

        let (content, response) = match self
            .gateway
            .generate(&system_prompt, session.history(), Some(&instruction))
            .await
        {
            Ok(text) => {
                debug!("Participant {} contributed in round {}", speaker, round);
                let response = RoundResponse::success(
                    speaker.clone(),
                    &display_name,
                    text.clone(),
                    ContributionKind::Contribution,
                    round,
                );
                (text, response)
            }
            Err(e) => {
                warn!("Participant {} failed in round {}: {}", speaker, round, e);
                let text = e.to_string();
                let response = RoundResponse::failure(
                    speaker.clone(),
                    &display_name,
                    text.clone(),
                    ContributionKind::Contribution,
                    round,
                );
                (text, response)
            }
        };

        let mentions =
            mention::parse_mentions(&content, |m| session.is_participant(&AgentId::new(m))).valid;
        let mut draft =
            MessageDraft::assistant(speaker.clone(), content, round).with_mentions(mentions);
        if let Some(score) = relevance {
            draft = draft.with_relevance_score(score);
        }
        (response, draft)
    }

    /// Invoke the completion gateway for a moderator intro or summary.
    async fn moderator_turn(
        &self,
        session: &Session,
        moderator: &Participant,
        instruction: &str,
        kind: ContributionKind,
        round: u32,
    ) -> (RoundResponse, MessageDraft) {
        let system_prompt = self
            .catalog
            .system_prompt(&moderator.agent_id)
            .await
            .unwrap_or_else(|| PartyPromptTemplate::moderator_system().to_string());

        let (content, success, error) = match self
            .gateway
            .generate(&system_prompt, session.history(), Some(instruction))
            .await
        {
            Ok(text) => (text, true, None),
            Err(e) => {
                warn!("Moderator {} failed: {}", moderator.agent_id, e);
                let text = e.to_string();
                (text.clone(), false, Some(text))
            }
        };

        let response = RoundResponse {
            agent_id: moderator.agent_id.clone(),
            display_name: moderator.display_name.clone(),
            content: content.clone(),
            kind,
            turn_number: round,
            success,
            error,
        };

        let mentions =
            mention::parse_mentions(&content, |m| session.is_participant(&AgentId::new(m))).valid;
        let mut draft = MessageDraft::assistant(moderator.agent_id.clone(), content, round)
            .with_mentions(mentions);
        draft = match kind {
            ContributionKind::ModeratorIntro => draft.as_moderator_intro(),
            ContributionKind::ModeratorSummary => draft.as_moderator_summary(),
            _ => draft,
        };
        (response, draft)
    }

    /// Ask the moderator to hand the floor onward after its summary.
    async fn direct_next_speaker(
        &self,
        session_id: &SessionId,
        session: &mut Session,
        moderator: &Participant,
        round: u32,
    ) -> Result<Option<RoundResponse>, DomainError> {
        let Some(target_id) = ordering::next_speaker(session, None, &*self.tie_breaker) else {
            return Ok(None);
        };
        let Some(target) = session.participant(&target_id).cloned() else {
            return Ok(None);
        };

        let capabilities = self
            .catalog
            .resolve(&target_id)
            .await
            .map(|p| p.capabilities)
            .unwrap_or_default();
        let instruction = PartyPromptTemplate::direction_prompt(&target, &capabilities, None);
        let (response, draft) = self
            .moderator_turn(
                session,
                moderator,
                &instruction,
                ContributionKind::ModeratorDirection,
                round,
            )
            .await;
        *session = self.store.add_message(session_id, draft).await?;
        Ok(Some(response))
    }

    // ==================== Helpers ====================

    /// Resolve the requested personas and build the session.
    ///
    /// Ids unknown to the catalog, filtered out by category, or repeated in
    /// the request do not fail the call — they are reported back as skipped.
    async fn create_session(
        &self,
        owner_id: &str,
        agent_ids: &[AgentId],
        topic: &str,
        config: Option<SessionConfig>,
    ) -> Result<(Session, Vec<AgentId>), DomainError> {
        let topic = Topic::try_new(topic).ok_or(DomainError::EmptyTopic)?;
        let config = config.unwrap_or_default();

        let mut profiles: Vec<PersonaProfile> = Vec::with_capacity(agent_ids.len());
        let mut skipped: Vec<AgentId> = Vec::new();
        for id in agent_ids {
            if profiles.iter().any(|p| &p.id == id) {
                skipped.push(id.clone());
                continue;
            }
            match self.catalog.resolve(id).await {
                Some(profile) if config.allows_category(&profile.category) => {
                    profiles.push(profile)
                }
                Some(_) | None => {
                    warn!("Skipping unresolvable or filtered persona {}", id);
                    skipped.push(id.clone());
                }
            }
        }

        let session = Session::new(
            SessionId::new(Uuid::new_v4().to_string()),
            owner_id,
            topic,
            &profiles,
            config,
        )?;
        info!(
            "Created session {} with {} participant(s) on topic \"{}\"",
            session.id(),
            session.participants().len(),
            session.topic()
        );
        self.store.insert(session.clone()).await;
        Ok((session, skipped))
    }

    async fn require(&self, session_id: &SessionId) -> Result<Session, DomainError> {
        self.store
            .get(session_id)
            .await
            .ok_or_else(|| DomainError::SessionNotFound(session_id.to_string()))
    }

    /// Ownership gate: only the owner may read, reconfigure or delete.
    async fn owned(
        &self,
        session_id: &SessionId,
        requester: &str,
    ) -> Result<Session, DomainError> {
        let session = self.require(session_id).await?;
        if session.owner_id() != requester {
            return Err(DomainError::Forbidden(session_id.to_string()));
        }
        Ok(session)
    }

    async fn round_lock(&self, session_id: &SessionId) -> Arc<Mutex<()>> {
        let mut locks = self.round_locks.lock().await;
        locks
            .entry(session_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// This round's non-summary assistant messages, attributed by display name.
fn round_contributions(session: &Session, round: u32) -> Vec<(String, String)> {
    session
        .messages_in_turn(round)
        .filter(|m| m.role == Role::Assistant && !m.metadata.is_moderator_summary)
        .filter_map(|m| {
            let agent_id = m.agent_id.as_ref()?;
            let name = session
                .participant(agent_id)
                .map(|p| p.display_name.clone())
                .unwrap_or_else(|| agent_id.to_string());
            Some((name, m.content.clone()))
        })
        .collect()
}
