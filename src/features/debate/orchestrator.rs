//! # Debate Orchestrator
//!
//! Drives a debate between two characters: opening statements, alternating
//! rounds, closing statements. Turns are strictly sequential because every
//! reply may depend on the one before it.

use dashmap::DashMap;
use log::{debug, info, warn};
use std::sync::{Arc, OnceLock};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::state::{DebateState, Seat, Turn};
use super::transcript::format_debate_output;
use crate::core::config::DebateConfig;
use crate::core::error::DebateError;
use crate::core::text::{normalize_input, preview};
use crate::features::characters::{format_character_for_prompt, CharacterCreator, CharacterRegistry};
use crate::features::generation::{
    is_generation_error, AgentKey, Debator, GenerationInput, GenerationTarget,
};

/// A running debate, visible process-wide so it can be cancelled
#[derive(Debug, Clone)]
pub struct ActiveDebate {
    pub topic: String,
    pub character_a_id: String,
    pub character_b_id: String,
    pub cancel: CancellationToken,
}

/// Global storage for running debates (keyed by session ID)
static ACTIVE_DEBATES: OnceLock<DashMap<Uuid, ActiveDebate>> = OnceLock::new();

/// Get or initialize the active debates map
pub fn get_active_debates() -> &'static DashMap<Uuid, ActiveDebate> {
    ACTIVE_DEBATES.get_or_init(DashMap::new)
}

/// Cancel a running debate; returns whether it was found
pub fn cancel_debate(session_id: Uuid) -> bool {
    match get_active_debates().get(&session_id) {
        Some(debate) => {
            debate.cancel.cancel();
            info!("[{session_id}] Cancellation requested");
            true
        }
        None => false,
    }
}

/// Unregisters a debate and drops its session agents when it goes out of
/// scope, including when the debate future is dropped mid-turn
struct SessionGuard {
    session_id: Uuid,
    debator: Arc<Debator>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if get_active_debates().remove(&self.session_id).is_some() {
            debug!("[{}] Removed from active debates", self.session_id);
        }
        self.debator.release_session(self.session_id);
    }
}

/// Parameters of one debate run
#[derive(Debug, Clone)]
pub struct DebateRequest {
    pub topic: String,
    pub character_a_id: String,
    pub character_b_id: String,
    /// Round budget; falls back to `debate_rounds_count` from the debate config
    pub rounds: Option<u32>,
    /// Stateful agents that see only the latest opponent turn (otherwise full history each turn)
    pub use_memory: bool,
}

impl DebateRequest {
    pub fn new(topic: &str, character_a_id: &str, character_b_id: &str) -> Self {
        Self {
            topic: topic.to_string(),
            character_a_id: character_a_id.to_string(),
            character_b_id: character_b_id.to_string(),
            rounds: None,
            use_memory: true,
        }
    }

    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = Some(rounds);
        self
    }

    pub fn with_memory(mut self, use_memory: bool) -> Self {
        self.use_memory = use_memory;
        self
    }
}

/// Final state plus its rendered transcript
#[derive(Debug, Clone)]
pub struct DebateOutcome {
    pub state: DebateState,
    pub transcript: String,
}

impl DebateOutcome {
    pub fn is_complete(&self) -> bool {
        self.state.is_complete()
    }
}

pub struct DebateOrchestrator {
    registry: Arc<dyn CharacterRegistry>,
    debator: Arc<Debator>,
    config: DebateConfig,
}

impl DebateOrchestrator {
    pub fn new(
        registry: Arc<dyn CharacterRegistry>,
        debator: Arc<Debator>,
        config: DebateConfig,
    ) -> Result<Self, DebateError> {
        config.validate()?;
        Ok(Self {
            registry,
            debator,
            config,
        })
    }

    pub fn config(&self) -> &DebateConfig {
        &self.config
    }

    /// Run a debate to completion and return its transcript
    pub async fn start_debate(&self, request: DebateRequest) -> Result<DebateOutcome, DebateError> {
        self.start_debate_with_cancel(request, CancellationToken::new())
            .await
    }

    /// Run a debate that stops early once `cancel` fires.
    ///
    /// Unknown characters and empty topics fail before any generation call.
    /// A cancelled debate still returns `Ok`, with an incomplete transcript.
    pub async fn start_debate_with_cancel(
        &self,
        request: DebateRequest,
        cancel: CancellationToken,
    ) -> Result<DebateOutcome, DebateError> {
        let state = self.initialize_debate(&request)?;
        let session_id = state.session_id;
        let guard = SessionGuard {
            session_id,
            debator: self.debator.clone(),
        };

        get_active_debates().insert(
            session_id,
            ActiveDebate {
                topic: state.prompt.clone(),
                character_a_id: state.character_a_id.clone(),
                character_b_id: state.character_b_id.clone(),
                cancel: cancel.clone(),
            },
        );

        let state = self.run(state, &cancel).await;
        drop(guard);

        let transcript = format_debate_output(&state);
        if state.is_complete() {
            info!("[{session_id}] Debate completed successfully");
        } else {
            warn!(
                "[{session_id}] Debate stopped during {} phase ({} turns)",
                state.phase,
                state.history.len()
            );
        }

        Ok(DebateOutcome { state, transcript })
    }

    /// Create a character from a description and have it debate as A
    pub async fn create_character_and_debate(
        &self,
        creator: &CharacterCreator,
        character_description: &str,
        opponent_character_id: &str,
        topic: &str,
        rounds: u32,
    ) -> Result<DebateOutcome, DebateError> {
        let created = creator
            .create_character_from_description(character_description)
            .await;

        let new_character_id = match (created.error(), created.character_id()) {
            (None, Some(id)) => id.to_string(),
            (Some(error), _) => return Err(DebateError::CharacterCreation(error.to_string())),
            (None, None) => {
                return Err(DebateError::CharacterCreation(
                    "no character id returned".to_string(),
                ))
            }
        };

        let request = DebateRequest::new(topic, &new_character_id, opponent_character_id)
            .with_rounds(rounds)
            .with_memory(true);
        self.start_debate(request).await
    }

    /// Resolve both characters and build the opening state (and agents in memory mode)
    pub fn initialize_debate(&self, request: &DebateRequest) -> Result<DebateState, DebateError> {
        let topic = normalize_input(&request.topic, false);
        if topic.is_empty() {
            return Err(DebateError::EmptyTopic);
        }

        let character_a_id = request.character_a_id.trim();
        let character_b_id = request.character_b_id.trim();
        let record_a = self.registry.get_character_description(character_a_id)?;
        let record_b = self.registry.get_character_description(character_b_id)?;

        let closing_instruction = &self.config.character_closing_instruction;
        let context_a = format_character_for_prompt(&record_a, closing_instruction);
        let context_b = format_character_for_prompt(&record_b, closing_instruction);

        let max_rounds = request.rounds.unwrap_or(self.config.debate_rounds_count);
        let mut state = DebateState::new(
            &topic,
            character_a_id,
            character_b_id,
            context_a,
            context_b,
            max_rounds,
            request.use_memory,
        );

        info!(
            "[{}] Initializing debate between {} and {} on '{}' ({} rounds, memory {})",
            state.session_id,
            character_a_id,
            character_b_id,
            topic,
            state.max_rounds,
            if state.use_memory { "enabled" } else { "disabled" }
        );

        if state.use_memory {
            let session = state.session_id;
            state.agent_a = Some(self.debator.initialize_agent(
                &state.context_a,
                Some(AgentKey::new(session, Seat::A, character_a_id)),
            ));
            state.agent_b = Some(self.debator.initialize_agent(
                &state.context_b,
                Some(AgentKey::new(session, Seat::B, character_b_id)),
            ));
        }

        Ok(state)
    }

    /// Advance `state` until it is complete or `cancel` fires.
    ///
    /// Each iteration appends exactly one utterance, so a debate performs at
    /// most `2 * max_rounds` generation calls whatever the backend returns.
    pub async fn run(&self, mut state: DebateState, cancel: &CancellationToken) -> DebateState {
        let session_id = state.session_id;

        while let Some(turn) = state.next_turn() {
            if cancel.is_cancelled() {
                warn!("[{session_id}] Debate cancelled before {turn:?}");
                state.cancelled = true;
                break;
            }

            let content = self.take_turn(&state, turn).await;
            if is_generation_error(&content) {
                warn!("[{session_id}] {turn:?} degraded to an error turn");
            }
            state.record(turn, content);
        }

        if state.use_memory {
            self.release_agents(&state).await;
        }
        state
    }

    async fn take_turn(&self, state: &DebateState, turn: Turn) -> String {
        let seat = turn.seat();
        let character_id = state.character_id(seat);

        let target = match (state.use_memory, state.agent(seat)) {
            (true, Some(agent)) => GenerationTarget::Stateful(agent.clone()),
            _ => GenerationTarget::Stateless(state.context(seat).to_string()),
        };
        let stateful = matches!(target, GenerationTarget::Stateful(_));

        let input: GenerationInput = match turn {
            Turn::Opening(_) => {
                info!(
                    "[{}] Character {seat:?} ({character_id}) making opening statement",
                    state.session_id
                );
                format!("{}{}", self.config.opening_statement_prompt, state.prompt).into()
            }
            Turn::Rebuttal(_) => {
                info!(
                    "[{}] Character {seat:?} ({character_id}) responding - Round {}",
                    state.session_id, state.current_round
                );
                if stateful {
                    // The agent remembers everything else; only the newest opponent turn is new
                    state
                        .history
                        .last()
                        .map(|u| u.content.clone())
                        .unwrap_or_default()
                        .into()
                } else {
                    self.labelled_history(state).into()
                }
            }
            Turn::Closing(_) => {
                info!(
                    "[{}] Character {seat:?} ({character_id}) making closing statement",
                    state.session_id
                );
                if stateful {
                    self.config.closing_statement_prompt.clone().into()
                } else {
                    let mut turns = self.labelled_history(state);
                    turns.push(self.config.closing_statement_prompt.clone());
                    turns.into()
                }
            }
        };

        let content = self.debator.debate(&target, input).await;
        debug!(
            "[{}] {character_id}: {}",
            state.session_id,
            preview(&content, 100)
        );
        content
    }

    /// History so far, each turn prefixed with its speaker's id (and seat
    /// when one character holds both seats)
    fn labelled_history(&self, state: &DebateState) -> Vec<String> {
        let mirrored = state.character_a_id == state.character_b_id;
        state
            .history
            .iter()
            .map(|u| {
                let id = state.character_id(u.seat);
                if mirrored {
                    format!("{id} ({:?}): {}", u.seat, u.content)
                } else {
                    format!("{id}: {}", u.content)
                }
            })
            .collect()
    }

    async fn release_agents(&self, state: &DebateState) {
        for seat in [Seat::A, Seat::B] {
            let key = AgentKey::new(state.session_id, seat, state.character_id(seat));
            self.debator.reset_agent_memory(&key).await;
        }
        self.debator.release_session(state.session_id);
    }
}
