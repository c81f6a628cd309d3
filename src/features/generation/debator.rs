//! # Debator
//!
//! Uniform generation capability used by the debate orchestrator. Wraps a
//! [`GenerationBackend`], owns the agent cache and converts backend failures
//! into in-band sentinel turns so that a degraded debate still completes.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: Agent cache keyed by debate session and seat
//! - 1.1.0: Stateful agents with conversation memory
//! - 1.0.0: Stateless generation with sentinel errors

use anyhow::Result;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::backend::GenerationBackend;
use super::memory::{ConversationMemory, MemoryMessage};
use crate::core::text::preview;
use crate::features::debate::state::Seat;

/// Prefix of every sentinel turn produced for a failed generation call
pub const GENERATION_ERROR_PREFIX: &str = "[Error generating response: ";

/// Separator used when a sequence of turns is flattened into one prompt
pub const TURN_SEPARATOR: &str = "\n\n";

pub fn generation_error(reason: impl std::fmt::Display) -> String {
    format!("{GENERATION_ERROR_PREFIX}{reason}]")
}

/// Whether `text` is a sentinel standing in for a failed generation call
pub fn is_generation_error(text: &str) -> bool {
    text.starts_with(GENERATION_ERROR_PREFIX) && text.ends_with(']')
}

/// What an agent is asked to respond to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationInput {
    Prompt(String),
    /// Ordered turns, flattened with [`TURN_SEPARATOR`] before dispatch
    Transcript(Vec<String>),
}

impl GenerationInput {
    pub fn flatten(&self) -> String {
        match self {
            GenerationInput::Prompt(prompt) => prompt.clone(),
            GenerationInput::Transcript(turns) => turns.join(TURN_SEPARATOR),
        }
    }
}

impl From<&str> for GenerationInput {
    fn from(prompt: &str) -> Self {
        GenerationInput::Prompt(prompt.to_string())
    }
}

impl From<String> for GenerationInput {
    fn from(prompt: String) -> Self {
        GenerationInput::Prompt(prompt)
    }
}

impl From<Vec<String>> for GenerationInput {
    fn from(turns: Vec<String>) -> Self {
        GenerationInput::Transcript(turns)
    }
}

/// Cache key for an agent: one per debate session, seat and character
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AgentKey {
    pub session: Uuid,
    pub seat: Seat,
    pub character_id: String,
}

impl AgentKey {
    pub fn new(session: Uuid, seat: Seat, character_id: &str) -> Self {
        Self {
            session,
            seat,
            character_id: character_id.to_string(),
        }
    }
}

/// A stateful generation session for one character
#[derive(Debug)]
pub struct Agent {
    key: Option<AgentKey>,
    context: String,
    memory: Mutex<ConversationMemory>,
}

impl Agent {
    fn new(context: &str, key: Option<AgentKey>) -> Self {
        Self {
            key,
            context: context.to_string(),
            memory: Mutex::new(ConversationMemory::new()),
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn key(&self) -> Option<&AgentKey> {
        self.key.as_ref()
    }

    pub async fn history(&self) -> Vec<MemoryMessage> {
        self.memory.lock().await.snapshot()
    }

    pub async fn clear_memory(&self) {
        self.memory.lock().await.clear();
    }
}

pub type AgentHandle = Arc<Agent>;

/// Who a generation call is made for
#[derive(Debug, Clone)]
pub enum GenerationTarget {
    /// Raw context; a throwaway session is created for the call
    Stateless(String),
    /// Cached agent; the exchange is appended to its memory
    Stateful(AgentHandle),
}

pub struct Debator {
    backend: Arc<dyn GenerationBackend>,
    agents: DashMap<AgentKey, AgentHandle>,
}

impl Debator {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            agents: DashMap::new(),
        }
    }

    /// Stateless generation against a raw context
    pub async fn generate(&self, context: &str, input: impl Into<GenerationInput>) -> String {
        self.debate(&GenerationTarget::Stateless(context.to_string()), input)
            .await
    }

    /// Create (or reuse) an agent.
    ///
    /// With a key, a second call returns the cached handle untouched.
    pub fn initialize_agent(&self, context: &str, key: Option<AgentKey>) -> AgentHandle {
        let Some(key) = key else {
            debug!("Initializing uncached agent");
            return Arc::new(Agent::new(context, None));
        };

        match self.agents.entry(key.clone()) {
            Entry::Occupied(existing) => {
                info!(
                    "[{}] Using cached agent for {} ({:?})",
                    key.session, key.character_id, key.seat
                );
                existing.get().clone()
            }
            Entry::Vacant(slot) => {
                info!(
                    "[{}] Agent initialized for {} ({:?})",
                    key.session, key.character_id, key.seat
                );
                slot.insert(Arc::new(Agent::new(context, Some(key.clone()))))
                    .clone()
            }
        }
    }

    /// Generate one turn. Never fails: backend errors come back as a sentinel string.
    pub async fn debate(&self, target: &GenerationTarget, input: impl Into<GenerationInput>) -> String {
        let agent = match target {
            GenerationTarget::Stateful(agent) => agent.clone(),
            GenerationTarget::Stateless(context) => self.initialize_agent(context, None),
        };
        let input: GenerationInput = input.into();
        let prompt = input.flatten();

        let history = agent.memory.lock().await.snapshot();
        match self.backend.complete(&agent.context, &history, &prompt).await {
            Ok(response) => {
                let mut memory = agent.memory.lock().await;
                memory.append_user(prompt);
                memory.append_assistant(response.clone());
                debug!("Generated debate response: {}", preview(&response, 100));
                response
            }
            Err(e) => {
                error!("Error generating debate response: {e}");
                generation_error(e)
            }
        }
    }

    /// Raw backend call for callers that must distinguish failures (character creation)
    pub async fn complete(&self, system_prompt: &str, input: &str) -> Result<String> {
        self.backend.complete(system_prompt, &[], input).await
    }

    /// Clear a cached agent's memory; returns whether the agent exists
    pub async fn reset_agent_memory(&self, key: &AgentKey) -> bool {
        let agent = self.agents.get(key).map(|entry| entry.value().clone());
        match agent {
            Some(agent) => {
                agent.clear_memory().await;
                info!("[{}] Reset memory for character {}", key.session, key.character_id);
                true
            }
            None => {
                warn!(
                    "[{}] No active agent found for character {}",
                    key.session, key.character_id
                );
                false
            }
        }
    }

    pub async fn agent_history(&self, key: &AgentKey) -> Vec<MemoryMessage> {
        let agent = self.agents.get(key).map(|entry| entry.value().clone());
        match agent {
            Some(agent) => agent.history().await,
            None => Vec::new(),
        }
    }

    /// Drop every cached agent of a debate session; returns how many were removed
    pub fn release_session(&self, session: Uuid) -> usize {
        let before = self.agents.len();
        self.agents.retain(|key, _| key.session != session);
        let released = before.saturating_sub(self.agents.len());
        debug!("[{session}] Released {released} agents");
        released
    }

    pub fn active_agents(&self) -> usize {
        self.agents.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::generation::test_support::ScriptedBackend;

    fn debator(backend: Arc<ScriptedBackend>) -> Debator {
        Debator::new(backend)
    }

    #[test]
    fn test_flatten_preserves_order() {
        let input = GenerationInput::from(vec!["first".to_string(), "second".to_string()]);
        assert_eq!(input.flatten(), "first\n\nsecond");
        assert_eq!(GenerationInput::from("only").flatten(), "only");
    }

    #[test]
    fn test_sentinel_detection() {
        let sentinel = generation_error("timeout");
        assert_eq!(sentinel, "[Error generating response: timeout]");
        assert!(is_generation_error(&sentinel));
        assert!(!is_generation_error("A perfectly normal reply."));
    }

    #[tokio::test]
    async fn test_stateless_generation_sends_context_without_history() {
        let backend = Arc::new(ScriptedBackend::echo());
        let debator = debator(backend.clone());

        let reply = debator.generate("ctx", "hello").await;
        assert_eq!(reply, "reply 1");

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].system_prompt, "ctx");
        assert_eq!(calls[0].input, "hello");
        assert!(calls[0].history.is_empty());
        assert_eq!(debator.active_agents(), 0);
    }

    #[tokio::test]
    async fn test_stateful_agent_accumulates_memory() {
        let backend = Arc::new(ScriptedBackend::echo());
        let debator = debator(backend.clone());
        let key = AgentKey::new(Uuid::new_v4(), Seat::A, "Dr. Logic");
        let agent = debator.initialize_agent("ctx", Some(key.clone()));
        let target = GenerationTarget::Stateful(agent);

        debator.debate(&target, "first").await;
        debator.debate(&target, "second").await;

        let calls = backend.calls();
        assert_eq!(calls[1].history.len(), 2);
        assert_eq!(calls[1].history[0].content, "first");
        assert_eq!(calls[1].history[1].content, "reply 1");
        assert_eq!(debator.agent_history(&key).await.len(), 4);
    }

    #[tokio::test]
    async fn test_initialize_agent_is_idempotent_per_key() {
        let debator = debator(Arc::new(ScriptedBackend::echo()));
        let key = AgentKey::new(Uuid::new_v4(), Seat::A, "Dr. Logic");

        let first = debator.initialize_agent("ctx", Some(key.clone()));
        let second = debator.initialize_agent("other ctx", Some(key));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.context(), "ctx");
        assert_eq!(debator.active_agents(), 1);
    }

    #[tokio::test]
    async fn test_sessions_do_not_share_agents() {
        let debator = debator(Arc::new(ScriptedBackend::echo()));
        let first = debator.initialize_agent(
            "ctx",
            Some(AgentKey::new(Uuid::new_v4(), Seat::A, "The Skeptic")),
        );
        let second = debator.initialize_agent(
            "ctx",
            Some(AgentKey::new(Uuid::new_v4(), Seat::A, "The Skeptic")),
        );

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(debator.active_agents(), 2);
    }

    #[tokio::test]
    async fn test_backend_failure_becomes_sentinel_and_skips_memory() {
        let debator = debator(Arc::new(ScriptedBackend::failing("connection reset")));
        let key = AgentKey::new(Uuid::new_v4(), Seat::B, "Ms. Firebrand");
        let agent = debator.initialize_agent("ctx", Some(key.clone()));

        let reply = debator.debate(&GenerationTarget::Stateful(agent), "go").await;

        assert_eq!(reply, "[Error generating response: connection reset]");
        assert!(debator.agent_history(&key).await.is_empty());
    }

    #[tokio::test]
    async fn test_reset_agent_memory_twice() {
        let debator = debator(Arc::new(ScriptedBackend::echo()));
        let key = AgentKey::new(Uuid::new_v4(), Seat::A, "Prof. History");
        let agent = debator.initialize_agent("ctx", Some(key.clone()));
        debator.debate(&GenerationTarget::Stateful(agent), "go").await;

        assert!(debator.reset_agent_memory(&key).await);
        assert!(debator.agent_history(&key).await.is_empty());
        assert!(debator.reset_agent_memory(&key).await);
        assert!(debator.agent_history(&key).await.is_empty());
    }

    #[tokio::test]
    async fn test_reset_unknown_agent() {
        let debator = debator(Arc::new(ScriptedBackend::echo()));
        let key = AgentKey::new(Uuid::new_v4(), Seat::A, "ghost");
        assert!(!debator.reset_agent_memory(&key).await);
    }

    #[tokio::test]
    async fn test_release_session_only_drops_that_session() {
        let debator = debator(Arc::new(ScriptedBackend::echo()));
        let kept = Uuid::new_v4();
        let released = Uuid::new_v4();
        debator.initialize_agent("a", Some(AgentKey::new(kept, Seat::A, "x")));
        debator.initialize_agent("a", Some(AgentKey::new(released, Seat::A, "x")));
        debator.initialize_agent("b", Some(AgentKey::new(released, Seat::B, "y")));

        assert_eq!(debator.release_session(released), 2);
        assert_eq!(debator.active_agents(), 1);
        assert_eq!(debator.release_session(released), 0);
    }
}
