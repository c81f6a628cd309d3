//! # Generation Feature
//!
//! Backend adapter used by debates: stateless and stateful (memory) turns,
//! a per-session agent cache and sentinel error turns.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Session-scoped agent cache
//! - 1.1.0: Conversation memory
//! - 1.0.0: Initial OpenAI backend

pub mod backend;
pub mod debator;
pub mod memory;

#[cfg(test)]
pub(crate) mod test_support;

pub use backend::{GenerationBackend, OpenAiBackend};
pub use debator::{
    generation_error, is_generation_error, Agent, AgentHandle, AgentKey, Debator,
    GenerationInput, GenerationTarget, GENERATION_ERROR_PREFIX, TURN_SEPARATOR,
};
pub use memory::{ConversationMemory, MemoryMessage, Role};
