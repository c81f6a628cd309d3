//! # Debate Feature
//!
//! Turn-based debates between two characters: opening statements,
//! alternating rounds and closing statements, rendered as a transcript.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Explicit state machine with cancellation
//! - 1.1.0: Memory and stateless modes
//! - 1.0.0: Initial implementation

pub mod orchestrator;
pub mod state;
pub mod transcript;

pub use orchestrator::{
    cancel_debate, get_active_debates, ActiveDebate, DebateOrchestrator, DebateOutcome,
    DebateRequest,
};
pub use state::{DebateState, Phase, Seat, Turn, Utterance, MIN_ROUNDS};
pub use transcript::format_debate_output;
