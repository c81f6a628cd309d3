//! Typed precondition failures surfaced to debate callers.

use thiserror::Error;

/// Failures detected before any generation call is made.
///
/// Backend failures are deliberately absent: those are folded into sentinel
/// turns by the generation adapter and never abort a debate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DebateError {
    #[error("Character '{0}' not found")]
    CharacterNotFound(String),

    #[error("Invalid debate configuration: {0}")]
    InvalidConfig(String),

    #[error("Debate topic is empty")]
    EmptyTopic,

    #[error("Failed to create character: {0}")]
    CharacterCreation(String),
}
