// Core layer - configuration, errors and text helpers
pub mod core;

// Features layer - characters, generation backends and debates
pub mod features;

pub use crate::core::{Config, DebateConfig, DebateError};

pub use features::{
    // Characters
    CharacterCreation, CharacterCreator, CharacterRecord, CharacterRegistry, CharacterStore,
    // Debate
    DebateOrchestrator, DebateOutcome, DebateRequest, DebateState, Phase,
    // Generation
    Debator, GenerationBackend, OpenAiBackend,
};
