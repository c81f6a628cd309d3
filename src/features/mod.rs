//! Feature modules: characters, generation and debate orchestration.

pub mod characters;
pub mod debate;
pub mod generation;

pub use characters::{
    CharacterCreation, CharacterCreator, CharacterRecord, CharacterRegistry, CharacterStore,
};
pub use debate::{DebateOrchestrator, DebateOutcome, DebateRequest, DebateState, Phase};
pub use generation::{Debator, GenerationBackend, OpenAiBackend};
