//! # Characters Feature
//!
//! Debate personas: records, system-prompt formatting, the registry and
//! creation of new characters from free text.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Character creation with on-disk persistence
//! - 1.1.0: Registry trait with concurrent store
//! - 1.0.0: Initial release

pub mod creator;
pub mod record;
pub mod registry;

pub use creator::{character_id_for, CharacterCreation, CharacterCreator};
pub use record::{format_character_for_prompt, CharacterRecord};
pub use registry::{CharacterRegistry, CharacterStore, StoredCharacter};
