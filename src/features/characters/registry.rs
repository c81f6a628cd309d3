//! # Feature: Character Registry
//!
//! Lookup of debate characters by id. The stock characters are compiled in;
//! characters created at runtime are stored as JSON files and loaded back
//! from the dump directory.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Concurrent store so created characters can join running processes
//! - 1.1.0: Load created characters from CHARACTER_DUMP_PATH
//! - 1.0.0: Initial release with 4 stock characters

use anyhow::{Context, Result};
use dashmap::DashMap;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::record::CharacterRecord;
use crate::core::error::DebateError;

/// Source of character records consumed by the orchestrator
pub trait CharacterRegistry: Send + Sync {
    fn get_character_description(&self, id: &str) -> Result<CharacterRecord, DebateError>;

    /// All known ids, sorted
    fn character_names(&self) -> Vec<String>;
}

/// On-disk shape of a created character (`{character_id}.json`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCharacter {
    pub character_id: String,
    #[serde(flatten)]
    pub record: CharacterRecord,
}

#[derive(Debug, Default)]
pub struct CharacterStore {
    characters: DashMap<String, CharacterRecord>,
}

impl CharacterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the stock characters
    pub fn with_builtins() -> Self {
        let store = Self::new();

        store.insert(
            "Dr. Logic",
            CharacterRecord::new(
                "Dr. Logic",
                "methodical and formal",
                "A calm academic who uses evidence-based reasoning.",
            ),
        );
        store.insert(
            "Ms. Firebrand",
            CharacterRecord::new(
                "Ms. Firebrand",
                "emotional and passionate",
                "A fiery orator who appeals to heart and instinct.",
            ),
        );
        store.insert(
            "Prof. History",
            CharacterRecord::new(
                "Prof. History",
                "reflective and contextual",
                "Uses historical knowledge to support arguments.",
            ),
        );
        store.insert(
            "The Skeptic",
            CharacterRecord::new(
                "The Skeptic",
                "critical and questioning",
                "Dissects flaws and plays devil's advocate.",
            ),
        );

        store
    }

    pub fn insert(&self, id: &str, record: CharacterRecord) {
        self.characters.insert(id.to_string(), record);
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Load every `*.json` created character from `dir`, returning how many were added.
    ///
    /// Unreadable or malformed files are skipped with a warning.
    pub fn load_dir(&self, dir: impl AsRef<Path>) -> Result<usize> {
        let dir = dir.as_ref();
        if !dir.exists() {
            debug!("Character directory {} does not exist yet", dir.display());
            return Ok(0);
        }

        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read character directory {}", dir.display()))?;

        let mut loaded = 0;
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let parsed = std::fs::read_to_string(&path)
                .map_err(anyhow::Error::from)
                .and_then(|raw| serde_json::from_str::<StoredCharacter>(&raw).map_err(Into::into));

            match parsed {
                Ok(stored) => {
                    self.insert(&stored.character_id, stored.record);
                    loaded += 1;
                }
                Err(e) => warn!("Skipping character file {}: {e}", path.display()),
            }
        }

        info!("Loaded {loaded} characters from {}", dir.display());
        Ok(loaded)
    }
}

impl CharacterRegistry for CharacterStore {
    fn get_character_description(&self, id: &str) -> Result<CharacterRecord, DebateError> {
        self.characters
            .get(id)
            .map(|record| record.clone())
            .ok_or_else(|| DebateError::CharacterNotFound(id.to_string()))
    }

    fn character_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.characters.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}
