//! Character creation from a free-text description
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0

use log::{error, info};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::Arc;

use super::record::CharacterRecord;
use super::registry::{CharacterStore, StoredCharacter};
use crate::core::text::{normalize_input, preview};
use crate::features::generation::Debator;

const CHARACTER_ID_LEN: usize = 12;

/// Outcome of a creation attempt. Failures are values, not errors:
/// they serialize as `{"error": "..."}` and callers must check for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CharacterCreation {
    Created(StoredCharacter),
    Failed { error: String },
}

impl CharacterCreation {
    pub fn error(&self) -> Option<&str> {
        match self {
            CharacterCreation::Created(_) => None,
            CharacterCreation::Failed { error } => Some(error),
        }
    }

    pub fn character_id(&self) -> Option<&str> {
        match self {
            CharacterCreation::Created(stored) => Some(&stored.character_id),
            CharacterCreation::Failed { .. } => None,
        }
    }
}

pub struct CharacterCreator {
    debator: Arc<Debator>,
    store: Arc<CharacterStore>,
    creation_prompt: String,
    dump_dir: Option<PathBuf>,
}

impl CharacterCreator {
    pub fn new(debator: Arc<Debator>, store: Arc<CharacterStore>, creation_prompt: String) -> Self {
        Self {
            debator,
            store,
            creation_prompt,
            dump_dir: None,
        }
    }

    /// Persist created characters as `{id}.json` under `dir`
    pub fn with_dump_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dump_dir = Some(dir.into());
        self
    }

    pub async fn create_character_from_description(&self, description: &str) -> CharacterCreation {
        let description = normalize_input(description, false);
        if description.is_empty() {
            return CharacterCreation::Failed {
                error: "Character description is empty".to_string(),
            };
        }

        let response = match self.debator.complete(&self.creation_prompt, &description).await {
            Ok(response) => response,
            Err(e) => {
                error!("Character creation request failed: {e}");
                return CharacterCreation::Failed {
                    error: "An unexpected error occurred while creating the character".to_string(),
                };
            }
        };
        info!("Character creation response: {}", preview(&response, 200));

        let record: CharacterRecord = match serde_json::from_str(strip_code_fence(&response)) {
            Ok(record) => record,
            Err(e) => {
                error!("JSON decoding error: {e}");
                return CharacterCreation::Failed {
                    error: format!("Failed to parse character JSON, with response: {response}"),
                };
            }
        };

        let stored = StoredCharacter {
            character_id: character_id_for(&response),
            record,
        };

        if let Some(dir) = &self.dump_dir {
            if let Err(e) = save_character(dir, &stored) {
                error!("Failed to save character {}: {e}", stored.character_id);
                return CharacterCreation::Failed {
                    error: format!("Failed to save character: {e}"),
                };
            }
        }

        self.store.insert(&stored.character_id, stored.record.clone());
        info!(
            "Created character {} ({})",
            stored.character_id,
            stored.record.display_name()
        );
        CharacterCreation::Created(stored)
    }
}

/// First 12 hex digits of the SHA-256 of the model's reply
pub fn character_id_for(response: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(response.as_bytes()));
    digest[..CHARACTER_ID_LEN].to_string()
}

/// Models often wrap JSON in a Markdown fence; accept both forms
fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn save_character(dir: &std::path::Path, stored: &StoredCharacter) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.json", stored.character_id));
    std::fs::write(&path, serde_json::to_string_pretty(stored)?)?;
    info!("Saved character to {}", path.display());
    Ok(())
}
