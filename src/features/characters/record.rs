//! Character records and the system-prompt formatter
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: Records carrying both a legacy and a current key deserialize
//! - 1.1.0: Accept legacy `style`/`description` keys
//! - 1.0.0: Initial character template

use serde::{Deserialize, Serialize};

use crate::core::config::DEFAULT_CLOSING_INSTRUCTION;

/// A persona as stored by the registry. Every field is optional so that
/// partially described characters still produce a usable context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawCharacterRecord")]
pub struct CharacterRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub debate_style: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub personality_description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_details: Option<String>,
}

/// Wire shape accepting the legacy `style`/`description` keys next to the
/// current ones. The current key wins when both are present.
#[derive(Deserialize)]
struct RawCharacterRecord {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    debate_style: Option<String>,
    #[serde(default)]
    style: Option<String>,
    #[serde(default)]
    personality_description: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    extra_details: Option<String>,
}

impl From<RawCharacterRecord> for CharacterRecord {
    fn from(raw: RawCharacterRecord) -> Self {
        Self {
            name: raw.name,
            debate_style: raw.debate_style.or(raw.style),
            personality_description: raw.personality_description.or(raw.description),
            extra_details: raw.extra_details,
        }
    }
}

impl CharacterRecord {
    pub fn new(name: &str, debate_style: &str, personality_description: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            debate_style: Some(debate_style.to_string()),
            personality_description: Some(personality_description.to_string()),
            extra_details: None,
        }
    }

    pub fn with_extra_details(mut self, extra: &str) -> Self {
        self.extra_details = Some(extra.to_string());
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown Character")
    }
}

/// Render a character into the system prompt its agent speaks with.
///
/// Missing fields degrade to defaults instead of failing.
pub fn format_character_for_prompt(character: &CharacterRecord, closing_instruction: &str) -> String {
    let debate_style = character.debate_style.as_deref().unwrap_or("neutral");
    let personality = character.personality_description.as_deref().unwrap_or("");

    let mut context = format!(
        "You are {name}.\nDebate style: {debate_style}.\nPersonality: {personality}\n",
        name = character.display_name(),
    );

    if let Some(extra) = character.extra_details.as_deref().filter(|e| !e.trim().is_empty()) {
        context.push_str(&format!("Additional info: {extra}\n"));
    }

    let closing = if closing_instruction.trim().is_empty() {
        DEFAULT_CLOSING_INSTRUCTION
    } else {
        closing_instruction
    };
    context.push_str(closing);

    context
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_without_extra_details() {
        let record = CharacterRecord::new("X", "calm", "P");
        let prompt = format_character_for_prompt(&record, DEFAULT_CLOSING_INSTRUCTION);

        assert_eq!(
            prompt,
            "You are X.\nDebate style: calm.\nPersonality: P\nRespond accordingly."
        );
        assert!(!prompt.contains("Additional info"));
        assert_eq!(prompt.lines().last(), Some("Respond accordingly."));
    }

    #[test]
    fn test_format_with_extra_details() {
        let record = CharacterRecord::new("X", "calm", "P").with_extra_details("Loves chess");
        let prompt = format_character_for_prompt(&record, DEFAULT_CLOSING_INSTRUCTION);

        assert!(prompt.contains("Additional info: Loves chess\n"));
        assert!(prompt.ends_with("Respond accordingly."));
    }

    #[test]
    fn test_format_blank_extra_details_skipped() {
        let record = CharacterRecord::new("X", "calm", "P").with_extra_details("  ");
        let prompt = format_character_for_prompt(&record, DEFAULT_CLOSING_INSTRUCTION);
        assert!(!prompt.contains("Additional info"));
    }

    #[test]
    fn test_format_missing_fields_use_defaults() {
        let prompt = format_character_for_prompt(&CharacterRecord::default(), "Stay in character.");

        assert!(prompt.starts_with("You are Unknown Character.\n"));
        assert!(prompt.contains("Debate style: neutral.\n"));
        assert!(prompt.contains("Personality: \n"));
        assert!(prompt.ends_with("Stay in character."));
    }

    #[test]
    fn test_format_blank_instruction_falls_back() {
        let record = CharacterRecord::new("X", "calm", "P");
        assert!(format_character_for_prompt(&record, "").ends_with(DEFAULT_CLOSING_INSTRUCTION));
    }

    #[test]
    fn test_legacy_keys_deserialize() {
        let record: CharacterRecord = serde_json::from_str(
            r#"{"name": "The Skeptic", "style": "critical", "description": "Dissects flaws."}"#,
        )
        .unwrap();

        assert_eq!(record.debate_style.as_deref(), Some("critical"));
        assert_eq!(record.personality_description.as_deref(), Some("Dissects flaws."));
        assert_eq!(record.extra_details, None);
    }

    #[test]
    fn test_current_and_legacy_keys_together() {
        let record: CharacterRecord = serde_json::from_str(
            r#"{"name": "Ms. Firebrand", "style": "fiery", "debate_style": "passionate",
                "description": "Old bio.", "personality_description": "Speaks for the unheard."}"#,
        )
        .unwrap();

        assert_eq!(record.debate_style.as_deref(), Some("passionate"));
        assert_eq!(
            record.personality_description.as_deref(),
            Some("Speaks for the unheard.")
        );
        let written = serde_json::to_value(&record).unwrap();
        assert!(written.get("style").is_none());
        assert!(written.get("description").is_none());
    }
}
