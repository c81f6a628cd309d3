//! Environment and debate-file configuration
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: YAML debate files alongside JSON
//! - 1.0.0: Initial environment loading

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::core::error::DebateError;

/// Closing sentence appended to every character context
pub const DEFAULT_CLOSING_INSTRUCTION: &str = "Respond accordingly.";

/// Rounds used when neither the caller nor the debate file says otherwise
pub const DEFAULT_DEBATE_ROUNDS: u32 = 5;

/// Process configuration read from the environment (`.env` is honoured by the binary)
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_model: String,
    pub temperature: f32,
    pub request_timeout_secs: u64,
    pub log_level: String,
    pub log_path: Option<PathBuf>,
    pub debate_config_path: PathBuf,
    pub character_dump_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let openai_api_key =
            env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?;

        let temperature = match env::var("MODEL_TEMPERATURE") {
            Ok(raw) => raw
                .parse::<f32>()
                .with_context(|| format!("MODEL_TEMPERATURE is not a number: {raw}"))?,
            Err(_) => 0.7,
        };

        let request_timeout_secs = match env::var("REQUEST_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("REQUEST_TIMEOUT_SECS is not an integer: {raw}"))?,
            Err(_) => 45,
        };

        Ok(Self {
            openai_api_key,
            openai_model: env::var("MODEL_NAME").unwrap_or_else(|_| "gpt-4".to_string()),
            temperature,
            request_timeout_secs,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_path: env::var("LOG_PATH").ok().map(PathBuf::from),
            debate_config_path: env::var("DEBATE_CONFIG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("config/debate_config.json")),
            character_dump_path: env::var("CHARACTER_DUMP_PATH").ok().map(PathBuf::from),
        })
    }
}

/// Read-only prompts and defaults injected into the orchestrator
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DebateConfig {
    #[serde(default = "default_rounds")]
    pub debate_rounds_count: u32,

    /// Prefix for both opening statements; the topic is appended verbatim
    pub opening_statement_prompt: String,

    pub closing_statement_prompt: String,

    /// System prompt lines for character creation, joined with newlines
    #[serde(default)]
    pub interpreted_character_creation_prompt: Vec<String>,

    #[serde(default = "default_closing_instruction")]
    pub character_closing_instruction: String,
}

fn default_rounds() -> u32 {
    DEFAULT_DEBATE_ROUNDS
}

fn default_closing_instruction() -> String {
    DEFAULT_CLOSING_INSTRUCTION.to_string()
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            debate_rounds_count: DEFAULT_DEBATE_ROUNDS,
            opening_statement_prompt: "Give your opening statement on the following topic: "
                .to_string(),
            closing_statement_prompt:
                "Give your closing statement, summarising your position and answering your opponent's strongest point."
                    .to_string(),
            interpreted_character_creation_prompt: Vec::new(),
            character_closing_instruction: default_closing_instruction(),
        }
    }
}

impl DebateConfig {
    /// Load a debate file; `.yaml`/`.yml` are parsed as YAML, everything else as JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read debate config {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let config: DebateConfig = if is_yaml {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Invalid YAML in {}", path.display()))?
        } else {
            serde_json::from_str(&contents)
                .with_context(|| format!("Invalid JSON in {}", path.display()))?
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DebateError> {
        if self.debate_rounds_count == 0 {
            return Err(DebateError::InvalidConfig(
                "debate_rounds_count must be at least 1".to_string(),
            ));
        }
        if self.opening_statement_prompt.trim().is_empty() {
            return Err(DebateError::InvalidConfig(
                "opening_statement_prompt is empty".to_string(),
            ));
        }
        if self.closing_statement_prompt.trim().is_empty() {
            return Err(DebateError::InvalidConfig(
                "closing_statement_prompt is empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn character_creation_prompt(&self) -> String {
        self.interpreted_character_creation_prompt.join("\n")
    }
}
