//! Text-generation backends
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Configurable temperature and request timeout
//! - 1.0.0: OpenAI chat completions

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, error, info};
use openai::chat::{ChatCompletion, ChatCompletionMessage, ChatCompletionMessageRole};
use std::time::{Duration, Instant};
use tokio::time::timeout;

use super::memory::{MemoryMessage, Role};
use crate::core::text::preview;

/// A model that turns a system context, prior exchanges and a new input into text
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        history: &[MemoryMessage],
        input: &str,
    ) -> Result<String>;
}

/// Chat completions through the `openai` crate.
///
/// The crate reads its key from the environment, so the binary exports
/// `OPENAI_API_KEY`/`OPENAI_KEY` before the first request.
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    model: String,
    temperature: f32,
    request_timeout: Duration,
}

impl OpenAiBackend {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 0.7,
            request_timeout: Duration::from_secs(45),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn message(role: ChatCompletionMessageRole, content: &str) -> ChatCompletionMessage {
        ChatCompletionMessage {
            role,
            content: Some(content.to_string()),
            name: None,
            function_call: None,
            tool_call_id: None,
            tool_calls: None,
        }
    }
}

#[async_trait]
impl GenerationBackend for OpenAiBackend {
    async fn complete(
        &self,
        system_prompt: &str,
        history: &[MemoryMessage],
        input: &str,
    ) -> Result<String> {
        let start_time = Instant::now();
        debug!(
            "Building OpenAI request | Model: {} | History messages: {} | Input: '{}'",
            self.model,
            history.len(),
            preview(input, 100)
        );

        let mut messages = vec![Self::message(ChatCompletionMessageRole::System, system_prompt)];
        for entry in history {
            let role = match entry.role {
                Role::User => ChatCompletionMessageRole::User,
                Role::Assistant => ChatCompletionMessageRole::Assistant,
            };
            messages.push(Self::message(role, &entry.content));
        }
        messages.push(Self::message(ChatCompletionMessageRole::User, input));

        let completion = timeout(
            self.request_timeout,
            ChatCompletion::builder(&self.model, messages)
                .temperature(self.temperature)
                .create(),
        )
        .await
        .map_err(|_| {
            error!("OpenAI request timed out after {:?}", start_time.elapsed());
            anyhow::anyhow!(
                "OpenAI request timed out after {} seconds",
                self.request_timeout.as_secs()
            )
        })?
        .map_err(|e| anyhow::anyhow!("OpenAI API error: {}", e))?;

        let response = completion
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_ref())
            .ok_or_else(|| anyhow::anyhow!("No response from OpenAI"))?
            .trim()
            .to_string();

        info!(
            "OpenAI response received after {:?} | Length: {} chars",
            start_time.elapsed(),
            response.len()
        );
        Ok(response)
    }
}
