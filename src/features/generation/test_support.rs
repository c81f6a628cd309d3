//! Scripted backend for tests

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;

use super::backend::GenerationBackend;
use super::memory::MemoryMessage;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system_prompt: String,
    pub history: Vec<MemoryMessage>,
    pub input: String,
}

enum Script {
    /// Replies "reply {n}" with a 1-based call counter
    Echo,
    /// Returns the queued replies in order, then falls back to Echo
    Queue(Mutex<Vec<String>>),
    Fail(String),
    /// Never answers
    Stall,
}

pub struct ScriptedBackend {
    script: Script,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedBackend {
    pub fn echo() -> Self {
        Self {
            script: Script::Echo,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn replies(replies: &[&str]) -> Self {
        let mut queued: Vec<String> = replies.iter().map(|r| r.to_string()).collect();
        queued.reverse();
        Self {
            script: Script::Queue(Mutex::new(queued)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            script: Script::Fail(reason.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn stalled() -> Self {
        Self {
            script: Script::Stall,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn complete(
        &self,
        system_prompt: &str,
        history: &[MemoryMessage],
        input: &str,
    ) -> Result<String> {
        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(RecordedCall {
                system_prompt: system_prompt.to_string(),
                history: history.to_vec(),
                input: input.to_string(),
            });
            calls.len()
        };

        match &self.script {
            Script::Echo => Ok(format!("reply {call_number}")),
            Script::Queue(queue) => Ok(queue
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| format!("reply {call_number}"))),
            Script::Fail(reason) => Err(anyhow::anyhow!("{reason}")),
            Script::Stall => std::future::pending().await,
        }
    }
}
