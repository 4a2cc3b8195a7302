//! Generator capability
//!
//! The clarification workflow sees text generation as one function:
//! `generate(system_prompt, input) -> text`. Backends implement `Generator`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::llm::{CompletionRequest, LlmClient, LlmError, Message};

/// Opaque text generation
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate text from a system prompt and a structured input
    async fn generate(&self, system_prompt: &str, input: &Value) -> Result<String, LlmError>;
}

/// Generator backed by an LLM client
pub struct LlmGenerator {
    client: Arc<dyn LlmClient>,
    max_tokens: u32,
}

impl LlmGenerator {
    pub fn new(client: Arc<dyn LlmClient>, max_tokens: u32) -> Self {
        Self { client, max_tokens }
    }
}

#[async_trait]
impl Generator for LlmGenerator {
    async fn generate(&self, system_prompt: &str, input: &Value) -> Result<String, LlmError> {
        debug!(max_tokens = self.max_tokens, "LlmGenerator::generate: called");
        let request = CompletionRequest {
            system_prompt: system_prompt.to_string(),
            messages: vec![Message::user(serde_json::to_string(input)?)],
            max_tokens: self.max_tokens,
        };
        let response = self.client.complete(request).await?;
        Ok(response.content.unwrap_or_default())
    }
}

/// One recorded call to a `ScriptedGenerator`
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorCall {
    pub system_prompt: String,
    pub input: Value,
}

/// Generator returning queued results in order, recording every call
///
/// Used by tests and offline demos. An exhausted queue yields an
/// `InvalidResponse` error.
#[derive(Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
    calls: Mutex<Vec<GeneratorCall>>,
}

fn locked<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response
    pub fn with_text(self, text: impl Into<String>) -> Self {
        locked(&self.responses).push_back(Ok(text.into()));
        self
    }

    /// Queue a failed call
    pub fn with_error(self, err: LlmError) -> Self {
        locked(&self.responses).push_back(Err(err));
        self
    }

    pub fn calls(&self) -> Vec<GeneratorCall> {
        locked(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        locked(&self.calls).len()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, system_prompt: &str, input: &Value) -> Result<String, LlmError> {
        debug!("ScriptedGenerator::generate: called");
        locked(&self.calls).push(GeneratorCall {
            system_prompt: system_prompt.to_string(),
            input: input.clone(),
        });
        locked(&self.responses).pop_front().unwrap_or_else(|| {
            debug!("ScriptedGenerator::generate: queue exhausted");
            Err(LlmError::InvalidResponse("No scripted response left".to_string()))
        })
    }
}
