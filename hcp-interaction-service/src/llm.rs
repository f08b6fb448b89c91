//! LLM provider access via rig-core.
//!
//! Handlers and tasks talk to the model through [`ChatModel`] so tests can swap in
//! canned responses. [`GroqChatModel`] is the production implementation.

use async_trait::async_trait;
use rig::{client::CompletionClient, completion::Prompt, providers::groq};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

/// Minimal interface the service needs from a language model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send `message` as-is and return the model's reply.
    async fn complete(&self, message: &str) -> anyhow::Result<String>;

    /// Ask for a single JSON object, steered by `preamble` as the system prompt.
    async fn complete_json(&self, preamble: &str, prompt: &str) -> anyhow::Result<String>;
}

/// Groq-hosted model, called with temperature 0.
pub struct GroqChatModel {
    client: groq::Client,
    model: String,
}

impl GroqChatModel {
    pub fn new(api_key: &SecretString, model: impl Into<String>) -> Self {
        Self {
            client: groq::Client::new(api_key.expose_secret()),
            model: model.into(),
        }
    }
}

#[async_trait]
impl ChatModel for GroqChatModel {
    async fn complete(&self, message: &str) -> anyhow::Result<String> {
        debug!(model = %self.model, "sending free-form prompt");
        let agent = self.client.agent(&self.model).temperature(0.0).build();
        let response = agent.prompt(message).await?;
        Ok(response)
    }

    async fn complete_json(&self, preamble: &str, prompt: &str) -> anyhow::Result<String> {
        debug!(model = %self.model, "sending json-mode prompt");
        let agent = self
            .client
            .agent(&self.model)
            .preamble(preamble)
            .temperature(0.0)
            .additional_params(json!({ "response_format": { "type": "json_object" } }))
            .build();
        let response = agent.prompt(prompt).await?;
        Ok(response)
    }
}
