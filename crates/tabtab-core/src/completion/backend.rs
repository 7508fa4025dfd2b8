use std::time::Duration;

use serde::Deserialize;
use ureq::Agent;

use super::CompletionError;
use crate::settings::CompletionSettings;

/// Transport seam for the completion service. The gateway only needs "prompt
/// in, raw reply text out"; tests substitute a canned implementation.
pub trait CompletionBackend: Send + 'static {
    fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// Ollama chat backend (`POST /api/chat`, non-streaming).
pub struct OllamaBackend {
    agent: Agent,
    endpoint: String,
    model: String,
}

#[derive(Deserialize)]
struct ChatReply {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

impl OllamaBackend {
    pub fn new(settings: &CompletionSettings) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(Duration::from_millis(settings.timeout_ms)))
            .build();
        Self {
            agent: config.into(),
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
        }
    }
}

impl CompletionBackend for OllamaBackend {
    fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let url = format!("{}/api/chat", self.endpoint);
        let body = serde_json::json!({
            "model": self.model,
            "stream": false,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let mut response = self
            .agent
            .post(&url)
            .send_json(&body)
            .map_err(|e| CompletionError::Transport(e.to_string()))?;
        let reply: ChatReply = response
            .body_mut()
            .read_json()
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        Ok(reply.message.content)
    }
}
