use std::time::Duration;

use tracing::debug;

use prefbench_core::{ChatModel, CompletionError, CompletionRequest};

use crate::protocol::{status_error, ChatRequest, ChatResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Blocking client for an OpenAI-compatible `/chat/completions` endpoint.
/// One request per call, no retries.
pub struct OpenAiClient {
    agent: ureq::Agent,
    endpoint: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(base_url: &str, api_key: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ChatModel for OpenAiClient {
    fn try_complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            temperature = request.temperature,
            "POST {}",
            self.endpoint
        );

        let response = self
            .agent
            .post(&self.endpoint)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(ChatRequest::from(request));

        match response {
            Ok(resp) => {
                let body: ChatResponse = resp
                    .into_json()
                    .map_err(|e| CompletionError::Decode(e.to_string()))?;
                body.into_text()
            }
            Err(ureq::Error::Status(status, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                Err(status_error(status, &body))
            }
            Err(ureq::Error::Transport(t)) => Err(CompletionError::Transport(t.to_string())),
        }
    }
}
