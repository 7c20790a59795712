use thiserror::Error;

use crate::message::Message;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("response contained no text")]
    EmptyResponse,

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// One chat-completion call.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(model: &str, messages: Vec<Message>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            model: model.to_string(),
            messages,
            temperature,
            max_tokens,
        }
    }

    pub fn validate(&self) -> Result<(), CompletionError> {
        if self.messages.is_empty() {
            return Err(CompletionError::InvalidRequest("no messages".into()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(CompletionError::InvalidRequest(format!(
                "temperature {} outside [0, 2]",
                self.temperature
            )));
        }
        Ok(())
    }
}

/// A blocking chat-completion backend.
pub trait ChatModel {
    fn try_complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;

    /// Call boundary: failures are logged and collapsed into `None`.
    fn complete(&self, request: &CompletionRequest) -> Option<String> {
        let result = request.validate().and_then(|()| self.try_complete(request));
        match result {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(model = %request.model, "completion failed: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Fixed {
        reply: Result<&'static str, ()>,
        calls: Cell<usize>,
    }

    impl ChatModel for Fixed {
        fn try_complete(&self, _request: &CompletionRequest) -> Result<String, CompletionError> {
            self.calls.set(self.calls.get() + 1);
            self.reply
                .map(str::to_string)
                .map_err(|()| CompletionError::RateLimited("slow down".into()))
        }
    }

    fn request(temperature: f32) -> CompletionRequest {
        CompletionRequest::new("m", vec![Message::user("hi")], temperature, 10)
    }

    #[test]
    fn test_complete_success() {
        let model = Fixed { reply: Ok("hello"), calls: Cell::new(0) };
        assert_eq!(model.complete(&request(0.7)).as_deref(), Some("hello"));
    }

    #[test]
    fn test_complete_collapses_errors() {
        let model = Fixed { reply: Err(()), calls: Cell::new(0) };
        assert!(model.complete(&request(0.7)).is_none());
        assert_eq!(model.calls.get(), 1);
    }

    #[test]
    fn test_invalid_request_never_sent() {
        let model = Fixed { reply: Ok("hello"), calls: Cell::new(0) };
        assert!(model.complete(&request(2.5)).is_none());
        let empty = CompletionRequest::new("m", Vec::new(), 0.5, 10);
        assert!(model.complete(&empty).is_none());
        assert_eq!(model.calls.get(), 0);
    }
}
