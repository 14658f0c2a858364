// ABOUTME: Scripted LLM provider replaying queued replies for deterministic tests
// ABOUTME: Records every request so tests can assert on prompts, temperature, and format

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use fitvoice_server::errors::{AppError, ErrorCode};
use fitvoice_server::llm::{ChatRequest, ChatResponse, LlmCapabilities, LlmProvider};

/// Replays queued replies in order; errors once the script runs out
#[derive(Default)]
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<Result<String, AppError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply
    pub fn reply(self, content: impl Into<String>) -> Self {
        self.replies.lock().unwrap().push_back(Ok(content.into()));
        self
    }

    /// Queue a provider failure
    pub fn fail(self, code: ErrorCode, message: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(AppError::new(code, message)));
        self
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of model calls made
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn display_name(&self) -> &'static str {
        "Scripted Test Provider"
    }

    fn capabilities(&self) -> LlmCapabilities {
        LlmCapabilities::full_featured()
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.replies.lock().unwrap().pop_front();
        let content = next.unwrap_or_else(|| {
            Err(AppError::new(
                ErrorCode::ExternalServiceError,
                "No scripted reply left",
            ))
        })?;

        Ok(ChatResponse {
            content,
            model: "scripted-model".to_owned(),
            usage: None,
            finish_reason: Some("stop".to_owned()),
        })
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        Ok(true)
    }
}
