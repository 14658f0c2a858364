// ABOUTME: Language model layer shared by the intake conversation and plan generation
// ABOUTME: Message and request types, capability flags, and the provider trait
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Language Models
//!
//! Two kinds of calls go through this layer: coach turns (free text, warm
//! temperature, short replies) and plan calls (cooler temperature,
//! constrained to a JSON object). Both are a [`ChatRequest`] handed to an
//! [`LlmProvider`], which is always injected as `Arc<dyn LlmProvider>`.
//!
//! ```rust,no_run
//! use fitvoice_server::llm::{ChatMessage, ChatRequest, LlmProvider, ResponseFormat};
//!
//! async fn diet_call(llm: &dyn LlmProvider) {
//!     let request = ChatRequest::new(vec![ChatMessage::user("Create a diet plan ...")])
//!         .with_temperature(0.4)
//!         .with_response_format(ResponseFormat::JsonObject);
//!     let _reply = llm.complete(&request).await;
//! }
//! ```

mod gemini;
mod openai_compatible;
pub mod prompts;
mod provider;

pub use gemini::GeminiProvider;
pub use openai_compatible::{
    OpenAiCompatibleConfig, OpenAiCompatibleProvider, DEFAULT_LOCAL_BASE_URL,
};
pub use provider::{ChatProvider, LlmProviderType};

use async_trait::async_trait;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

// ============================================================================
// Capabilities
// ============================================================================

bitflags! {
    /// What a backend can do beyond plain chat
    ///
    /// Without `JSON_MODE` plan calls still go out, and the prompt alone asks
    /// for JSON.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct LlmCapabilities: u8 {
        /// Output can be constrained to a JSON object
        const JSON_MODE = 0b0000_0001;
        /// A separate system instruction is honoured
        const SYSTEM_MESSAGES = 0b0000_0010;
    }
}

impl LlmCapabilities {
    /// Every hosted backend we ship supports both
    #[must_use]
    pub const fn full_featured() -> Self {
        Self::JSON_MODE.union(Self::SYSTEM_MESSAGES)
    }

    /// Whether plan calls can request a JSON object
    #[must_use]
    pub const fn supports_json_mode(&self) -> bool {
        self.contains(Self::JSON_MODE)
    }
}

// ============================================================================
// Messages
// ============================================================================

/// Speaker of a message, serialized lowercase
///
/// Callers of the chat endpoint may only send `user` and `assistant`; the
/// controller adds the single `system` message itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Coaching instructions
    System,
    /// The person being interviewed
    User,
    /// The coach
    Assistant,
}

/// One entry of the conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who spoke
    pub role: MessageRole,
    /// What was said
    pub content: String,
}

impl ChatMessage {
    /// Message with an explicit role
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Coaching instructions
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Words from the person being interviewed
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Words from the coach
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

// ============================================================================
// Requests and replies
// ============================================================================

/// Output constraint for a completion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Free-form text (coach turns)
    #[default]
    Text,
    /// A single JSON object (plan calls)
    JsonObject,
}

/// A completion request; unset knobs use the provider's defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Full context, oldest first
    pub messages: Vec<ChatMessage>,
    /// Provider-specific model name
    pub model: Option<String>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Reply length cap
    pub max_tokens: Option<u32>,
    /// Text or JSON object
    #[serde(default)]
    pub response_format: ResponseFormat,
}

impl ChatRequest {
    /// Request over `messages` with every knob unset
    #[must_use]
    pub const fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: None,
            temperature: None,
            max_tokens: None,
            response_format: ResponseFormat::Text,
        }
    }

    /// Pin a model; `None` keeps the provider default
    #[must_use]
    pub fn with_optional_model(mut self, model: Option<&str>) -> Self {
        if let Some(model) = model {
            self.model = Some(model.to_owned());
        }
        self
    }

    /// Sampling temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Reply length cap
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Ask for text or a JSON object
    #[must_use]
    pub const fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }
}

/// Finish reasons meaning the output hit the token limit (`OpenAI`, Gemini)
const TRUNCATION_REASONS: &[&str] = &["length", "MAX_TOKENS"];

/// A completed model reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Reply text
    pub content: String,
    /// Model that answered
    pub model: String,
    /// Token accounting, when the provider reports it
    pub usage: Option<TokenUsage>,
    /// Provider's stop reason
    pub finish_reason: Option<String>,
}

impl ChatResponse {
    /// Whether generation stopped at the token limit
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.finish_reason
            .as_deref()
            .is_some_and(|reason| TRUNCATION_REASONS.contains(&reason))
    }

    /// Total tokens billed for the call, if reported
    #[must_use]
    pub fn total_tokens(&self) -> Option<u32> {
        self.usage.as_ref().map(|u| u.total_tokens)
    }
}

/// Token counts for one call
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Prompt side
    pub prompt_tokens: u32,
    /// Reply side
    pub completion_tokens: u32,
    /// Sum of both
    pub total_tokens: u32,
}

// ============================================================================
// Provider contract
// ============================================================================

/// A chat completion backend
///
/// Implementations map transport and status failures onto `ErrorCode`s so
/// routes can report them without knowing which backend answered.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short identifier for logs, e.g. `openai`, `gemini`, `ollama`
    fn name(&self) -> &'static str;

    /// Name shown to operators
    fn display_name(&self) -> &'static str;

    /// Optional features this backend supports
    fn capabilities(&self) -> LlmCapabilities;

    /// Model used when a request does not pin one
    fn default_model(&self) -> &str;

    /// Run one completion
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError>;

    /// Whether the backend answers and accepts the configured key
    async fn health_check(&self) -> Result<bool, AppError>;
}
