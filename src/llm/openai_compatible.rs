// ABOUTME: OpenAI chat-completions provider for the hosted API and compatible local servers
// ABOUTME: Sends coach turns as plain chat and plan calls with response_format json_object
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # `OpenAI`-Compatible Provider
//!
//! Any endpoint speaking `POST {base}/chat/completions` works: the hosted
//! `OpenAI` API (default), Ollama, vLLM or `LocalAI`. Our `ChatMessage`
//! already serializes as `{role, content}` with lowercase roles, so messages go
//! on the wire without conversion.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use super::{ChatMessage, ChatRequest, ChatResponse, LlmCapabilities, LlmProvider, ResponseFormat, TokenUsage};
use crate::errors::{AppError, ErrorCode};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Ollama's default `OpenAI`-compatible endpoint
pub const DEFAULT_LOCAL_BASE_URL: &str = "http://localhost:11434/v1";

const DEFAULT_LOCAL_MODEL: &str = "qwen2.5:14b-instruct";

const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Plan calls on local hardware can take minutes
const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Error bodies are cut to this many characters in messages
const ERROR_BODY_PREVIEW: usize = 200;

// ============================================================================
// Wire format
// ============================================================================

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<JsonObjectFormat>,
}

#[derive(Serialize)]
struct JsonObjectFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct CompletionReply {
    model: String,
    choices: Vec<ReplyChoice>,
    usage: Option<TokenUsage>,
}

#[derive(Deserialize)]
struct ReplyChoice {
    message: ReplyMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

// ============================================================================
// Configuration
// ============================================================================

/// Endpoint settings for an `OpenAI`-compatible backend
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleConfig {
    /// Base URL without the `/chat/completions` suffix
    pub base_url: String,
    /// Bearer token; local servers usually run without one
    pub api_key: Option<String>,
    /// Model used when a request does not pin one
    pub default_model: String,
    /// Short name for logs
    pub provider_name: &'static str,
    /// Human-readable name for logs and errors
    pub display_name: &'static str,
}

impl OpenAiCompatibleConfig {
    /// Hosted `OpenAI`
    #[must_use]
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            base_url: OPENAI_BASE_URL.to_owned(),
            api_key: Some(api_key.into()),
            default_model: OPENAI_DEFAULT_MODEL.to_owned(),
            provider_name: "openai",
            display_name: "OpenAI",
        }
    }

    /// A local server; the backend name is guessed from its usual port
    #[must_use]
    pub fn local(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let base_url = base_url.into();
        let (provider_name, display_name) = match base_url.as_str() {
            url if url.contains(":11434") => ("ollama", "Ollama (Local)"),
            url if url.contains(":8000") => ("vllm", "vLLM (Local)"),
            url if url.contains(":8080") => ("localai", "LocalAI"),
            _ => ("local", "Local LLM"),
        };

        Self {
            base_url,
            api_key: api_key.filter(|k| !k.is_empty()),
            default_model: DEFAULT_LOCAL_MODEL.to_owned(),
            provider_name,
            display_name,
        }
    }
}

// ============================================================================
// Provider
// ============================================================================

/// Chat completions over an `OpenAI`-compatible HTTP API
pub struct OpenAiCompatibleProvider {
    client: Client,
    config: OpenAiCompatibleConfig,
}

impl OpenAiCompatibleProvider {
    /// Build the HTTP client for `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: OpenAiCompatibleConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        info!(
            llm.provider = config.provider_name,
            base_url = %config.base_url,
            model = %config.default_model,
            "LLM backend configured"
        );

        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    fn body<'a>(&'a self, request: &'a ChatRequest) -> CompletionBody<'a> {
        CompletionBody {
            model: request
                .model
                .as_deref()
                .unwrap_or(&self.config.default_model),
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: (request.response_format == ResponseFormat::JsonObject)
                .then_some(JsonObjectFormat { kind: "json_object" }),
        }
    }

    /// Map a non-success status to the error the routes report
    fn status_error(&self, status: StatusCode, body: &str) -> AppError {
        let service = self.config.display_name;
        let Ok(ErrorEnvelope { error }) = serde_json::from_str::<ErrorEnvelope>(body) else {
            let preview: String = body.chars().take(ERROR_BODY_PREVIEW).collect();
            return if status.is_server_error() && status != StatusCode::INTERNAL_SERVER_ERROR {
                AppError::new(
                    ErrorCode::ExternalServiceUnavailable,
                    format!("{service} is not responding ({status})"),
                )
            } else {
                AppError::external_service(service, format!("API error ({status}): {preview}"))
            };
        };

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::new(
                ErrorCode::ExternalAuthFailed,
                format!("{service} authentication failed: {}", error.message),
            ),
            StatusCode::TOO_MANY_REQUESTS => AppError::new(
                ErrorCode::ExternalRateLimited,
                "LLM rate limit reached. Please wait a moment and try again.",
            ),
            StatusCode::NOT_FOUND => AppError::external_service(
                service,
                format!("Model or endpoint not found: {}", error.message),
            ),
            _ => AppError::external_service(
                service,
                format!(
                    "{} - {}",
                    error.kind.as_deref().unwrap_or("unknown"),
                    error.message
                ),
            ),
        }
    }

    fn transport_error(&self, e: &reqwest::Error) -> AppError {
        error!(llm.provider = self.config.provider_name, error = %e, "LLM request failed");
        if e.is_connect() || e.is_timeout() {
            AppError::new(
                ErrorCode::ExternalServiceUnavailable,
                format!(
                    "Cannot reach {} at {}",
                    self.config.display_name, self.config.base_url
                ),
            )
        } else {
            AppError::external_service(self.config.display_name, e.to_string())
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &'static str {
        self.config.provider_name
    }

    fn display_name(&self) -> &'static str {
        self.config.display_name
    }

    fn capabilities(&self) -> LlmCapabilities {
        LlmCapabilities::full_featured()
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip(self, request), fields(llm.provider = self.config.provider_name, json_mode = request.response_format == ResponseFormat::JsonObject))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let body = self.body(request);
        debug!(model = body.model, messages = body.messages.len(), "Sending chat completion");

        let response = self
            .authorized(self.client.post(self.endpoint("chat/completions")))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(&e))?;
        if !status.is_success() {
            return Err(self.status_error(status, &text));
        }

        let reply: CompletionReply = serde_json::from_str(&text).map_err(|e| {
            AppError::external_service(
                self.config.display_name,
                format!("Unexpected response body: {e}"),
            )
        })?;

        let choice = reply.choices.into_iter().next().ok_or_else(|| {
            AppError::external_service(self.config.display_name, "API returned no choices")
        })?;

        Ok(ChatResponse {
            content: choice.message.content.unwrap_or_default(),
            model: reply.model,
            usage: reply.usage,
            finish_reason: choice.finish_reason,
        })
    }

    #[instrument(skip(self), fields(llm.provider = self.config.provider_name))]
    async fn health_check(&self) -> Result<bool, AppError> {
        let response = self
            .authorized(self.client.get(self.endpoint("models")))
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let healthy = response.status().is_success();
        if !healthy {
            warn!(status = %response.status(), "LLM health check failed");
        }
        Ok(healthy)
    }
}
