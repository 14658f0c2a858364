// ABOUTME: Google Gemini LLM provider implementation
// ABOUTME: Maps chat requests onto generateContent with system instruction and JSON MIME mode
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Gemini Provider
//!
//! System messages are lifted into `system_instruction`; assistant turns are
//! sent with Gemini's `model` role. Plan calls set
//! `generationConfig.responseMimeType = "application/json"`.

use std::fmt::{Debug, Formatter, Result as FmtResult};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::{
    ChatMessage, ChatRequest, ChatResponse, LlmCapabilities, LlmProvider, MessageRole,
    ResponseFormat, TokenUsage,
};
use crate::errors::{AppError, ErrorCode};

const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const SERVICE_NAME: &str = "Gemini";

// ============================================================================
// Wire format
// ============================================================================

#[derive(Serialize)]
struct GenerateBody<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    candidate_count: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateReply {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    error: Option<ReplyError>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

impl From<UsageMetadata> for TokenUsage {
    fn from(usage: UsageMetadata) -> Self {
        Self {
            prompt_tokens: usage.prompt_token_count,
            completion_tokens: usage.candidates_token_count,
            total_tokens: usage.total_token_count,
        }
    }
}

#[derive(Deserialize)]
struct ReplyError {
    message: String,
}

// ============================================================================
// Provider
// ============================================================================

/// Google Gemini LLM provider
pub struct GeminiProvider {
    api_key: String,
    client: Client,
}

impl GeminiProvider {
    /// Create a provider for `api_key`
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
        }
    }

    fn model_url(&self, model: &str) -> String {
        format!("{API_BASE_URL}/models/{model}:generateContent?key={}", self.api_key)
    }

    fn body(request: &ChatRequest) -> GenerateBody<'_> {
        let (system, turns): (Vec<&ChatMessage>, Vec<&ChatMessage>) = request
            .messages
            .iter()
            .partition(|m| m.role == MessageRole::System);

        let contents = turns
            .into_iter()
            .map(|m| Content {
                role: Some(match m.role {
                    MessageRole::Assistant => "model",
                    MessageRole::System | MessageRole::User => "user",
                }),
                parts: vec![Part { text: &m.content }],
            })
            .collect();

        let system_instruction = (!system.is_empty()).then(|| Content {
            role: None,
            parts: system.into_iter().map(|m| Part { text: &m.content }).collect(),
        });

        GenerateBody {
            contents,
            system_instruction,
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
                response_mime_type: (request.response_format == ResponseFormat::JsonObject)
                    .then_some("application/json"),
                candidate_count: 1,
            },
        }
    }

    /// Concatenated text of the first candidate and its finish reason
    fn first_candidate(reply: &GenerateReply) -> Result<(String, Option<String>), AppError> {
        let candidate = reply
            .candidates
            .first()
            .ok_or_else(|| AppError::external_service(SERVICE_NAME, "No content in response"))?;
        let text = candidate
            .content
            .iter()
            .flat_map(|c| &c.parts)
            .map(|p| p.text.as_str())
            .collect();
        Ok((text, candidate.finish_reason.clone()))
    }

    fn status_error(status: StatusCode, body: &str) -> AppError {
        let message = serde_json::from_str::<GenerateReply>(body)
            .ok()
            .and_then(|r| r.error)
            .map_or_else(|| body.to_owned(), |e| e.message);

        match status {
            StatusCode::TOO_MANY_REQUESTS => AppError::new(
                ErrorCode::ExternalRateLimited,
                "AI service quota exceeded. Please wait a moment and try again.",
            ),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::new(
                ErrorCode::ExternalAuthFailed,
                format!("Gemini authentication failed: {message}"),
            ),
            _ => AppError::external_service(SERVICE_NAME, format!("API error ({status}): {message}")),
        }
    }

    fn unreachable(e: &reqwest::Error) -> AppError {
        error!(error = %e, "Gemini request failed");
        AppError::new(
            ErrorCode::ExternalServiceUnavailable,
            format!("Gemini request failed: {e}"),
        )
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn display_name(&self) -> &'static str {
        "Google Gemini"
    }

    fn capabilities(&self) -> LlmCapabilities {
        LlmCapabilities::full_featured()
    }

    fn default_model(&self) -> &str {
        DEFAULT_MODEL
    }

    #[instrument(skip(self, request), fields(llm.provider = "gemini", json_mode = request.response_format == ResponseFormat::JsonObject))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let model = request.model.as_deref().unwrap_or(DEFAULT_MODEL);
        debug!(model, messages = request.messages.len(), "Sending generateContent");

        let response = self
            .client
            .post(self.model_url(model))
            .json(&Self::body(request))
            .send()
            .await
            .map_err(|e| Self::unreachable(&e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| Self::unreachable(&e))?;
        if !status.is_success() {
            return Err(Self::status_error(status, &text));
        }

        let reply: GenerateReply = serde_json::from_str(&text).map_err(|e| {
            AppError::external_service(SERVICE_NAME, format!("Unexpected response body: {e}"))
        })?;
        if let Some(err) = reply.error {
            return Err(AppError::external_service(SERVICE_NAME, err.message));
        }

        let (content, finish_reason) = Self::first_candidate(&reply)?;
        Ok(ChatResponse {
            content,
            model: model.to_owned(),
            usage: reply.usage_metadata.map(TokenUsage::from),
            finish_reason,
        })
    }

    #[instrument(skip(self), fields(llm.provider = "gemini"))]
    async fn health_check(&self) -> Result<bool, AppError> {
        let response = self
            .client
            .get(format!("{API_BASE_URL}/models?key={}", self.api_key))
            .send()
            .await
            .map_err(|e| Self::unreachable(&e))?;

        Ok(response.status().is_success())
    }
}

impl Debug for GeminiProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GeminiProvider")
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_messages_become_instruction() {
        let request = ChatRequest::new(vec![
            ChatMessage::system("You are a coach."),
            ChatMessage::assistant("Hey Sam!"),
            ChatMessage::user("I'm 30"),
        ])
        .with_temperature(0.7)
        .with_max_tokens(300);

        let body = serde_json::to_value(GeminiProvider::body(&request)).unwrap();
        assert_eq!(body["system_instruction"]["parts"][0]["text"], "You are a coach.");
        assert_eq!(body["contents"].as_array().unwrap().len(), 2);
        assert_eq!(body["contents"][0]["role"], "model");
        assert_eq!(body["contents"][1]["role"], "user");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 300);
        assert!(body["generationConfig"].get("responseMimeType").is_none());
    }

    #[test]
    fn test_json_mode_sets_mime_type() {
        let request = ChatRequest::new(vec![ChatMessage::user("diet")])
            .with_response_format(ResponseFormat::JsonObject);
        let body = serde_json::to_value(GeminiProvider::body(&request)).unwrap();
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert!(body.get("system_instruction").is_none());
    }

    #[test]
    fn test_candidate_parts_are_joined() {
        let raw = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"{\"a\":"},{"text":"1}"}]},"finishReason":"MAX_TOKENS"}],"usageMetadata":{"totalTokenCount":9}}"#;
        let reply: GenerateReply = serde_json::from_str(raw).unwrap();
        let (text, finish) = GeminiProvider::first_candidate(&reply).unwrap();
        assert_eq!(text, "{\"a\":1}");
        assert_eq!(finish.as_deref(), Some("MAX_TOKENS"));
    }

    #[test]
    fn test_quota_maps_to_rate_limited() {
        let err = GeminiProvider::status_error(StatusCode::TOO_MANY_REQUESTS, "{}");
        assert_eq!(err.code, ErrorCode::ExternalRateLimited);
    }

    #[test]
    fn test_debug_redacts_key() {
        let provider = GeminiProvider::new("secret-key");
        assert!(!format!("{provider:?}").contains("secret-key"));
    }
}
