// ABOUTME: Turn-based intake conversation driven by an LLM with a fixed coaching prompt
// ABOUTME: Returns the canonical greeting for empty history and detects the completion block
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Conversation Controller
//!
//! Each turn sends the intake system prompt, the canonical greeting as an
//! assistant turn, and the caller's full history. The reply is scanned for the
//! completion block; the block never reaches the caller's text.
//!
//! When the block is present but unreadable, one corrective follow-up call asks
//! the model to re-emit it. If that also fails the turn is reported as not
//! complete so the conversation can continue instead of dead-ending.

mod completion;

pub use completion::{scan_reply, Completion, ScannedReply};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn, Span};

use crate::constants::conversation::{CHAT_MAX_TOKENS, CHAT_TEMPERATURE, FALLBACK_USER_NAME};
use crate::errors::AppResult;
use crate::llm::prompts::{intake_system_prompt, COMPLETION_REPAIR_PROMPT};
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};
use crate::models::CollectedUserData;

/// Result of one intake turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutcome {
    /// Reply text with any completion block removed
    pub response: String,
    /// Whether all eight data points were collected
    pub is_complete: bool,
    /// Extracted intake data when complete
    pub user_data: Option<CollectedUserData>,
}

/// The deterministic first line of every conversation
#[must_use]
pub fn greeting(user_name: &str) -> String {
    format!(
        "Hey {user_name}! Great to have you here! I'm excited to help you create a personalized fitness program. Let's start with the basics — how old are you?"
    )
}

/// Name to address the user by, falling back when none is known
#[must_use]
pub fn display_name(first_name: Option<&str>) -> &str {
    match first_name.map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => FALLBACK_USER_NAME,
    }
}

/// Drives intake turns against a language model
#[derive(Clone)]
pub struct ConversationController {
    llm: Arc<dyn LlmProvider>,
    model: Option<String>,
}

impl ConversationController {
    /// Create a controller using `llm`, optionally pinning a model
    #[must_use]
    pub fn new(llm: Arc<dyn LlmProvider>, model: Option<String>) -> Self {
        Self { llm, model }
    }

    /// Advance the conversation by one turn.
    ///
    /// An empty history yields the greeting without calling the model.
    ///
    /// # Errors
    ///
    /// Returns the provider's error when the main model call fails. The
    /// caller's history is never modified.
    #[instrument(skip(self, history, user_name), fields(turn.messages = history.len(), turn.complete))]
    pub async fn advance_turn(
        &self,
        history: &[ChatMessage],
        user_name: &str,
    ) -> AppResult<TurnOutcome> {
        if history.is_empty() {
            debug!("Empty history, returning greeting");
            Span::current().record("turn.complete", false);
            return Ok(TurnOutcome {
                response: greeting(user_name),
                is_complete: false,
                user_data: None,
            });
        }

        let messages = Self::build_messages(history, user_name);
        let reply = self.llm.complete(&self.request(messages.clone())).await?;
        debug!(tokens = ?reply.total_tokens(), finish_reason = ?reply.finish_reason, "Coach reply received");
        let scanned = scan_reply(&reply.content);

        let user_data = match scanned.completion {
            Completion::Absent => None,
            Completion::Parsed(data) => Some(data),
            Completion::Malformed => self.repair_completion(messages, &reply.content).await,
        };

        let is_complete = user_data.is_some();
        Span::current().record("turn.complete", is_complete);
        if is_complete {
            info!("Intake conversation complete");
        }

        Ok(TurnOutcome {
            response: scanned.text,
            is_complete,
            user_data,
        })
    }

    /// System prompt, canonical greeting, then the caller's history verbatim
    #[must_use]
    pub fn build_messages(history: &[ChatMessage], user_name: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(intake_system_prompt(user_name)));
        messages.push(ChatMessage::assistant(greeting(user_name)));
        messages.extend_from_slice(history);
        messages
    }

    fn request(&self, messages: Vec<ChatMessage>) -> ChatRequest {
        ChatRequest::new(messages)
            .with_optional_model(self.model.as_deref())
            .with_temperature(CHAT_TEMPERATURE)
            .with_max_tokens(CHAT_MAX_TOKENS)
    }

    /// Ask the model once to re-emit an unreadable completion block
    async fn repair_completion(
        &self,
        mut messages: Vec<ChatMessage>,
        raw_reply: &str,
    ) -> Option<CollectedUserData> {
        warn!("Completion block unreadable, requesting corrected block");
        messages.push(ChatMessage::assistant(raw_reply));
        messages.push(ChatMessage::user(COMPLETION_REPAIR_PROMPT));

        match self.llm.complete(&self.request(messages)).await {
            Ok(retry) => match scan_reply(&retry.content).completion {
                Completion::Parsed(data) => Some(data),
                Completion::Absent | Completion::Malformed => {
                    warn!("Corrected completion block still unreadable, continuing conversation");
                    None
                }
            },
            Err(e) => {
                warn!(error = %e, "Completion repair call failed, continuing conversation");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MessageRole;

    #[test]
    fn test_greeting_is_personalised() {
        let text = greeting("Maya");
        assert!(text.starts_with("Hey Maya! Great to have you here!"));
        assert!(text.ends_with("Let's start with the basics — how old are you?"));
        assert!(text.contains("create a personalized fitness program"));
    }

    #[test]
    fn test_display_name_fallback() {
        assert_eq!(display_name(Some("Ravi")), "Ravi");
        assert_eq!(display_name(Some("  ")), "There");
        assert_eq!(display_name(None), "There");
    }

    #[test]
    fn test_message_layout() {
        let history = vec![
            ChatMessage::user("I'm 28"),
            ChatMessage::assistant("Nice! How tall are you?"),
            ChatMessage::user("5 foot 6"),
        ];
        let messages = ConversationController::build_messages(&history, "Lee");

        assert_eq!(messages.len(), 5);
        assert_eq!(messages[0].role, MessageRole::System);
        assert!(messages[0].content.ends_with("The user's name is: Lee."));
        assert_eq!(messages[1], ChatMessage::assistant(greeting("Lee")));
        assert_eq!(&messages[2..], history.as_slice());
    }
}
