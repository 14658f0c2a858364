// ABOUTME: Chat turn route handler for the voice intake conversation
// ABOUTME: Accepts the running message history and returns the next coach reply
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Chat turn route
//!
//! The client owns the history and sends all of it on every turn. An empty
//! history returns the greeting without a model call.

use std::sync::Arc;

use axum::extract::{rejection::JsonRejection, State};
use axum::{routing::post, Json, Router};
use serde::Deserialize;
use tracing::info;

use crate::conversation::{display_name, TurnOutcome};
use crate::errors::{AppError, AppResult};
use crate::llm::{ChatMessage, MessageRole};
use crate::resources::ServerResources;

// ============================================================================
// Request Types
// ============================================================================

/// Request body of `POST /api/chat`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurnRequest {
    /// Conversation so far, oldest first
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// First name used in the greeting and system prompt
    #[serde(default)]
    pub user_name: Option<String>,
}

// ============================================================================
// Chat Routes
// ============================================================================

/// Chat routes handler
pub struct ChatRoutes;

impl ChatRoutes {
    /// Create all chat routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/chat", post(Self::chat_turn))
            .with_state(resources)
    }

    /// Advance the intake conversation by one turn
    async fn chat_turn(
        State(resources): State<Arc<ServerResources>>,
        payload: Result<Json<ChatTurnRequest>, JsonRejection>,
    ) -> AppResult<Json<TurnOutcome>> {
        let Json(request) = payload?;
        if request
            .messages
            .iter()
            .any(|message| message.role == MessageRole::System)
        {
            return Err(AppError::invalid_input(
                "messages may only contain user and assistant roles",
            ));
        }

        let user_name = display_name(request.user_name.as_deref());
        let outcome = resources
            .conversation
            .advance_turn(&request.messages, user_name)
            .await?;

        info!(
            turn.messages = request.messages.len(),
            turn.complete = outcome.is_complete,
            "Chat turn processed"
        );
        Ok(Json(outcome))
    }
}
