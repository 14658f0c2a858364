// ABOUTME: Coach backend abstraction used by the session orchestrator
// ABOUTME: Provides an in-process backend over the controller and plan generator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;

use crate::conversation::{ConversationController, TurnOutcome};
use crate::errors::AppResult;
use crate::llm::ChatMessage;
use crate::models::{CollectedUserData, GeneratedPlan};
use crate::services::PlanGenerator;

/// Conversation and plan operations the session depends on
#[async_trait]
pub trait CoachBackend: Send + Sync {
    /// Run one intake turn over the full history
    async fn advance_turn(&self, history: &[ChatMessage], user_name: &str)
        -> AppResult<TurnOutcome>;

    /// Generate and store a plan from completed intake data
    async fn generate_plan(
        &self,
        user_id: &str,
        data: &CollectedUserData,
    ) -> AppResult<GeneratedPlan>;
}

/// In-process backend calling the controller and generator directly
pub struct LocalCoach {
    controller: ConversationController,
    generator: PlanGenerator,
}

impl LocalCoach {
    /// Create a local backend
    #[must_use]
    pub const fn new(controller: ConversationController, generator: PlanGenerator) -> Self {
        Self {
            controller,
            generator,
        }
    }
}

#[async_trait]
impl CoachBackend for LocalCoach {
    async fn advance_turn(
        &self,
        history: &[ChatMessage],
        user_name: &str,
    ) -> AppResult<TurnOutcome> {
        self.controller.advance_turn(history, user_name).await
    }

    async fn generate_plan(
        &self,
        user_id: &str,
        data: &CollectedUserData,
    ) -> AppResult<GeneratedPlan> {
        self.generator.generate(user_id, data).await
    }
}
