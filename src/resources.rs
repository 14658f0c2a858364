// ABOUTME: Centralized resource container for dependency injection in the HTTP server
// ABOUTME: Holds the store, language model, controller, plan generator, and webhook handler
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Server Resources
//!
//! Everything a handler needs is built once at startup and shared through
//! `Arc`. Tests build the same container around a scripted model and an
//! in-memory store.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::conversation::ConversationController;
use crate::database::FitnessStore;
use crate::errors::AppResult;
use crate::llm::LlmProvider;
use crate::services::PlanGenerator;
use crate::webhooks::IdentityWebhookHandler;

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// Plan and user persistence
    pub store: Arc<dyn FitnessStore>,
    /// Language model shared by the controller and generator
    pub llm: Arc<dyn LlmProvider>,
    /// Intake conversation driver
    pub conversation: Arc<ConversationController>,
    /// Workout and diet plan generator
    pub plan_generator: Arc<PlanGenerator>,
    /// Identity webhook verification and provisioning
    pub webhooks: Arc<IdentityWebhookHandler>,
}

impl ServerResources {
    /// Wire all shared resources from configuration and injected backends
    ///
    /// # Errors
    ///
    /// Returns `CONFIG_INVALID` when the webhook secret cannot be decoded
    pub fn new(
        config: ServerConfig,
        llm: Arc<dyn LlmProvider>,
        store: Arc<dyn FitnessStore>,
    ) -> AppResult<Self> {
        let conversation = Arc::new(ConversationController::new(
            Arc::clone(&llm),
            config.llm.chat_model.clone(),
        ));
        let plan_generator = Arc::new(PlanGenerator::new(
            Arc::clone(&llm),
            Arc::clone(&store),
            config.llm.plan_model.clone(),
        ));
        let webhooks = Arc::new(IdentityWebhookHandler::new(
            &config.webhook_secret,
            Arc::clone(&store),
        )?);

        Ok(Self {
            config: Arc::new(config),
            store,
            llm,
            conversation,
            plan_generator,
            webhooks,
        })
    }
}
