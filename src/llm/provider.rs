// ABOUTME: Unified LLM provider selector for runtime provider switching
// ABOUTME: Builds OpenAI, Gemini, or local providers from the loaded configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # LLM Provider Selector
//!
//! This module provides a unified interface for LLM providers that can be
//! configured at runtime via environment variables.
//!
//! ## Configuration
//!
//! Set `FITVOICE_LLM_PROVIDER`:
//! - `openai` (default): hosted `OpenAI` API (requires `OPENAI_API_KEY`)
//! - `gemini`: Google Gemini (requires `GEMINI_API_KEY`)
//! - `local`: any `OpenAI`-compatible server at `LOCAL_LLM_BASE_URL`

use std::env;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{
    ChatRequest, ChatResponse, GeminiProvider, LlmCapabilities, LlmProvider,
    OpenAiCompatibleConfig, OpenAiCompatibleProvider,
};
use crate::config::LlmConfig;
use crate::errors::AppError;

/// Which backend serves completions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderType {
    /// Hosted `OpenAI` API (default)
    #[default]
    OpenAi,
    /// Google Gemini
    Gemini,
    /// Local `OpenAI`-compatible endpoint (Ollama, vLLM, `LocalAI`)
    Local,
}

impl LlmProviderType {
    /// Environment variable name for LLM provider selection
    pub const ENV_VAR: &'static str = "FITVOICE_LLM_PROVIDER";

    /// Parse from string with fallback to default
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Self::Gemini,
            "local" | "ollama" | "vllm" | "localai" => Self::Local,
            _ => Self::OpenAi,
        }
    }

    /// Load from environment variable
    #[must_use]
    pub fn from_env() -> Self {
        env::var(Self::ENV_VAR)
            .map(|s| Self::from_str_or_default(&s))
            .unwrap_or_default()
    }
}

impl fmt::Display for LlmProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::Gemini => write!(f, "gemini"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// Unified chat provider that wraps `OpenAI`, Gemini, or a local LLM
pub enum ChatProvider {
    /// Hosted `OpenAI` or a local `OpenAI`-compatible server
    OpenAiCompatible(OpenAiCompatibleProvider),
    /// Google Gemini
    Gemini(GeminiProvider),
}

impl ChatProvider {
    /// Create a provider from the loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the selected provider's API key is missing or the
    /// HTTP client cannot be created.
    pub fn from_config(config: &LlmConfig) -> Result<Self, AppError> {
        info!(
            "Initializing LLM provider: {} (set {} to change)",
            config.provider,
            LlmProviderType::ENV_VAR
        );

        match config.provider {
            LlmProviderType::OpenAi => {
                let api_key = config
                    .openai_api_key
                    .as_deref()
                    .ok_or_else(|| AppError::config_missing("OPENAI_API_KEY"))?;
                let provider = OpenAiCompatibleProvider::new(OpenAiCompatibleConfig::openai(
                    api_key,
                ))?;
                Ok(Self::OpenAiCompatible(provider))
            }
            LlmProviderType::Gemini => {
                let api_key = config
                    .gemini_api_key
                    .as_deref()
                    .ok_or_else(|| AppError::config_missing("GEMINI_API_KEY"))?;
                Ok(Self::Gemini(GeminiProvider::new(api_key)))
            }
            LlmProviderType::Local => {
                let provider = OpenAiCompatibleProvider::new(OpenAiCompatibleConfig::local(
                    config.local_base_url.clone(),
                    config.local_api_key.clone(),
                ))?;
                Ok(Self::OpenAiCompatible(provider))
            }
        }
    }

    fn inner(&self) -> &dyn LlmProvider {
        match self {
            Self::OpenAiCompatible(p) => p,
            Self::Gemini(p) => p,
        }
    }
}

#[async_trait]
impl LlmProvider for ChatProvider {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn display_name(&self) -> &'static str {
        self.inner().display_name()
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.inner().capabilities()
    }

    fn default_model(&self) -> &str {
        self.inner().default_model()
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.inner().complete(request).await
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        self.inner().health_check().await
    }
}
