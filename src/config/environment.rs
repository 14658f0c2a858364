// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Loads ports, database URL, LLM selection, webhook secret, and CORS origins
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration, loaded once before the listener binds.
//!
//! Missing secrets fail fast with `CONFIG_MISSING` naming the variable.

use std::env;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{AppError, AppResult, ErrorCode};
use crate::llm::{LlmProviderType, DEFAULT_LOCAL_BASE_URL};

/// Default HTTP port
pub const DEFAULT_HTTP_PORT: u16 = 8081;

/// Default SQLite database location
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/fitvoice.db";

/// Environment type for security and other configurations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Allowed CORS origins
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    /// Allow any origin (`*`)
    Any,
    /// Explicit allow-list
    List(Vec<String>),
}

impl CorsOrigins {
    /// Parse a comma-separated list, `*` or empty meaning any
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let origins: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();

        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            Self::Any
        } else {
            Self::List(origins)
        }
    }
}

/// Language model settings
#[derive(Clone)]
pub struct LlmConfig {
    /// Selected backend
    pub provider: LlmProviderType,
    /// `OPENAI_API_KEY`
    pub openai_api_key: Option<String>,
    /// `GEMINI_API_KEY`
    pub gemini_api_key: Option<String>,
    /// `LOCAL_LLM_BASE_URL`
    pub local_base_url: String,
    /// `LOCAL_LLM_API_KEY`
    pub local_api_key: Option<String>,
    /// Model override for intake turns
    pub chat_model: Option<String>,
    /// Model override for plan generation
    pub plan_model: Option<String>,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("local_base_url", &self.local_base_url)
            .field("chat_model", &self.chat_model)
            .field("plan_model", &self.plan_model)
            .finish_non_exhaustive()
    }
}

impl LlmConfig {
    /// Load model settings from environment variables
    ///
    /// # Errors
    ///
    /// Returns `CONFIG_MISSING` when the selected provider's API key is absent
    pub fn from_env() -> AppResult<Self> {
        let provider = LlmProviderType::from_env();
        let config = Self {
            provider,
            openai_api_key: optional_env("OPENAI_API_KEY"),
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            local_base_url: optional_env("LOCAL_LLM_BASE_URL")
                .unwrap_or_else(|| DEFAULT_LOCAL_BASE_URL.to_owned()),
            local_api_key: optional_env("LOCAL_LLM_API_KEY"),
            chat_model: optional_env("FITVOICE_CHAT_MODEL"),
            plan_model: optional_env("FITVOICE_PLAN_MODEL"),
        };

        match provider {
            LlmProviderType::OpenAi if config.openai_api_key.is_none() => {
                Err(AppError::config_missing("OPENAI_API_KEY"))
            }
            LlmProviderType::Gemini if config.gemini_api_key.is_none() => {
                Err(AppError::config_missing("GEMINI_API_KEY"))
            }
            _ => Ok(config),
        }
    }
}

/// Complete server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// sqlx connection URL
    pub database_url: String,
    /// Language model settings
    pub llm: LlmConfig,
    /// `whsec_`-prefixed identity webhook secret
    pub webhook_secret: String,
    /// Allowed CORS origins
    pub cors_origins: CorsOrigins,
    /// Deployment environment
    pub environment: Environment,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("http_port", &self.http_port)
            .field("database_url", &self.database_url)
            .field("llm", &self.llm)
            .field("webhook_secret", &"[REDACTED]")
            .field("cors_origins", &self.cors_origins)
            .field("environment", &self.environment)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `CONFIG_MISSING` when a required secret is absent and
    /// `CONFIG_INVALID` when a value cannot be parsed.
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");

        let http_port = match optional_env("HTTP_PORT") {
            Some(raw) => raw.parse().map_err(|_| {
                AppError::new(
                    ErrorCode::ConfigInvalid,
                    format!("Invalid HTTP_PORT value: {raw}"),
                )
            })?,
            None => DEFAULT_HTTP_PORT,
        };

        let llm = LlmConfig::from_env()?;

        let webhook_secret = optional_env("CLERK_WEBHOOK_SECRET")
            .ok_or_else(|| AppError::config_missing("CLERK_WEBHOOK_SECRET"))?;

        let config = Self {
            http_port,
            database_url: optional_env("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned()),
            llm,
            webhook_secret,
            cors_origins: CorsOrigins::parse(
                &optional_env("CORS_ALLOWED_ORIGINS").unwrap_or_default(),
            ),
            environment: Environment::from_str_or_default(
                &optional_env("ENVIRONMENT").unwrap_or_default(),
            ),
        };

        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "FitVoice Server Configuration:\n\
             - HTTP Port: {}\n\
             - Database: {}\n\
             - LLM Provider: {}\n\
             - Chat Model: {}\n\
             - Plan Model: {}\n\
             - CORS: {}\n\
             - Environment: {}",
            self.http_port,
            self.database_url,
            self.llm.provider,
            self.llm.chat_model.as_deref().unwrap_or("provider default"),
            self.llm.plan_model.as_deref().unwrap_or("provider default"),
            match &self.cors_origins {
                CorsOrigins::Any => "any origin".to_owned(),
                CorsOrigins::List(list) => list.join(", "),
            },
            self.environment,
        )
    }
}

/// Read an environment variable, treating empty values as unset
fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
