// ABOUTME: Main library entry point for the FitVoice coaching service
// ABOUTME: Voice intake conversation, plan generation, persistence, and HTTP API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![recursion_limit = "256"]
#![deny(unsafe_code)]

//! # `FitVoice` Server
//!
//! A voice-driven fitness intake service. A coach persona interviews the
//! user turn by turn, detects when the intake is complete, then generates a
//! workout plan and a diet plan with an LLM, validates both against a strict
//! schema and stores them.
//!
//! ## Architecture
//!
//! - **Conversation**: one intake turn over the full message history
//! - **Services**: plan generation from completed intake data
//! - **Database**: `SQLite` persistence for users and plans
//! - **Routes**: chat, plan generation, plan listing, identity webhooks
//! - **Voice**: speech recognition and synthesis adapter
//! - **Session**: call state machine tying voice to the coach
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use fitvoice_server::config::ServerConfig;
//! use fitvoice_server::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("FitVoice configured with port: HTTP={}", config.http_port);
//!     Ok(())
//! }
//! ```

// ── Public API ──────────────────────────────────────────────────────────
// Used by the binaries in src/bin/ and the integration tests in tests/.

/// Environment-based server configuration
pub mod config;

/// Application constants re-exported from the core crate
pub mod constants;

/// Intake conversation controller and completion detection
pub mod conversation;

/// `SQLite` persistence for users and plans
pub mod database;

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// LLM provider abstraction (`OpenAI`-compatible and Gemini)
pub mod llm;

/// Structured logging setup
pub mod logging;

/// HTTP middleware (CORS, request tracing)
pub mod middleware;

/// Core data models
pub mod models;

/// Shared server resources handed to every route
pub mod resources;

/// HTTP route handlers
pub mod routes;

/// HTTP server assembly and lifecycle
pub mod server;

/// Business services (plan generation)
pub mod services;

/// Voice session orchestration
pub mod session;

/// Plan schema validation
pub mod validation;

/// Speech recognition and synthesis adapter
pub mod voice;

/// Identity provider webhooks
pub mod webhooks;
