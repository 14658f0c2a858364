// ABOUTME: Route module organization for the FitVoice HTTP endpoints
// ABOUTME: Provides route definitions organized by domain with thin handlers over services
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module for the `FitVoice` server
//!
//! Each domain module contains only route definitions and thin handler
//! functions that delegate to the conversation controller, plan generator,
//! store, or webhook handler.

/// Intake chat turn route
pub mod chat;
/// Health check route
pub mod health;
/// Plan generation and listing routes
pub mod plans;
/// Identity provider webhook route
pub mod webhooks;

/// Chat turn route handler
pub use chat::ChatRoutes;
/// Health route handler
pub use health::HealthRoutes;
/// Plan route handlers
pub use plans::PlanRoutes;
/// Webhook route handler
pub use webhooks::WebhookRoutes;
