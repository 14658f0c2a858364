// ABOUTME: Liveness route reporting service status and build version
// ABOUTME: Answers without touching the store or the language model
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::resources::ServerResources;

/// Liveness payload
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// Always `ok` while the process serves requests
    pub status: &'static str,
    /// Crate version
    pub version: &'static str,
    /// Configured language model backend
    pub llm_provider: &'static str,
    /// RFC 3339 server time
    pub timestamp: String,
}

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the liveness route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::handle_health))
            .with_state(resources)
    }

    async fn handle_health(State(resources): State<Arc<ServerResources>>) -> Json<HealthStatus> {
        Json(HealthStatus {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            llm_provider: resources.llm.name(),
            timestamp: Utc::now().to_rfc3339(),
        })
    }
}
