// ABOUTME: Plan generation and plan listing route handlers
// ABOUTME: Turns collected intake data into a persisted workout and diet plan
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;

use crate::errors::{AppError, AppResult};
use crate::models::{CollectedUserData, GeneratedPlan, Plan};
use crate::resources::ServerResources;

/// Successful response envelope
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T> {
    /// Always `true`
    pub success: bool,
    /// Response payload
    pub data: T,
}

impl<T> SuccessResponse<T> {
    const fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Plan routes handler
pub struct PlanRoutes;

impl PlanRoutes {
    /// Create all plan routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/generate-program", post(Self::generate_program))
            .route("/api/plans/:user_id", get(Self::list_plans))
            .with_state(resources)
    }

    /// Generate and store a plan from `{ userId, ...intake fields }`
    async fn generate_program(
        State(resources): State<Arc<ServerResources>>,
        payload: Result<Json<Value>, JsonRejection>,
    ) -> AppResult<Json<SuccessResponse<GeneratedPlan>>> {
        let Json(body) = payload?;
        let user_id = extract_user_id(&body)?;
        let data: CollectedUserData = serde_json::from_value(body)
            .map_err(|e| AppError::invalid_input(format!("Invalid intake data: {e}")))?;

        let plan = resources
            .plan_generator
            .generate(&user_id, &data)
            .await
            .map_err(|e| e.with_user_id(&user_id))?;

        Ok(Json(SuccessResponse::new(plan)))
    }

    /// All plans of a user, newest first
    async fn list_plans(
        State(resources): State<Arc<ServerResources>>,
        Path(user_id): Path<String>,
    ) -> AppResult<Json<SuccessResponse<Vec<Plan>>>> {
        let plans = resources.store.get_user_plans(&user_id).await?;
        Ok(Json(SuccessResponse::new(plans)))
    }
}

/// `userId`, or `user_id` from older clients
fn extract_user_id(body: &Value) -> AppResult<String> {
    ["userId", "user_id"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|id| !id.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| AppError::missing_field("userId"))
}
