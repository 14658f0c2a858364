// ABOUTME: Two-phase workout and diet plan generation from collected intake data
// ABOUTME: Validates each structured model output and persists the plan as one record
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde_json::Value;
use tracing::{debug, info, instrument, warn, Span};

use crate::constants::conversation::PLAN_TEMPERATURE;
use crate::database::FitnessStore;
use crate::errors::{AppError, AppResult};
use crate::llm::prompts::{diet_plan_prompt, workout_plan_prompt};
use crate::llm::{ChatMessage, ChatRequest, LlmProvider, ResponseFormat};
use crate::models::{CollectedUserData, GeneratedPlan, NewPlan};
use crate::validation::{validate_diet_plan, validate_workout_plan};

/// Builds and stores a workout and diet plan for one user
#[derive(Clone)]
pub struct PlanGenerator {
    llm: Arc<dyn LlmProvider>,
    store: Arc<dyn FitnessStore>,
    model: Option<String>,
}

impl PlanGenerator {
    /// Create a generator with injected model and store
    #[must_use]
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        store: Arc<dyn FitnessStore>,
        model: Option<String>,
    ) -> Self {
        Self { llm, store, model }
    }

    /// Generate, validate and persist a plan.
    ///
    /// The workout call runs first, then the diet call. Nothing is stored
    /// unless both outputs validate.
    ///
    /// # Errors
    ///
    /// Returns the provider error for a failed model call,
    /// `MALFORMED_MODEL_OUTPUT` for unparsable or structurally invalid output,
    /// and a database error when persistence fails.
    #[instrument(skip(self, data), fields(user.id = %user_id, plan.id))]
    pub async fn generate(&self, user_id: &str, data: &CollectedUserData) -> AppResult<GeneratedPlan> {
        let workout_raw = self.structured_call(workout_plan_prompt(data)).await?;
        let workout_plan = validate_workout_plan(&workout_raw)?;
        debug!(days = workout_plan.exercises.len(), "Workout plan validated");

        let diet_raw = self.structured_call(diet_plan_prompt(data)).await?;
        let diet_plan = validate_diet_plan(&diet_raw)?;
        debug!(meals = diet_plan.meals.len(), "Diet plan validated");

        let new_plan = NewPlan {
            user_id: user_id.to_owned(),
            name: plan_name(&data.fitness_goal, Utc::now().date_naive()),
            workout_plan,
            diet_plan,
            is_active: true,
        };
        let plan_id = self.store.create_plan(&new_plan).await?;

        Span::current().record("plan.id", plan_id.to_string());
        info!("Plan generated");

        Ok(GeneratedPlan {
            plan_id,
            workout_plan: new_plan.workout_plan,
            diet_plan: new_plan.diet_plan,
        })
    }

    /// One JSON-constrained model call, parsed into a raw value
    async fn structured_call(&self, prompt: String) -> AppResult<Value> {
        let request = ChatRequest::new(vec![ChatMessage::user(prompt)])
            .with_optional_model(self.model.as_deref())
            .with_temperature(PLAN_TEMPERATURE)
            .with_response_format(ResponseFormat::JsonObject);

        if !self.llm.capabilities().supports_json_mode() {
            debug!(llm.provider = self.llm.name(), "No JSON mode, relying on the prompt");
        }

        let response = self.llm.complete(&request).await?;
        debug!(tokens = ?response.total_tokens(), "Structured reply received");
        if response.is_truncated() {
            warn!(llm.model = %response.model, "Structured reply hit the token limit");
        }

        let content = match response.content.trim() {
            "" => "{}",
            text => text,
        };

        serde_json::from_str(content).map_err(|e| {
            AppError::malformed_model_output(format!("Model returned invalid JSON: {e}"))
                .with_source(e)
        })
    }
}

/// Display name for a generated plan, e.g. `"Lose weight Plan - 3/7/2025"`
#[must_use]
pub fn plan_name(fitness_goal: &str, date: NaiveDate) -> String {
    format!("{fitness_goal} Plan - {}", date.format("%-m/%-d/%Y"))
}
