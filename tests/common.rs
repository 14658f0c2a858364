// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides logging, in-memory store, scripted server resources, and plan fixtures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]
//! Shared test utilities for `fitvoice_server`

use std::env;
use std::sync::{Arc, Once};

use anyhow::Result;
use fitvoice_server::{
    config::{CorsOrigins, Environment, LlmConfig, ServerConfig},
    database::SqliteStore,
    llm::{LlmProvider, LlmProviderType, DEFAULT_LOCAL_BASE_URL},
    models::CollectedUserData,
    resources::ServerResources,
};
use serde_json::{json, Value};
use tracing::Level;

/// Svix-format secret used across webhook tests
pub const TEST_WEBHOOK_SECRET: &str = "whsec_MfKQ9r8GKYqrTwjUPD8ILPZIo2LaLaSw";

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Server configuration pointing at a local model and an in-memory database
pub fn test_config() -> ServerConfig {
    ServerConfig {
        http_port: 0,
        database_url: "sqlite::memory:".to_owned(),
        llm: LlmConfig {
            provider: LlmProviderType::Local,
            openai_api_key: None,
            gemini_api_key: None,
            local_base_url: DEFAULT_LOCAL_BASE_URL.to_owned(),
            local_api_key: None,
            chat_model: None,
            plan_model: None,
        },
        webhook_secret: TEST_WEBHOOK_SECRET.to_owned(),
        cors_origins: CorsOrigins::Any,
        environment: Environment::Testing,
    }
}

/// Standard in-memory store
pub async fn create_test_store() -> Result<Arc<SqliteStore>> {
    init_test_logging();
    Ok(Arc::new(SqliteStore::connect("sqlite::memory:").await?))
}

/// Server resources over the given model and a fresh in-memory store
pub async fn create_test_resources(
    llm: Arc<dyn LlmProvider>,
) -> Result<(Arc<ServerResources>, Arc<SqliteStore>)> {
    let store = create_test_store().await?;
    let resources = ServerResources::new(test_config(), llm, store.clone())?;
    Ok((Arc::new(resources), store))
}

/// A fully answered intake
pub fn sample_intake() -> CollectedUserData {
    CollectedUserData {
        age: "28".to_owned(),
        height: "170 cm".to_owned(),
        weight: "65 kg".to_owned(),
        injuries: "none".to_owned(),
        fitness_goal: "Build muscle".to_owned(),
        fitness_level: "beginner".to_owned(),
        workout_days: "3".to_owned(),
        dietary_restrictions: "vegetarian".to_owned(),
    }
}

/// Intake as the JSON body of a generate-program call
pub fn sample_intake_body(user_id: &str) -> Value {
    json!({
        "userId": user_id,
        "age": "28",
        "height": "170 cm",
        "weight": "65 kg",
        "injuries": "none",
        "fitness_goal": "Build muscle",
        "fitness_level": "beginner",
        "workout_days": 3,
        "dietary_restrictions": "vegetarian"
    })
}

/// Model reply carrying a well-formed completion block
pub fn completion_reply() -> String {
    format!(
        "Perfect, that's everything I need! I'll build your program now.\n|||COMPLETE|||{}|||END|||",
        serde_json::to_string(&sample_intake()).unwrap()
    )
}

/// Workout plan as a model would return it, with loosely typed counts
pub fn workout_plan_json() -> String {
    json!({
        "schedule": ["Monday", "Wednesday", "Friday"],
        "exercises": [
            {
                "day": "Monday",
                "routines": [
                    { "name": "Goblet Squat", "sets": "3", "reps": "8-12" },
                    { "name": "Push-up", "sets": 3, "reps": 10 }
                ]
            },
            {
                "day": "Wednesday",
                "routines": [
                    { "name": "Romanian Deadlift", "sets": 3, "reps": "ten" }
                ]
            }
        ]
    })
    .to_string()
}

/// Diet plan as a model would return it
pub fn diet_plan_json() -> String {
    json!({
        "dailyCalories": "2400 kcal",
        "meals": [
            { "name": "Breakfast", "foods": ["Oatmeal with berries", "Greek yogurt"] },
            { "name": "Lunch", "foods": ["Lentil salad", "Whole grain bread"] }
        ]
    })
    .to_string()
}
