// ABOUTME: Workout and diet plan models produced by plan generation
// ABOUTME: WorkoutPlan, DietPlan, and the persisted Plan record with camelCase wire names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single exercise prescription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routine {
    /// Exercise name
    pub name: String,
    /// Number of sets, always at least 1
    pub sets: u32,
    /// Repetitions per set, always at least 1
    pub reps: u32,
}

/// Routines scheduled for one training day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutDay {
    /// Day name, e.g. "Monday"
    pub day: String,
    /// Ordered routines for the day
    pub routines: Vec<Routine>,
}

/// Validated weekly workout plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    /// Ordered training day names
    pub schedule: Vec<String>,
    /// Exercises grouped by day
    pub exercises: Vec<WorkoutDay>,
}

/// A meal and its foods
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    /// Meal name, e.g. "Breakfast"
    pub name: String,
    /// Food descriptions
    pub foods: Vec<String>,
}

/// Validated daily diet plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietPlan {
    /// Daily calorie target
    pub daily_calories: u32,
    /// Ordered meals
    pub meals: Vec<Meal>,
}

/// Persisted plan record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    /// Plan identifier
    pub id: Uuid,
    /// External identity of the owning user
    pub user_id: String,
    /// Display name, "<goal> Plan - <date>"
    pub name: String,
    /// Workout half of the plan
    pub workout_plan: WorkoutPlan,
    /// Diet half of the plan
    pub diet_plan: DietPlan,
    /// Whether this is the plan currently shown to the user
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Plan contents handed to the store for insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlan {
    /// External identity of the owning user
    pub user_id: String,
    /// Display name
    pub name: String,
    /// Validated workout plan
    pub workout_plan: WorkoutPlan,
    /// Validated diet plan
    pub diet_plan: DietPlan,
    /// Whether the plan becomes the active one
    pub is_active: bool,
}

/// Result of a successful generation, returned to HTTP callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPlan {
    /// Identifier of the persisted plan
    pub plan_id: Uuid,
    /// Validated workout plan
    pub workout_plan: WorkoutPlan,
    /// Validated diet plan
    pub diet_plan: DietPlan,
}
