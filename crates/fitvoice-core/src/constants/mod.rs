// ABOUTME: Application constants for the intake conversation and plan validation
// ABOUTME: Holds completion sentinel markers, coercion defaults, and intake field names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Constants
//!
//! Values shared between the conversation controller, the plan generator and
//! the schema validator.

/// Completion sentinel markers embedded by the model in its final intake turn
pub mod sentinels {
    /// Marker that opens the machine-readable completion block
    pub const COMPLETE_MARKER: &str = "|||COMPLETE|||";

    /// Marker that closes the machine-readable completion block
    pub const END_MARKER: &str = "|||END|||";
}

/// Fallback values used when coercing numeric plan fields
pub mod plan_defaults {
    /// Sets used when the model emits a non-numeric value
    pub const DEFAULT_SETS: u32 = 1;

    /// Reps used when the model emits a non-numeric value
    pub const DEFAULT_REPS: u32 = 10;

    /// Daily calories used when the model emits a non-numeric value
    pub const DEFAULT_DAILY_CALORIES: u32 = 2000;
}

/// Keys of the intake payload, in the order the coach collects them
pub mod intake_fields {
    /// Age
    pub const AGE: &str = "age";
    /// Height in any format
    pub const HEIGHT: &str = "height";
    /// Weight in any format
    pub const WEIGHT: &str = "weight";
    /// Injuries or physical limitations
    pub const INJURIES: &str = "injuries";
    /// Fitness goal
    pub const FITNESS_GOAL: &str = "fitness_goal";
    /// Current fitness level
    pub const FITNESS_LEVEL: &str = "fitness_level";
    /// Workout days per week
    pub const WORKOUT_DAYS: &str = "workout_days";
    /// Dietary restrictions or preferences
    pub const DIETARY_RESTRICTIONS: &str = "dietary_restrictions";

    /// All eight required keys
    pub const ALL: [&str; 8] = [
        AGE,
        HEIGHT,
        WEIGHT,
        INJURIES,
        FITNESS_GOAL,
        FITNESS_LEVEL,
        WORKOUT_DAYS,
        DIETARY_RESTRICTIONS,
    ];
}

/// Conversation defaults
pub mod conversation {
    /// Name used in the greeting when the user has no first name on file
    pub const FALLBACK_USER_NAME: &str = "There";

    /// Sampling temperature for intake turns
    pub const CHAT_TEMPERATURE: f32 = 0.7;

    /// Token cap for intake turns; replies are spoken aloud
    pub const CHAT_MAX_TOKENS: u32 = 300;

    /// Sampling temperature for structured plan calls
    pub const PLAN_TEMPERATURE: f32 = 0.4;
}
