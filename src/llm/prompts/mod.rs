// ABOUTME: Prompts for the intake conversation and plan generation loaded at compile time
// ABOUTME: Fills user-specific placeholders in the markdown templates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Prompts
//!
//! Prompts are loaded at compile time from markdown files for easy maintenance.
//! Plan templates use `{field}` placeholders named after the intake keys.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::models::CollectedUserData;

/// Coach persona and the eight-question intake rules
pub const INTAKE_SYSTEM_PROMPT: &str = include_str!("intake_system.md");

/// Follow-up instruction sent when the completion block JSON is unreadable
pub const COMPLETION_REPAIR_PROMPT: &str = include_str!("completion_repair.md");

/// Structured-output prompt for the workout half of a plan
pub const WORKOUT_PLAN_TEMPLATE: &str = include_str!("workout_plan.md");

/// Structured-output prompt for the diet half of a plan
pub const DIET_PLAN_TEMPLATE: &str = include_str!("diet_plan.md");

/// System instruction for an intake turn, personalised with the user's name
#[must_use]
pub fn intake_system_prompt(user_name: &str) -> String {
    format!(
        "{}\n\nThe user's name is: {user_name}.",
        INTAKE_SYSTEM_PROMPT.trim_end()
    )
}

/// Workout prompt embedding the user's stats, constraints and goal
#[must_use]
pub fn workout_plan_prompt(data: &CollectedUserData) -> String {
    fill_template(WORKOUT_PLAN_TEMPLATE, data)
}

/// Diet prompt embedding the user's stats, goal and restrictions
#[must_use]
pub fn diet_plan_prompt(data: &CollectedUserData) -> String {
    fill_template(DIET_PLAN_TEMPLATE, data)
}

/// Matches `{field}` placeholders; JSON braces in the examples never do
fn placeholder_regex() -> Option<&'static Regex> {
    static PLACEHOLDER_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    PLACEHOLDER_REGEX
        .get_or_init(|| Regex::new(r"\{([a-z_]+)\}").ok())
        .as_ref()
}

/// Substitute every placeholder in a single pass, so answers are never rescanned
fn fill_template(template: &str, data: &CollectedUserData) -> String {
    let template = template.trim_end();
    let Some(regex) = placeholder_regex() else {
        return template.to_owned();
    };

    regex
        .replace_all(template, |caps: &Captures<'_>| {
            let value = match &caps[1] {
                "age" => &data.age,
                "height" => &data.height,
                "weight" => &data.weight,
                "injuries" => &data.injuries,
                "fitness_goal" => &data.fitness_goal,
                "fitness_level" => &data.fitness_level,
                "workout_days" => &data.workout_days,
                "dietary_restrictions" => &data.dietary_restrictions,
                _ => return caps[0].to_owned(),
            };
            value.clone()
        })
        .into_owned()
}
