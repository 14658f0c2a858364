// ABOUTME: Core data models for the FitVoice coaching service
// ABOUTME: Re-exports intake data, workout/diet plans, and user records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! - `CollectedUserData`: the eight intake answers extracted from the conversation
//! - `WorkoutPlan` / `DietPlan`: validated plan halves
//! - `Plan`: the persisted record combining both halves
//! - `User`: profile synced from the identity provider

mod intake;
mod plan;
mod user;

pub use intake::CollectedUserData;
pub use plan::{DietPlan, GeneratedPlan, Meal, NewPlan, Plan, Routine, WorkoutDay, WorkoutPlan};
pub use user::{User, UserSync};
