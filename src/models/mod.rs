// ABOUTME: Core data models re-exported from fitvoice-core
// ABOUTME: Intake answers, workout and diet plans, persisted plans, and synced users
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! - `CollectedUserData`: intake answers extracted from the conversation
//! - `WorkoutPlan` / `DietPlan`: validated plan halves
//! - `Plan`: persisted record combining both halves
//! - `User`: profile synced from the identity provider

pub use fitvoice_core::models::*;
