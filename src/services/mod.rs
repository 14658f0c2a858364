// ABOUTME: Domain service layer for business logic shared by routes and the session binary
// ABOUTME: Hosts the plan generator used after the intake conversation completes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Domain service layer
//!
//! Services are protocol-agnostic: the HTTP routes and the in-process session
//! backend call the same code.

/// Workout and diet plan generation with validation and persistence
pub mod plan_generation;

pub use plan_generation::{plan_name, PlanGenerator};
