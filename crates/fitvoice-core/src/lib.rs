// ABOUTME: Core types and constants for the FitVoice coaching service
// ABOUTME: Foundation crate with error handling, plan models, schema validation, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # `FitVoice` Core
//!
//! Foundation crate providing shared types for the `FitVoice` coaching service.
//! This crate is designed to change infrequently, enabling incremental
//! compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `ShapeError`
//! - **constants**: Completion sentinels and coercion defaults
//! - **models**: Collected intake data, workout/diet plans, and persisted plan records
//! - **validation**: Coercion of loosely-typed model output into strict plan shapes

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (intake data, plans, users)
pub mod models;

/// Schema validation for model-generated workout and diet plans
pub mod validation;
