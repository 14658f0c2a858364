// ABOUTME: Unified error handling re-exported from fitvoice-core
// ABOUTME: AppError, ErrorCode, and the JSON error envelope used by every route
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Error Handling
//!
//! Errors live in `fitvoice-core` so the validator and models can share them.
//! With the `http-response` feature enabled, `AppError` renders as
//! `{ "success": false, "error": { "code", "message", ... } }`.

pub use fitvoice_core::errors::*;
