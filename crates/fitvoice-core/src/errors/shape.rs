// ABOUTME: Structural errors raised while validating model-generated plan payloads
// ABOUTME: Carries the JSON path of the offending value for logging and error details
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use thiserror::Error;

/// A plan payload whose structure cannot be coerced into the strict schema.
///
/// Numeric shape problems never produce this error; they are absorbed by
/// coercion. Only structurally missing or mistyped containers and text fields do.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// Expected a JSON object
    #[error("expected an object at `{path}`")]
    NotAnObject {
        /// JSON path of the value
        path: String,
    },
    /// A required array is absent or is not an array
    #[error("missing array `{path}`")]
    MissingArray {
        /// JSON path of the array
        path: String,
    },
    /// A required text field is absent
    #[error("missing field `{path}`")]
    MissingField {
        /// JSON path of the field
        path: String,
    },
    /// A field holds a value of the wrong kind
    #[error("expected {expected} at `{path}`")]
    InvalidType {
        /// JSON path of the field
        path: String,
        /// What the schema expects
        expected: &'static str,
    },
}

impl ShapeError {
    /// JSON path of the offending value
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::NotAnObject { path }
            | Self::MissingArray { path }
            | Self::MissingField { path }
            | Self::InvalidType { path, .. } => path,
        }
    }
}
