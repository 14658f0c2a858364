// ABOUTME: Constants module re-exporting fitvoice-core domain constants
// ABOUTME: Completion sentinels, plan coercion defaults, intake fields, and model settings

//! Constants module
//!
//! Constants are grouped by domain in `fitvoice-core`; this module keeps the
//! `crate::constants::*` paths stable for the server crate.

pub use fitvoice_core::constants::*;
