// ABOUTME: Plan schema validation re-exported from fitvoice-core
// ABOUTME: Coerces loosely-typed model output into strict workout and diet plans

pub use fitvoice_core::validation::*;
