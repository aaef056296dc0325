//! Planner-facing edit plans and their pre-flight validation.

/// Edit plan wire model.
pub mod model;
/// Plan checks that run before any mutation.
pub mod validate;
