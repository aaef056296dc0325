//! The composition document: element model, property bags and invariant checks.

/// Elements, typed property bags and settings.
pub mod model;
/// Whole-document invariant checks with JSON-path locations.
pub mod validate;
