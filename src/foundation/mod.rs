//! Shared value types, error model and engine configuration.

/// Engine tunables loaded from JSON.
pub mod config;
/// Ids, frame rate and canvas value types.
pub mod core;
/// Error kinds shared by every engine stage.
pub mod error;
