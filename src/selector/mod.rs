//! Mapping element references onto concrete ids, or onto a choice for the user.

/// Selector grammar and resolution.
pub mod resolve;
