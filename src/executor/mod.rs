//! Applying resolved operations to an IR copy.
//!
//! Every operation works on a clone of the input, re-validates the result and reports exact
//! before/after values in a [`receipt::Receipt`].

/// Fresh element id generation.
pub mod ids;
/// add / update / delete / move.
pub mod ops;
/// Per-field change records.
pub mod receipt;
