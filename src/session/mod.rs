//! Versioned composition entity and its persistence collaborator.

/// The versioned composition entity.
pub mod composition;
/// Optimistic-concurrency persistence.
pub mod store;
