//! Asset collaborator: metadata lookup for media referenced by `add`.

/// Asset metadata and the lookup trait.
pub mod catalog;
