//! Bounded snapshot history with undo/redo/restore.

/// Snapshot ring with a cursor.
pub mod manager;
