use std::collections::VecDeque;

use crate::{
    foundation::error::{EditError, EditResult},
    ir::model::CompositionIR,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Full copy of the IR at one point in the edit history.
pub struct HistorySnapshot {
    /// IR as it was after the recorded edit.
    pub ir: CompositionIR,
    /// Composition version the snapshot was recorded at.
    pub version: u64,
    /// When the snapshot was recorded.
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Receipt summary (or `"Initial state"`).
    pub description: String,
}

/// Bounded linear undo/redo history.
///
/// `snapshots[cursor]` is the live state. Recording after an undo discards everything past
/// the cursor; when more than `cap` snapshots are held the oldest is evicted.
#[derive(Clone, Debug)]
pub struct History {
    snapshots: VecDeque<HistorySnapshot>,
    cursor: usize,
    cap: usize,
}

impl History {
    /// Empty history holding at most `cap` snapshots (minimum 1).
    pub fn new(cap: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            cursor: 0,
            cap: cap.max(1),
        }
    }

    /// Record a new live state.
    pub fn record(&mut self, ir: CompositionIR, version: u64, description: impl Into<String>) {
        if !self.snapshots.is_empty() {
            self.snapshots.truncate(self.cursor + 1);
        }
        self.snapshots.push_back(HistorySnapshot {
            ir,
            version,
            timestamp: chrono::Utc::now(),
            description: description.into(),
        });
        while self.snapshots.len() > self.cap {
            self.snapshots.pop_front();
            tracing::debug!(cap = self.cap, "history full, evicted oldest snapshot");
        }
        self.cursor = self.snapshots.len() - 1;
    }

    /// Step back one snapshot.
    pub fn undo(&mut self) -> EditResult<&HistorySnapshot> {
        if !self.can_undo() {
            return Err(EditError::NothingToUndo);
        }
        self.cursor -= 1;
        self.current().ok_or(EditError::NothingToUndo)
    }

    /// Step forward one snapshot.
    pub fn redo(&mut self) -> EditResult<&HistorySnapshot> {
        if !self.can_redo() {
            return Err(EditError::NothingToRedo);
        }
        self.cursor += 1;
        self.current().ok_or(EditError::NothingToRedo)
    }

    /// Jump to the snapshot recorded at `version`. Snapshots after it stay redoable.
    pub fn restore(&mut self, version: u64) -> EditResult<&HistorySnapshot> {
        let idx = self
            .snapshots
            .iter()
            .position(|s| s.version == version)
            .ok_or_else(|| {
                EditError::not_found(format!("no history snapshot for version {version}"))
            })?;
        self.cursor = idx;
        self.current()
            .ok_or_else(|| EditError::not_found(format!("version {version}")))
    }

    /// Live snapshot, if anything has been recorded.
    pub fn current(&self) -> Option<&HistorySnapshot> {
        self.snapshots.get(self.cursor)
    }

    /// Whether an older snapshot is available.
    pub fn can_undo(&self) -> bool {
        !self.snapshots.is_empty() && self.cursor > 0
    }

    /// Whether a newer snapshot is available.
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Number of retained snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// True before the first record.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Maximum retained snapshots.
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Retained snapshots, oldest first.
    pub fn snapshots(&self) -> impl Iterator<Item = &HistorySnapshot> {
        self.snapshots.iter()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/history/manager.rs"]
mod tests;
