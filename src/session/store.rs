use std::collections::BTreeMap;

use crate::{
    foundation::core::CompositionId,
    foundation::error::{EditError, EditResult},
    ir::model::CompositionIR,
    session::composition::CompositionSnapshot,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Latest persisted state of one composition.
pub struct StoredComposition {
    /// Persisted IR.
    pub ir: CompositionIR,
    /// Persisted revision.
    pub version: u64,
}

/// Persistence collaborator with optimistic concurrency.
///
/// `commit` succeeds only when `expected_version` equals the stored revision; on
/// [`EditError::VersionConflict`] the caller re-reads with `get_current` and retries.
pub trait CompositionStore {
    /// Latest IR and revision for `id`.
    fn get_current(&self, id: &CompositionId) -> EditResult<StoredComposition>;

    /// Replace the stored IR if nobody else committed since `expected_version`.
    ///
    /// Returns the new stored revision.
    fn commit(
        &mut self,
        id: &CompositionId,
        ir: CompositionIR,
        expected_version: u64,
    ) -> EditResult<u64>;
}

/// Map-backed store, one entry per composition.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    compositions: BTreeMap<CompositionId, StoredComposition>,
}

impl InMemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new composition at revision 0.
    pub fn create(&mut self, id: CompositionId, ir: CompositionIR) -> EditResult<()> {
        if self.compositions.contains_key(&id) {
            return Err(EditError::Other(anyhow::anyhow!(
                "composition '{id}' already exists"
            )));
        }
        self.compositions
            .insert(id, StoredComposition { ir, version: 0 });
        Ok(())
    }

    /// Consumer view of the latest committed state.
    pub fn latest(&self, id: &CompositionId) -> EditResult<CompositionSnapshot> {
        let stored = self.get_current(id)?;
        Ok(CompositionSnapshot {
            id: id.clone(),
            ir: stored.ir,
            version: stored.version,
        })
    }

    /// Number of stored compositions.
    pub fn len(&self) -> usize {
        self.compositions.len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.compositions.is_empty()
    }
}

impl CompositionStore for InMemoryStore {
    fn get_current(&self, id: &CompositionId) -> EditResult<StoredComposition> {
        self.compositions
            .get(id)
            .cloned()
            .ok_or_else(|| EditError::not_found(format!("composition '{id}'")))
    }

    fn commit(
        &mut self,
        id: &CompositionId,
        ir: CompositionIR,
        expected_version: u64,
    ) -> EditResult<u64> {
        let stored = self
            .compositions
            .get_mut(id)
            .ok_or_else(|| EditError::not_found(format!("composition '{id}'")))?;
        if stored.version != expected_version {
            tracing::warn!(
                composition = %id,
                expected = expected_version,
                actual = stored.version,
                "commit rejected: stale version"
            );
            return Err(EditError::VersionConflict {
                expected: expected_version,
                actual: stored.version,
            });
        }
        stored.ir = ir;
        stored.version += 1;
        Ok(stored.version)
    }
}
