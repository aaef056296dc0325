use crate::{
    assets::catalog::AssetCatalog,
    executor::ids::{IdGenerator, RandomIds},
    executor::ops::{EditOp, execute},
    executor::receipt::Receipt,
    foundation::config::EditorConfig,
    foundation::core::CompositionId,
    foundation::error::{EditError, EditResult},
    history::manager::History,
    ir::model::{CompositionIR, Settings},
    ir::validate::ensure_valid,
    plan::model::{EditPlan, OperationKind},
    plan::validate::validate_plan,
    selector::resolve::resolve,
};

const INITIAL_DESCRIPTION: &str = "Initial state";

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Read-only view handed to preview/render consumers.
pub struct CompositionSnapshot {
    /// Composition id.
    pub id: CompositionId,
    /// IR at `version`.
    pub ir: CompositionIR,
    /// Revision of `ir`.
    pub version: u64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Result of one applied plan.
pub struct EditOutcome {
    /// What changed.
    pub receipt: Receipt,
    /// Composition revision after the edit.
    pub version: u64,
}

/// Versioned container for one IR plus its edit history.
///
/// All mutation goes through [`Composition::apply_plan`], undo/redo or restore. Each of these
/// produces a new live state and bumps [`Composition::version`].
#[derive(Clone, Debug)]
pub struct Composition {
    id: CompositionId,
    ir: CompositionIR,
    version: u64,
    history: History,
    config: EditorConfig,
}

impl Composition {
    /// Empty composition at version 0.
    pub fn new(
        id: CompositionId,
        settings: Settings,
        config: EditorConfig,
    ) -> EditResult<Self> {
        Self::from_ir(id, CompositionIR::new(settings), 0, config)
    }

    /// Composition resuming from a stored IR and version.
    pub fn from_ir(
        id: CompositionId,
        mut ir: CompositionIR,
        version: u64,
        config: EditorConfig,
    ) -> EditResult<Self> {
        config.validate()?;
        ir.refresh_duration();
        ensure_valid(&ir)?;
        let mut history = History::new(config.history_cap);
        history.record(ir.clone(), version, INITIAL_DESCRIPTION);
        Ok(Self {
            id,
            ir,
            version,
            history,
            config,
        })
    }

    /// Composition id.
    pub fn id(&self) -> &CompositionId {
        &self.id
    }

    /// Live IR.
    pub fn ir(&self) -> &CompositionIR {
        &self.ir
    }

    /// Live revision.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Edit history.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Engine configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Consumer view of the live state.
    pub fn snapshot(&self) -> CompositionSnapshot {
        CompositionSnapshot {
            id: self.id.clone(),
            ir: self.ir.clone(),
            version: self.version,
        }
    }

    /// Validate, resolve and execute `plan`, drawing new ids from the configured prefix.
    pub fn apply_plan(
        &mut self,
        plan: &EditPlan,
        assets: &dyn AssetCatalog,
    ) -> EditResult<EditOutcome> {
        let mut ids = RandomIds::new(self.config.id_prefix.clone());
        self.apply_plan_with(plan, assets, &mut ids)
    }

    /// [`Composition::apply_plan`] with an explicit id source.
    ///
    /// On any error (including [`EditError::AmbiguousSelector`]) the composition is unchanged.
    #[tracing::instrument(skip_all, fields(composition = %self.id, op = %plan.operation))]
    pub fn apply_plan_with(
        &mut self,
        plan: &EditPlan,
        assets: &dyn AssetCatalog,
        ids: &mut dyn IdGenerator,
    ) -> EditResult<EditOutcome> {
        let version = self.next_version()?;
        let asset = validate_plan(plan, &self.ir, assets)?;
        let changes = plan.changes_or_default();

        let op = match plan.operation {
            OperationKind::Add => EditOp::Add {
                asset: asset.ok_or_else(|| EditError::invalid_plan("add requires 'assetId'"))?,
                changes,
            },
            kind => {
                let selector = plan
                    .selector
                    .as_ref()
                    .ok_or_else(|| EditError::invalid_selector(format!("{kind} needs a selector")))?;
                let targets = resolve(selector, &self.ir)?.into_targets()?;
                match kind {
                    OperationKind::Update => EditOp::Update { targets, changes },
                    OperationKind::Delete => EditOp::Delete { targets },
                    _ => EditOp::Move { targets, changes },
                }
            }
        };

        let applied = execute(&self.ir, &op, &self.config, ids)?;
        self.version = version;
        self.ir = applied.ir;
        self.history
            .record(self.ir.clone(), self.version, applied.receipt.summary.clone());
        tracing::info!(version = self.version, summary = %applied.receipt.summary, "edit committed");

        Ok(EditOutcome {
            receipt: applied.receipt,
            version: self.version,
        })
    }

    /// Return to the previous snapshot.
    pub fn undo(&mut self) -> EditResult<&CompositionIR> {
        let version = self.next_version()?;
        let ir = self.history.undo()?.ir.clone();
        self.go_live(ir, version, "undo");
        Ok(&self.ir)
    }

    /// Re-apply the next snapshot.
    pub fn redo(&mut self) -> EditResult<&CompositionIR> {
        let version = self.next_version()?;
        let ir = self.history.redo()?.ir.clone();
        self.go_live(ir, version, "redo");
        Ok(&self.ir)
    }

    /// Jump to the snapshot recorded at `version` without discarding later snapshots.
    pub fn restore(&mut self, version: u64) -> EditResult<&CompositionIR> {
        let next = self.next_version()?;
        let ir = self.history.restore(version)?.ir.clone();
        self.go_live(ir, next, "restore");
        Ok(&self.ir)
    }

    fn go_live(&mut self, ir: CompositionIR, version: u64, action: &str) {
        self.ir = ir;
        self.version = version;
        tracing::debug!(action, version, "history moved");
    }

    // Checked before any state moves so an exhausted counter leaves the composition untouched.
    fn next_version(&self) -> EditResult<u64> {
        self.version
            .checked_add(1)
            .ok_or_else(|| EditError::invalid_range("composition version overflow"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/composition.rs"]
mod tests;
