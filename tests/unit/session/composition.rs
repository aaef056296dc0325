use super::*;
use crate::assets::catalog::{AssetInfo, AssetStatus, InMemoryAssets};
use crate::foundation::core::ElementId;
use crate::ir::model::ElementKind;
use crate::plan::model::Changes;
use crate::selector::resolve::Selector;

struct Seq(u32);

impl IdGenerator for Seq {
    fn next_id(&mut self) -> ElementId {
        self.0 += 1;
        ElementId(format!("el{}", self.0))
    }
}

fn assets() -> InMemoryAssets {
    let clip = |id: &str, status| AssetInfo {
        id: id.to_string(),
        kind: ElementKind::Video,
        status,
        src: format!("https://cdn.test/{id}.mp4"),
        duration_in_frames: Some(60),
        duration_sec: None,
        default_properties: serde_json::Map::new(),
    };
    InMemoryAssets::new()
        .with(clip("clip", AssetStatus::Ready))
        .with(clip("pending", AssetStatus::Uploading))
}

fn comp() -> Composition {
    Composition::new(
        CompositionId::new("c1"),
        Settings::default(),
        EditorConfig::default(),
    )
    .unwrap()
}

fn add(label: &str) -> EditPlan {
    EditPlan {
        operation: OperationKind::Add,
        selector: None,
        asset_id: Some("clip".to_string()),
        changes: Some(Changes {
            label: Some(label.to_string()),
            ..Changes::default()
        }),
    }
}

#[test]
fn new_composition_starts_at_version_zero_with_one_snapshot() {
    let c = comp();
    assert_eq!(c.version(), 0);
    assert_eq!(c.history().len(), 1);
    assert!(c.ir().elements.is_empty());
    let snap = c.snapshot();
    assert_eq!(snap.id, CompositionId::new("c1"));
    assert_eq!(snap.version, 0);
}

#[test]
fn apply_bumps_version_and_records_history() {
    let mut c = comp();
    let mut ids = Seq(0);
    let out = c.apply_plan_with(&add("first"), &assets(), &mut ids).unwrap();
    assert_eq!(out.version, 1);
    assert_eq!(out.receipt.element_ids, vec![ElementId::new("el1")]);
    let out = c.apply_plan_with(&add("second"), &assets(), &mut ids).unwrap();
    assert_eq!(out.version, 2);
    assert_eq!(c.ir().elements[1].from, 60);
    assert_eq!(c.history().len(), 3);
    assert_eq!(
        c.history().current().unwrap().description,
        out.receipt.summary
    );
}

#[test]
fn failed_edits_leave_composition_untouched() {
    let mut c = comp();
    let mut ids = Seq(0);
    c.apply_plan_with(&add("only"), &assets(), &mut ids).unwrap();
    let before = c.snapshot();

    let mut pending = add("x");
    pending.asset_id = Some("pending".to_string());
    assert!(matches!(
        c.apply_plan_with(&pending, &assets(), &mut ids),
        Err(EditError::AssetNotReady(_))
    ));

    let bad = EditPlan {
        operation: OperationKind::Update,
        selector: Some(Selector::id("el1")),
        asset_id: None,
        changes: Some(Changes {
            duration_in_frames: Some(0),
            ..Changes::default()
        }),
    };
    assert!(matches!(
        c.apply_plan_with(&bad, &assets(), &mut ids),
        Err(EditError::InvalidRange(_))
    ));
    assert_eq!(c.snapshot(), before);
    assert_eq!(c.history().len(), 2);
}

#[test]
fn ambiguity_round_trip_through_options() {
    let mut c = comp();
    let mut ids = Seq(0);
    c.apply_plan_with(&add("gorilla"), &assets(), &mut ids).unwrap();
    c.apply_plan_with(&add("Gorilla close-up"), &assets(), &mut ids)
        .unwrap();

    let delete = EditPlan {
        operation: OperationKind::Delete,
        selector: Some(Selector::label("gorilla")),
        asset_id: None,
        changes: None,
    };
    let err = c.apply_plan_with(&delete, &assets(), &mut ids).unwrap_err();
    let options = err.disambiguation_options().unwrap().to_vec();
    assert_eq!(options.len(), 2);
    assert_eq!(c.version(), 2);

    let chosen = delete.with_selector(options[1].to_selector());
    let out = c.apply_plan_with(&chosen, &assets(), &mut ids).unwrap();
    assert_eq!(out.receipt.element_ids, vec![ElementId::new("el2")]);
    assert_eq!(c.ir().elements.len(), 1);
}

#[test]
fn undo_redo_restore_move_the_live_ir() {
    let mut c = comp();
    let mut ids = Seq(0);
    c.apply_plan_with(&add("a"), &assets(), &mut ids).unwrap();
    c.apply_plan_with(&add("b"), &assets(), &mut ids).unwrap();

    assert_eq!(c.undo().unwrap().elements.len(), 1);
    assert_eq!(c.version(), 3);
    assert_eq!(c.redo().unwrap().elements.len(), 2);
    assert_eq!(c.version(), 4);
    assert!(matches!(c.redo(), Err(EditError::NothingToRedo)));

    assert!(c.restore(0).unwrap().elements.is_empty());
    assert!(matches!(c.undo(), Err(EditError::NothingToUndo)));
    assert_eq!(c.restore(2).unwrap().elements.len(), 2);
    assert!(matches!(c.restore(99), Err(EditError::NotFound(_))));
}

#[test]
fn edit_after_undo_discards_redo_branch() {
    let mut c = comp();
    let mut ids = Seq(0);
    c.apply_plan_with(&add("a"), &assets(), &mut ids).unwrap();
    c.apply_plan_with(&add("b"), &assets(), &mut ids).unwrap();
    c.undo().unwrap();
    c.apply_plan_with(&add("c"), &assets(), &mut ids).unwrap();
    assert!(matches!(c.redo(), Err(EditError::NothingToRedo)));
    let labels: Vec<_> = c
        .ir()
        .elements
        .iter()
        .filter_map(|e| e.label.as_deref())
        .collect();
    assert_eq!(labels, vec!["a", "c"]);
}

#[test]
fn from_ir_rejects_invalid_documents() {
    let mut ir = CompositionIR::new(Settings::default());
    ir.settings.background = "black".to_string();
    assert!(
        Composition::from_ir(CompositionId::new("x"), ir, 7, EditorConfig::default()).is_err()
    );
}

#[test]
fn exhausted_version_counter_rejects_edits_without_moving_state() {
    let mut c = Composition::from_ir(
        CompositionId::new("old"),
        CompositionIR::new(Settings::default()),
        u64::MAX - 1,
        EditorConfig::default(),
    )
    .unwrap();
    let mut ids = Seq(0);
    let out = c.apply_plan_with(&add("last"), &assets(), &mut ids).unwrap();
    assert_eq!(out.version, u64::MAX);

    let before = c.ir().clone();
    let err = c.apply_plan_with(&add("one more"), &assets(), &mut ids).unwrap_err();
    assert!(matches!(err, EditError::InvalidRange(_)));
    assert!(matches!(c.undo(), Err(EditError::InvalidRange(_))));
    assert!(matches!(c.restore(u64::MAX - 1), Err(EditError::InvalidRange(_))));

    assert_eq!(c.version(), u64::MAX);
    assert_eq!(c.ir(), &before);
    assert_eq!(c.history().len(), 2);
    assert!(c.history().can_undo());
    assert_eq!(c.history().current().unwrap().version, u64::MAX);
}
