use super::*;
use crate::foundation::core::ElementId;
use crate::ir::model::{Element, ElementKind, Properties, Settings};

fn ir_with(n: usize) -> CompositionIR {
    let mut ir = CompositionIR::new(Settings::default());
    for i in 0..n {
        ir.elements.push(Element {
            id: ElementId::new(format!("s{i}")),
            label: None,
            from: 0,
            duration_in_frames: 10,
            properties: Properties::default_for(ElementKind::Shape, ""),
            animations: vec![],
        });
    }
    ir
}

#[test]
fn empty_history_has_nothing_to_step() {
    let mut h = History::new(5);
    assert!(h.is_empty());
    assert!(matches!(h.undo(), Err(EditError::NothingToUndo)));
    assert!(matches!(h.redo(), Err(EditError::NothingToRedo)));
    assert!(h.current().is_none());
}

#[test]
fn undo_redo_walk_the_snapshots() {
    let mut h = History::new(10);
    h.record(ir_with(0), 0, "Initial state");
    h.record(ir_with(1), 1, "one");
    h.record(ir_with(2), 2, "two");

    assert_eq!(h.undo().unwrap().version, 1);
    assert_eq!(h.undo().unwrap().ir, ir_with(0));
    assert!(matches!(h.undo(), Err(EditError::NothingToUndo)));

    assert_eq!(h.redo().unwrap().description, "one");
    assert_eq!(h.redo().unwrap().version, 2);
    assert!(matches!(h.redo(), Err(EditError::NothingToRedo)));
}

#[test]
fn recording_after_undo_drops_redo_branch() {
    let mut h = History::new(10);
    h.record(ir_with(0), 0, "Initial state");
    h.record(ir_with(1), 1, "one");
    h.record(ir_with(2), 2, "two");
    h.undo().unwrap();
    h.undo().unwrap();

    h.record(ir_with(3), 5, "branch");
    assert_eq!(h.len(), 2);
    assert!(!h.can_redo());
    assert!(matches!(h.restore(2), Err(EditError::NotFound(_))));
    assert_eq!(h.current().unwrap().version, 5);
}

#[test]
fn cap_evicts_oldest() {
    let mut h = History::new(50);
    for v in 0..=50u64 {
        h.record(ir_with(v as usize), v, format!("edit {v}"));
    }
    assert_eq!(h.len(), 50);

    let undone = (0..50).filter(|_| h.undo().is_ok()).count();
    assert_eq!(undone, 49);
    assert_eq!(h.current().unwrap().version, 1);
    assert!(matches!(h.restore(0), Err(EditError::NotFound(_))));
}

#[test]
fn restore_keeps_later_snapshots() {
    let mut h = History::new(10);
    h.record(ir_with(0), 0, "Initial state");
    h.record(ir_with(1), 1, "one");
    h.record(ir_with(2), 2, "two");

    assert_eq!(h.restore(0).unwrap().ir, ir_with(0));
    assert!(h.can_redo());
    assert_eq!(h.len(), 3);
    assert_eq!(h.restore(2).unwrap().ir.elements.len(), 2);
    assert!(matches!(h.restore(42), Err(EditError::NotFound(_))));
}

#[test]
fn zero_cap_is_clamped() {
    let mut h = History::new(0);
    assert_eq!(h.cap(), 1);
    h.record(ir_with(0), 0, "a");
    h.record(ir_with(1), 1, "b");
    assert_eq!(h.len(), 1);
    assert!(!h.can_undo());
}
