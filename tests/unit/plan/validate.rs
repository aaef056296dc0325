use super::*;
use crate::animation::{anim::Animation, anim::Keyframe, ease::Ease};
use crate::assets::catalog::{AssetStatus, InMemoryAssets};
use crate::foundation::core::ElementId;
use crate::ir::model::{Element, Settings};
use crate::selector::resolve::Selector;

fn asset(id: &str, status: AssetStatus) -> AssetInfo {
    AssetInfo {
        id: id.to_string(),
        kind: ElementKind::Video,
        status,
        src: format!("https://cdn.test/{id}.mp4"),
        duration_in_frames: Some(90),
        duration_sec: None,
        default_properties: serde_json::Map::new(),
    }
}

fn catalog() -> InMemoryAssets {
    InMemoryAssets::new()
        .with(asset("ready", AssetStatus::Ready))
        .with(asset("busy", AssetStatus::Processing))
}

fn ir_with(n: usize) -> CompositionIR {
    let mut ir = CompositionIR::new(Settings::default());
    for i in 0..n {
        ir.elements.push(Element {
            id: ElementId::new(format!("e{i}")),
            label: None,
            from: 0,
            duration_in_frames: 10,
            properties: Properties::default_for(ElementKind::Shape, ""),
            animations: vec![],
        });
    }
    ir.refresh_duration();
    ir
}

fn plan(operation: OperationKind) -> EditPlan {
    EditPlan {
        operation,
        selector: None,
        asset_id: None,
        changes: None,
    }
}

#[test]
fn add_requires_ready_known_asset() {
    let ir = ir_with(0);
    let assets = catalog();

    let mut p = plan(OperationKind::Add);
    assert!(matches!(
        validate_plan(&p, &ir, &assets),
        Err(EditError::InvalidPlan(_))
    ));

    p.asset_id = Some("missing".to_string());
    assert!(matches!(
        validate_plan(&p, &ir, &assets),
        Err(EditError::NotFound(_))
    ));

    p.asset_id = Some("busy".to_string());
    assert!(matches!(
        validate_plan(&p, &ir, &assets),
        Err(EditError::AssetNotReady(_))
    ));

    p.asset_id = Some("ready".to_string());
    let found = validate_plan(&p, &ir, &assets).unwrap();
    assert_eq!(found.map(|a| a.id), Some("ready".to_string()));
}

#[test]
fn add_rejects_keys_foreign_to_asset_type() {
    let ir = ir_with(0);
    let mut p = plan(OperationKind::Add);
    p.asset_id = Some("ready".to_string());
    let mut props = serde_json::Map::new();
    props.insert("fontFamily".to_string(), serde_json::json!("Inter"));
    p.changes = Some(Changes {
        properties: Some(props),
        ..Changes::default()
    });
    assert!(matches!(
        validate_plan(&p, &ir, &catalog()),
        Err(EditError::InvalidProperty(_))
    ));
}

#[test]
fn update_needs_selector_and_changes() {
    let ir = ir_with(2);
    let assets = catalog();

    let mut p = plan(OperationKind::Update);
    assert!(matches!(
        validate_plan(&p, &ir, &assets),
        Err(EditError::InvalidSelector(_))
    ));

    p.selector = Some(Selector::Label { label: None });
    assert!(matches!(
        validate_plan(&p, &ir, &assets),
        Err(EditError::InvalidSelector(_))
    ));

    p.selector = Some(Selector::id("e0"));
    assert!(matches!(
        validate_plan(&p, &ir, &assets),
        Err(EditError::InvalidPlan(_))
    ));

    p.changes = Some(Changes {
        label: Some("hero".to_string()),
        ..Changes::default()
    });
    assert!(validate_plan(&p, &ir, &assets).unwrap().is_none());
}

#[test]
fn numeric_ranges_fail_fast() {
    let ir = ir_with(2);
    let assets = catalog();
    let mut p = plan(OperationKind::Update);
    p.selector = Some(Selector::id("e0"));

    p.changes = Some(Changes {
        duration_in_frames: Some(0),
        ..Changes::default()
    });
    assert!(matches!(
        validate_plan(&p, &ir, &assets),
        Err(EditError::InvalidRange(_))
    ));

    p.changes = Some(Changes {
        from: Some(-1),
        ..Changes::default()
    });
    assert!(matches!(
        validate_plan(&p, &ir, &assets),
        Err(EditError::InvalidRange(_))
    ));

    let mut props = serde_json::Map::new();
    props.insert("volume".to_string(), serde_json::json!(3.0));
    p.changes = Some(Changes {
        properties: Some(props),
        ..Changes::default()
    });
    assert!(matches!(
        validate_plan(&p, &ir, &assets),
        Err(EditError::InvalidProperty(_))
    ));

    let mut props = serde_json::Map::new();
    props.insert("sparkle".to_string(), serde_json::json!(true));
    p.changes = Some(Changes {
        properties: Some(props),
        ..Changes::default()
    });
    assert!(matches!(
        validate_plan(&p, &ir, &assets),
        Err(EditError::InvalidProperty(_))
    ));
}

#[test]
fn broken_animation_is_rejected_up_front() {
    let ir = ir_with(1);
    let mut p = plan(OperationKind::Update);
    p.selector = Some(Selector::id("e0"));
    p.changes = Some(Changes {
        animation: Some(Animation::new(
            "opacity",
            vec![Keyframe::new(4, 0.0)],
            Ease::Linear,
        )),
        ..Changes::default()
    });
    assert!(matches!(
        validate_plan(&p, &ir, &catalog()),
        Err(EditError::InvalidRange(_))
    ));
}

#[test]
fn move_accepts_only_timing_and_position() {
    let ir = ir_with(4);
    let assets = catalog();
    let mut p = plan(OperationKind::Move);
    p.selector = Some(Selector::id("e3"));

    p.changes = None;
    assert!(matches!(
        validate_plan(&p, &ir, &assets),
        Err(EditError::InvalidPlan(_))
    ));

    p.changes = Some(Changes {
        label: Some("x".to_string()),
        position: Some(0),
        ..Changes::default()
    });
    assert!(matches!(
        validate_plan(&p, &ir, &assets),
        Err(EditError::InvalidPlan(_))
    ));

    p.changes = Some(Changes {
        position: Some(4),
        ..Changes::default()
    });
    assert!(matches!(
        validate_plan(&p, &ir, &assets),
        Err(EditError::InvalidRange(_))
    ));

    p.changes = Some(Changes {
        position: Some(0),
        ..Changes::default()
    });
    validate_plan(&p, &ir, &assets).unwrap();
}

#[test]
fn delete_only_needs_a_selector() {
    let ir = ir_with(1);
    let mut p = plan(OperationKind::Delete);
    assert!(validate_plan(&p, &ir, &catalog()).is_err());
    p.selector = Some(Selector::label("anything"));
    validate_plan(&p, &ir, &catalog()).unwrap();
}
