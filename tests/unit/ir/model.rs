use super::*;
use crate::animation::{anim::Keyframe, ease::Ease};

fn text(id: &str, label: Option<&str>, from: u64, dur: u64) -> Element {
    Element {
        id: ElementId::new(id),
        label: label.map(str::to_string),
        from,
        duration_in_frames: dur,
        properties: Properties::default_for(ElementKind::Text, ""),
        animations: vec![],
    }
}

fn video(id: &str, from: u64, dur: u64) -> Element {
    Element {
        id: ElementId::new(id),
        label: Some("clip".to_string()),
        from,
        duration_in_frames: dur,
        properties: Properties::default_for(ElementKind::Video, "https://cdn.test/a.mp4"),
        animations: vec![],
    }
}

#[test]
fn json_roundtrip_keeps_layer_order_and_type_tag() {
    let mut ir = CompositionIR::new(Settings::default());
    ir.elements.push(video("v1", 0, 90));
    ir.elements.push(text("t1", Some("Title"), 10, 30));

    let s = serde_json::to_string_pretty(&ir).unwrap();
    assert!(s.contains("\"durationInFrames\": 90"));
    assert!(s.contains("\"type\": \"video\""));
    assert!(s.contains("\"playbackRate\": 1.0"));

    let de: CompositionIR = serde_json::from_str(&s).unwrap();
    assert_eq!(de, ir);
    assert_eq!(de.elements[1].kind(), ElementKind::Text);
}

#[test]
fn properties_fill_defaults_from_minimal_json() {
    let el: Element = serde_json::from_str(
        r#"{ "id": "a", "from": 0, "durationInFrames": 5,
             "properties": { "type": "audio", "src": "https://cdn.test/a.wav" } }"#,
    )
    .unwrap();
    let Properties::Audio(p) = &el.properties else {
        panic!("expected audio properties");
    };
    assert_eq!(p.volume, 1.0);
    assert_eq!(p.playback_rate, 1.0);
    assert!(!p.muted);
    assert!(el.label.is_none());
    assert!(el.animations.is_empty());
}

#[test]
fn patch_accepts_known_keys_only() {
    let props = Properties::default_for(ElementKind::Video, "https://cdn.test/a.mp4");

    let mut patch = serde_json::Map::new();
    patch.insert("volume".to_string(), serde_json::json!(0.25));
    patch.insert("fit".to_string(), serde_json::json!("cover"));
    let out = props.patched(&patch).unwrap();
    let Properties::Video(v) = &out else {
        panic!("expected video properties");
    };
    assert_eq!(v.volume, 0.25);
    assert_eq!(v.fit, FitMode::Cover);
    assert_ne!(out, props);

    let mut bad = serde_json::Map::new();
    bad.insert("fontSizePx".to_string(), serde_json::json!(12));
    let err = props.patched(&bad).unwrap_err();
    assert!(matches!(err, EditError::InvalidProperty(_)));

    let mut retag = serde_json::Map::new();
    retag.insert("type".to_string(), serde_json::json!("audio"));
    assert!(props.patched(&retag).is_err());
}

#[test]
fn patch_rejects_wrong_value_types() {
    let props = Properties::default_for(ElementKind::Text, "");
    let mut patch = serde_json::Map::new();
    patch.insert("fontSizePx".to_string(), serde_json::json!("huge"));
    assert!(matches!(
        props.patched(&patch),
        Err(EditError::InvalidProperty(_))
    ));
}

#[test]
fn property_keys_match_serialized_fields() {
    for kind in [
        ElementKind::Video,
        ElementKind::Audio,
        ElementKind::Image,
        ElementKind::Text,
        ElementKind::Shape,
    ] {
        let obj = Properties::default_for(kind, "src").to_object().unwrap();
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        let mut expected = kind.property_keys().to_vec();
        keys.sort_unstable();
        expected.sort_unstable();
        assert_eq!(keys, expected, "{kind}");
    }
}

#[test]
fn domain_violations_name_the_key() {
    let mut props = Properties::default_for(ElementKind::Video, "https://cdn.test/a.mp4");
    assert!(props.domain_violations().is_empty());
    if let Properties::Video(v) = &mut props {
        v.volume = 1.5;
        v.playback_rate = 0.1;
    }
    let keys: Vec<&str> = props.domain_violations().iter().map(|(k, _)| *k).collect();
    assert_eq!(keys, vec!["volume", "playbackRate"]);
}

#[test]
fn set_animation_replaces_same_property_only() {
    let mut el = text("t", None, 0, 30);
    let fade = Animation::new(
        "opacity",
        vec![Keyframe::new(0, 0.0), Keyframe::new(10, 1.0)],
        Ease::Linear,
    );
    let slide = Animation::new(
        "x",
        vec![Keyframe::new(0, 0.0), Keyframe::new(30, 200.0)],
        Ease::EaseOut,
    );
    assert!(el.set_animation(fade.clone()).is_none());
    assert!(el.set_animation(slide.clone()).is_none());

    let mut fade2 = fade.clone();
    fade2.easing = Ease::EaseIn;
    assert_eq!(el.set_animation(fade2.clone()), Some(fade));
    assert_eq!(el.animations.len(), 2);
    assert_eq!(el.animation("x"), Some(&slide));
    assert_eq!(el.animation("opacity"), Some(&fade2));

    assert_eq!(el.remove_animation("x"), Some(slide));
    assert!(el.remove_animation("x").is_none());
}

#[test]
fn timing_helpers() {
    let mut ir = CompositionIR::new(Settings::default());
    assert_eq!(ir.append_frame(), 0);
    ir.elements.push(video("v1", 0, 100));
    ir.elements.push(text("t1", None, 10, 20));
    assert_eq!(ir.append_frame(), 30);
    assert_eq!(ir.end_frame(), 100);
    ir.refresh_duration();
    assert_eq!(ir.settings.duration_in_frames, 100);

    let el = &ir.elements[1];
    assert!(!el.is_visible_at(9));
    assert!(el.is_visible_at(10));
    assert!(!el.is_visible_at(30));
    assert_eq!(ir.position_of(&ElementId::new("t1")), Some(1));
    assert!(!ir.contains(&ElementId::new("nope")));
}
