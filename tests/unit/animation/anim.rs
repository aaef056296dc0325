use super::*;

fn fade() -> Animation {
    Animation::new(
        "opacity",
        vec![Keyframe::new(0, 0.0), Keyframe::new(10, 1.0)],
        Ease::Linear,
    )
}

#[test]
fn validate_accepts_two_increasing_keys() {
    fade().validate().unwrap();
}

#[test]
fn validate_rejects_single_key() {
    let mut a = fade();
    a.keyframes.truncate(1);
    let err = a.validate().unwrap_err();
    assert!(err.to_string().contains("at least 2 keyframes"));
}

#[test]
fn validate_rejects_duplicate_frames() {
    let a = Animation::new(
        "x",
        vec![Keyframe::new(5, 0.0), Keyframe::new(5, 1.0)],
        Ease::Linear,
    );
    assert!(a.validate().is_err());
}

#[test]
fn validate_rejects_empty_property_and_nan() {
    let mut a = fade();
    a.property = " ".to_string();
    assert!(a.validate().is_err());

    let mut a = fade();
    a.keyframes[1].value = f64::NAN;
    assert!(a.validate().is_err());
}

#[test]
fn sample_holds_outside_and_interpolates_inside() {
    let a = fade();
    assert_eq!(a.sample(0), Some(0.0));
    assert_eq!(a.sample(5), Some(0.5));
    assert_eq!(a.sample(10), Some(1.0));
    assert_eq!(a.sample(99), Some(1.0));
}

#[test]
fn sample_uses_segment_easing() {
    let mut a = Animation::new(
        "scale",
        vec![
            Keyframe::new(0, 1.0),
            Keyframe::new(10, 2.0),
            Keyframe::new(20, 0.0),
        ],
        Ease::EaseIn,
    );
    assert_eq!(a.sample(10), Some(2.0));
    assert_eq!(a.sample(15), Some(2.0 - 2.0 * 0.25));

    a.keyframes.clear();
    assert_eq!(a.sample(3), None);
}

#[test]
fn value_bounds_span_all_keys() {
    let a = Animation::new(
        "x",
        vec![
            Keyframe::new(0, 3.0),
            Keyframe::new(4, -1.0),
            Keyframe::new(8, 7.5),
        ],
        Ease::Linear,
    );
    assert_eq!(a.value_bounds(), Some((-1.0, 7.5)));
}

#[test]
fn json_uses_camel_case_and_default_easing() {
    let a: Animation = serde_json::from_str(
        r#"{ "property": "opacity", "keyframes": [{"frame":0,"value":0},{"frame":3,"value":1}] }"#,
    )
    .unwrap();
    assert_eq!(a.easing, Ease::Linear);
    assert_eq!(a.keyframes.len(), 2);
}
