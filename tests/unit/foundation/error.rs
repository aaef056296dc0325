use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        EditError::not_found("x")
            .to_string()
            .contains("not found:")
    );
    assert!(
        EditError::invalid_range("x")
            .to_string()
            .contains("invalid range:")
    );
    assert!(
        EditError::invalid_property("x")
            .to_string()
            .contains("invalid property:")
    );
    assert!(
        EditError::invalid_selector("x")
            .to_string()
            .contains("invalid selector:")
    );
    assert!(
        EditError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn kinds_serialize_kebab_case() {
    let err = EditError::VersionConflict {
        expected: 3,
        actual: 4,
    };
    assert_eq!(err.kind(), ErrorKind::VersionConflict);
    assert_eq!(
        serde_json::to_string(&err.kind()).unwrap(),
        "\"version-conflict\""
    );
    assert!(err.to_string().contains("expected 3, found 4"));
}

#[test]
fn ambiguity_exposes_options() {
    let err = EditError::AmbiguousSelector { options: vec![] };
    assert_eq!(err.disambiguation_options().map(|o| o.len()), Some(0));
    assert!(EditError::NothingToUndo.disambiguation_options().is_none());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = EditError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert_eq!(err.kind(), ErrorKind::Other);
}
