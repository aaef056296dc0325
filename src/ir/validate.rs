use std::collections::HashSet;
use std::fmt;

use crate::{
    foundation::core::is_hex_color,
    foundation::error::{EditError, EditResult},
    ir::model::{CompositionIR, Element},
};

#[derive(Debug, Clone, PartialEq, Eq)]
/// One step of a JSON path into the IR.
pub enum PathElem {
    /// Object field.
    Field(&'static str),
    /// Array index.
    Index(usize),
    /// Object field with a dynamic name (property keys, animation names).
    Key(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Class of invariant a violation breaks.
pub enum ViolationKind {
    /// Two elements share an id.
    DuplicateId,
    /// `from` / `durationInFrames` / settings timing out of range.
    Timing,
    /// Animation structure (key count, ordering, property name).
    Animation,
    /// Property value outside its documented domain.
    Property,
    /// Global settings (fps, canvas, background).
    Settings,
}

#[derive(Debug, Clone, PartialEq)]
/// A single invariant violation with its location.
pub struct Violation {
    /// Location inside the IR.
    pub path: Vec<PathElem>,
    /// Class of invariant.
    pub kind: ViolationKind,
    /// Human-readable explanation including the offending value.
    pub message: String,
}

impl Violation {
    fn at(path: Vec<PathElem>, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            path,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            return write!(f, "{}", self.message);
        }
        write!(f, "{}: {}", format_path(&self.path), self.message)
    }
}

fn format_path(path: &[PathElem]) -> String {
    let mut s = String::from("$");
    for p in path {
        match p {
            PathElem::Field(name) => {
                s.push('.');
                s.push_str(name);
            }
            PathElem::Key(name) => {
                s.push('.');
                s.push_str(name);
            }
            PathElem::Index(i) => {
                s.push('[');
                s.push_str(&i.to_string());
                s.push(']');
            }
        }
    }
    s
}

/// Check every IR invariant and collect all violations (empty = valid).
pub fn validate_ir(ir: &CompositionIR) -> Vec<Violation> {
    let mut out = Vec::new();
    validate_settings(ir, &mut out);

    let mut seen = HashSet::new();
    for (i, el) in ir.elements.iter().enumerate() {
        let base = vec![PathElem::Field("elements"), PathElem::Index(i)];
        if !seen.insert(&el.id) {
            out.push(Violation::at(
                with(&base, PathElem::Field("id")),
                ViolationKind::DuplicateId,
                format!("duplicate element id '{}'", el.id),
            ));
        }
        if el.id.as_str().trim().is_empty() {
            out.push(Violation::at(
                with(&base, PathElem::Field("id")),
                ViolationKind::DuplicateId,
                "element id must be non-empty",
            ));
        }
        validate_element(el, &base, &mut out);
    }
    out
}

/// Run [`validate_ir`] and turn the first violation into a typed error.
///
/// Property-domain violations map to [`EditError::InvalidProperty`]; everything else maps to
/// [`EditError::InvalidRange`].
pub fn ensure_valid(ir: &CompositionIR) -> EditResult<()> {
    let violations = validate_ir(ir);
    match violations.first() {
        None => Ok(()),
        Some(v) if v.kind == ViolationKind::Property => {
            Err(EditError::invalid_property(v.to_string()))
        }
        Some(v) => Err(EditError::invalid_range(v.to_string())),
    }
}

fn with(base: &[PathElem], last: PathElem) -> Vec<PathElem> {
    let mut p = base.to_vec();
    p.push(last);
    p
}

fn validate_settings(ir: &CompositionIR, out: &mut Vec<Violation>) {
    let s = &ir.settings;
    let base = vec![PathElem::Field("settings")];
    if s.fps.num == 0 || s.fps.den == 0 {
        out.push(Violation::at(
            with(&base, PathElem::Field("fps")),
            ViolationKind::Settings,
            "fps must have num > 0 and den > 0",
        ));
    }
    if s.canvas.width == 0 || s.canvas.height == 0 {
        out.push(Violation::at(
            with(&base, PathElem::Field("canvas")),
            ViolationKind::Settings,
            "canvas width/height must be > 0",
        ));
    }
    if s.duration_in_frames == 0 {
        out.push(Violation::at(
            with(&base, PathElem::Field("durationInFrames")),
            ViolationKind::Timing,
            "durationInFrames must be > 0",
        ));
    }
    if !is_hex_color(&s.background) {
        out.push(Violation::at(
            with(&base, PathElem::Field("background")),
            ViolationKind::Settings,
            format!("background must be #rrggbb or #rrggbbaa, got '{}'", s.background),
        ));
    }
}

fn validate_element(el: &Element, base: &[PathElem], out: &mut Vec<Violation>) {
    if el.duration_in_frames == 0 {
        out.push(Violation::at(
            with(base, PathElem::Field("durationInFrames")),
            ViolationKind::Timing,
            format!("element '{}': durationInFrames must be > 0", el.id),
        ));
    }
    if el.from.checked_add(el.duration_in_frames).is_none() {
        out.push(Violation::at(
            with(base, PathElem::Field("from")),
            ViolationKind::Timing,
            format!("element '{}': from + durationInFrames overflows", el.id),
        ));
    }
    if let Some(label) = &el.label
        && label.trim().is_empty()
    {
        out.push(Violation::at(
            with(base, PathElem::Field("label")),
            ViolationKind::Property,
            format!("element '{}': label must be non-empty when set", el.id),
        ));
    }

    let props_base = with(base, PathElem::Field("properties"));
    for (key, message) in el.properties.domain_violations() {
        out.push(Violation::at(
            with(&props_base, PathElem::Key(key.to_string())),
            ViolationKind::Property,
            format!("element '{}': {message}", el.id),
        ));
    }

    let kind = el.kind();
    let mut animated = HashSet::new();
    for (ai, anim) in el.animations.iter().enumerate() {
        let path = vec![
            base[0].clone(),
            base[1].clone(),
            PathElem::Field("animations"),
            PathElem::Index(ai),
        ];
        if let Err(e) = anim.validate() {
            out.push(Violation::at(
                path.clone(),
                ViolationKind::Animation,
                format!("element '{}': {}", el.id, strip_prefix(&e)),
            ));
        }
        if !kind.animatable().contains(&anim.property.as_str()) {
            out.push(Violation::at(
                path.clone(),
                ViolationKind::Property,
                format!(
                    "element '{}': '{}' is not animatable on {kind}",
                    el.id, anim.property
                ),
            ));
        }
        if !animated.insert(anim.property.as_str()) {
            out.push(Violation::at(
                path.clone(),
                ViolationKind::Animation,
                format!(
                    "element '{}': more than one animation targets '{}'",
                    el.id, anim.property
                ),
            ));
        }
        if matches!(anim.property.as_str(), "opacity" | "volume")
            && let Some((lo, hi)) = anim.value_bounds()
            && (lo < 0.0 || hi > 1.0)
        {
            out.push(Violation::at(
                path,
                ViolationKind::Property,
                format!(
                    "element '{}': '{}' keyframe values must be within [0, 1]",
                    el.id, anim.property
                ),
            ));
        }
    }
}

fn strip_prefix(e: &EditError) -> String {
    match e {
        EditError::InvalidRange(m) | EditError::InvalidProperty(m) => m.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ir/validate.rs"]
mod tests;
