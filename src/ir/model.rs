use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::{
    animation::anim::Animation,
    foundation::core::{Canvas, ElementId, Fps, is_hex_color},
    foundation::error::{EditError, EditResult},
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Full timeline state of a composition at one version.
///
/// The IR is a pure data document:
/// - `elements` order is the authoritative layer (render) order, first = bottom
/// - element ids are unique and never reused
/// - every edit produces a new IR; an IR handed to a consumer is never mutated
pub struct CompositionIR {
    /// Global settings.
    pub settings: Settings,
    /// Placed elements in layer order.
    #[serde(default)]
    pub elements: Vec<Element>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Global composition settings.
pub struct Settings {
    /// Timeline frame rate.
    pub fps: Fps,
    /// Output canvas dimensions.
    pub canvas: Canvas,
    /// Total duration in frames; tracks the end of the last-ending element (minimum 1).
    pub duration_in_frames: u64,
    /// Background colour as `#rrggbb` / `#rrggbbaa`.
    #[serde(default = "default_background")]
    pub background: String,
}

fn default_background() -> String {
    "#000000".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps: Fps::default(),
            canvas: Canvas::default(),
            duration_in_frames: 1,
            background: default_background(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// A placed unit on the timeline.
pub struct Element {
    /// Immutable identifier.
    pub id: ElementId,
    /// Optional user-facing label used by label selectors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Start frame on the composition timeline.
    pub from: u64,
    /// Length in frames, > 0.
    pub duration_in_frames: u64,
    /// Type-specific properties; the variant determines the element type.
    pub properties: Properties,
    /// Keyframed animations, at most one per property.
    #[serde(default)]
    pub animations: Vec<Animation>,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
/// Element type.
pub enum ElementKind {
    /// Video clip.
    Video,
    /// Audio clip.
    Audio,
    /// Still image.
    Image,
    /// Text block.
    Text,
    /// Vector shape.
    Shape,
}

impl ElementKind {
    /// Lowercase type name as used in JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Image => "image",
            Self::Text => "text",
            Self::Shape => "shape",
        }
    }

    /// Property keys valid for this type (JSON names).
    pub fn property_keys(self) -> &'static [&'static str] {
        match self {
            Self::Video => &["src", "volume", "playbackRate", "opacity", "fit", "muted"],
            Self::Audio => &["src", "volume", "playbackRate", "muted"],
            Self::Image => &["src", "opacity", "fit"],
            Self::Text => &["text", "fontFamily", "fontSizePx", "color", "opacity"],
            Self::Shape => &["shape", "color", "opacity"],
        }
    }

    /// Property names that may carry an animation on this type.
    pub fn animatable(self) -> &'static [&'static str] {
        match self {
            Self::Video => &["x", "y", "scale", "rotation", "opacity", "volume"],
            Self::Audio => &["volume"],
            Self::Image | Self::Text | Self::Shape => &["x", "y", "scale", "rotation", "opacity"],
        }
    }

    /// Whether elements of this type have an intrinsic media duration.
    pub fn is_timed_media(self) -> bool {
        matches!(self, Self::Video | Self::Audio)
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// How visual media fits the canvas.
pub enum FitMode {
    /// Scale to fit entirely inside the canvas.
    #[default]
    Contain,
    /// Scale to cover the canvas, cropping overflow.
    Cover,
    /// Stretch to the canvas.
    Fill,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Shape primitive.
pub enum ShapeKind {
    /// Axis-aligned rectangle.
    #[default]
    Rect,
    /// Ellipse.
    Ellipse,
}

fn one() -> f64 {
    1.0
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Video element properties.
pub struct VideoProps {
    /// Playable media URL.
    pub src: String,
    /// Audio volume in `[0, 1]`.
    #[serde(default = "one")]
    pub volume: f64,
    /// Playback speed in `[0.25, 4]`.
    #[serde(default = "one")]
    pub playback_rate: f64,
    /// Opacity in `[0, 1]`.
    #[serde(default = "one")]
    pub opacity: f64,
    /// Fit mode.
    #[serde(default)]
    pub fit: FitMode,
    /// Silence the audio track.
    #[serde(default)]
    pub muted: bool,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Audio element properties.
pub struct AudioProps {
    /// Playable media URL.
    pub src: String,
    /// Volume in `[0, 1]`.
    #[serde(default = "one")]
    pub volume: f64,
    /// Playback speed in `[0.25, 4]`.
    #[serde(default = "one")]
    pub playback_rate: f64,
    /// Silence the element.
    #[serde(default)]
    pub muted: bool,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Image element properties.
pub struct ImageProps {
    /// Image URL.
    pub src: String,
    /// Opacity in `[0, 1]`.
    #[serde(default = "one")]
    pub opacity: f64,
    /// Fit mode.
    #[serde(default)]
    pub fit: FitMode,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Text element properties.
pub struct TextProps {
    /// UTF-8 text content.
    pub text: String,
    /// Font family name.
    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// Font size in pixels, > 0.
    #[serde(default = "default_font_size_px")]
    pub font_size_px: f64,
    /// Text colour.
    #[serde(default = "default_text_color")]
    pub color: String,
    /// Opacity in `[0, 1]`.
    #[serde(default = "one")]
    pub opacity: f64,
}

fn default_font_family() -> String {
    "Inter".to_string()
}

fn default_font_size_px() -> f64 {
    48.0
}

fn default_text_color() -> String {
    "#ffffff".to_string()
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Shape element properties.
pub struct ShapeProps {
    /// Primitive.
    #[serde(default)]
    pub shape: ShapeKind,
    /// Fill colour.
    #[serde(default = "default_text_color")]
    pub color: String,
    /// Opacity in `[0, 1]`.
    #[serde(default = "one")]
    pub opacity: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
/// Type-specific property bag. The variant is the element type.
pub enum Properties {
    /// Video properties.
    Video(VideoProps),
    /// Audio properties.
    Audio(AudioProps),
    /// Image properties.
    Image(ImageProps),
    /// Text properties.
    Text(TextProps),
    /// Shape properties.
    Shape(ShapeProps),
}

impl Properties {
    /// Element type carried by this bag.
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Video(_) => ElementKind::Video,
            Self::Audio(_) => ElementKind::Audio,
            Self::Image(_) => ElementKind::Image,
            Self::Text(_) => ElementKind::Text,
            Self::Shape(_) => ElementKind::Shape,
        }
    }

    /// Baseline properties for a new element of `kind` backed by `src`.
    pub fn default_for(kind: ElementKind, src: &str) -> Self {
        match kind {
            ElementKind::Video => Self::Video(VideoProps {
                src: src.to_string(),
                volume: 1.0,
                playback_rate: 1.0,
                opacity: 1.0,
                fit: FitMode::default(),
                muted: false,
            }),
            ElementKind::Audio => Self::Audio(AudioProps {
                src: src.to_string(),
                volume: 1.0,
                playback_rate: 1.0,
                muted: false,
            }),
            ElementKind::Image => Self::Image(ImageProps {
                src: src.to_string(),
                opacity: 1.0,
                fit: FitMode::default(),
            }),
            ElementKind::Text => Self::Text(TextProps {
                text: "Text".to_string(),
                font_family: default_font_family(),
                font_size_px: default_font_size_px(),
                color: default_text_color(),
                opacity: 1.0,
            }),
            ElementKind::Shape => Self::Shape(ShapeProps {
                shape: ShapeKind::default(),
                color: default_text_color(),
                opacity: 1.0,
            }),
        }
    }

    /// JSON object view without the `type` tag.
    pub fn to_object(&self) -> EditResult<serde_json::Map<String, serde_json::Value>> {
        let value = serde_json::to_value(self)
            .map_err(|e| EditError::serde(format!("serialize properties: {e}")))?;
        let serde_json::Value::Object(mut obj) = value else {
            return Err(EditError::serde("properties did not serialize to an object"));
        };
        obj.remove("type");
        Ok(obj)
    }

    /// Apply a shallow patch, accepting only keys valid for this element type.
    ///
    /// Returns a new bag; `self` is untouched. Domain checks are not run here.
    pub fn patched(
        &self,
        patch: &serde_json::Map<String, serde_json::Value>,
    ) -> EditResult<Properties> {
        let kind = self.kind();
        let mut obj = self.to_object()?;
        for (key, value) in patch {
            if !kind.property_keys().contains(&key.as_str()) {
                return Err(EditError::invalid_property(format!(
                    "'{key}' is not a {kind} property"
                )));
            }
            obj.insert(key.clone(), value.clone());
        }
        obj.insert(
            "type".to_string(),
            serde_json::Value::String(kind.as_str().to_string()),
        );
        serde_json::from_value(serde_json::Value::Object(obj))
            .map_err(|e| EditError::invalid_property(format!("{kind} properties: {e}")))
    }

    /// Domain violations as `(key, message)` pairs; empty when every value is in range.
    pub fn domain_violations(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        match self {
            Self::Video(p) => {
                check_src(&p.src, &mut out);
                check_unit("volume", p.volume, &mut out);
                check_playback_rate(p.playback_rate, &mut out);
                check_unit("opacity", p.opacity, &mut out);
            }
            Self::Audio(p) => {
                check_src(&p.src, &mut out);
                check_unit("volume", p.volume, &mut out);
                check_playback_rate(p.playback_rate, &mut out);
            }
            Self::Image(p) => {
                check_src(&p.src, &mut out);
                check_unit("opacity", p.opacity, &mut out);
            }
            Self::Text(p) => {
                if p.text.is_empty() {
                    out.push(("text", "text must be non-empty".to_string()));
                }
                if p.font_family.trim().is_empty() {
                    out.push(("fontFamily", "fontFamily must be non-empty".to_string()));
                }
                if !p.font_size_px.is_finite() || p.font_size_px <= 0.0 {
                    out.push((
                        "fontSizePx",
                        format!("fontSizePx must be finite and > 0, got {}", p.font_size_px),
                    ));
                }
                check_color("color", &p.color, &mut out);
                check_unit("opacity", p.opacity, &mut out);
            }
            Self::Shape(p) => {
                check_color("color", &p.color, &mut out);
                check_unit("opacity", p.opacity, &mut out);
            }
        }
        out
    }
}

fn check_src(src: &str, out: &mut Vec<(&'static str, String)>) {
    if src.trim().is_empty() {
        out.push(("src", "src must be non-empty".to_string()));
    }
}

fn check_unit(key: &'static str, v: f64, out: &mut Vec<(&'static str, String)>) {
    if !v.is_finite() || !(0.0..=1.0).contains(&v) {
        out.push((key, format!("{key} must be within [0, 1], got {v}")));
    }
}

fn check_playback_rate(v: f64, out: &mut Vec<(&'static str, String)>) {
    if !v.is_finite() || !(0.25..=4.0).contains(&v) {
        out.push((
            "playbackRate",
            format!("playbackRate must be within [0.25, 4], got {v}"),
        ));
    }
}

fn check_color(key: &'static str, v: &str, out: &mut Vec<(&'static str, String)>) {
    if !is_hex_color(v) {
        out.push((key, format!("{key} must be #rrggbb or #rrggbbaa, got '{v}'")));
    }
}

impl Element {
    /// Element type.
    pub fn kind(&self) -> ElementKind {
        self.properties.kind()
    }

    /// Exclusive end frame.
    pub fn end(&self) -> u64 {
        self.from.saturating_add(self.duration_in_frames)
    }

    /// Whether the element is on screen at a composition frame.
    pub fn is_visible_at(&self, frame: u64) -> bool {
        self.from <= frame && frame < self.end()
    }

    /// Animation for `property`, if any.
    pub fn animation(&self, property: &str) -> Option<&Animation> {
        self.animations.iter().find(|a| a.property == property)
    }

    /// Insert or replace the animation for `anim.property`, leaving other properties alone.
    ///
    /// Returns the replaced animation.
    pub fn set_animation(&mut self, anim: Animation) -> Option<Animation> {
        match self
            .animations
            .iter_mut()
            .find(|a| a.property == anim.property)
        {
            Some(slot) => Some(std::mem::replace(slot, anim)),
            None => {
                self.animations.push(anim);
                None
            }
        }
    }

    /// Drop the animation for `property`, returning it.
    pub fn remove_animation(&mut self, property: &str) -> Option<Animation> {
        let idx = self.animations.iter().position(|a| a.property == property)?;
        Some(self.animations.remove(idx))
    }

    /// Label if set, otherwise the id.
    pub fn display_name(&self) -> String {
        match &self.label {
            Some(l) => format!("\"{l}\""),
            None => self.id.to_string(),
        }
    }
}

impl CompositionIR {
    /// Empty composition with the given settings.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            elements: Vec::new(),
        }
    }

    /// Parse an IR from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> EditResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| EditError::serde(format!("parse composition IR JSON: {e}")))
    }

    /// Parse an IR from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> EditResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            EditError::Other(anyhow::anyhow!(
                "open composition IR '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Element by id.
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| &e.id == id)
    }

    /// Mutable element by id.
    pub fn get_mut(&mut self, id: &ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| &e.id == id)
    }

    /// Layer index (0-based array position) of an element.
    pub fn position_of(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|e| &e.id == id)
    }

    /// Whether an id is in use.
    pub fn contains(&self, id: &ElementId) -> bool {
        self.get(id).is_some()
    }

    /// End frame of the element that ends last (0 when empty).
    pub fn end_frame(&self) -> u64 {
        self.elements.iter().map(Element::end).max().unwrap_or(0)
    }

    /// End frame of the last element in layer order; the append point for new elements.
    pub fn append_frame(&self) -> u64 {
        self.elements.last().map(Element::end).unwrap_or(0)
    }

    /// Recompute `settings.duration_in_frames` from the elements.
    pub fn refresh_duration(&mut self) {
        self.settings.duration_in_frames = self.end_frame().max(1);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ir/model.rs"]
mod tests;
