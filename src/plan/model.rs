use crate::{
    animation::anim::Animation,
    foundation::error::{EditError, EditResult},
    selector::resolve::Selector,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// The four structural operations the engine supports.
pub enum OperationKind {
    /// Place a new element from an asset.
    Add,
    /// Change label/timing/properties/animations of existing elements.
    Update,
    /// Remove elements.
    Delete,
    /// Change timing and/or layer position of existing elements.
    Move,
}

impl OperationKind {
    /// Lowercase operation name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Move => "move",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
/// Payload of an edit. Numeric fields are signed so out-of-range planner output is reported as
/// [`EditError::InvalidRange`] instead of failing to parse.
pub struct Changes {
    /// New label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// New start frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<i64>,
    /// New duration in frames.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_in_frames: Option<i64>,
    /// Shallow properties patch; keys must be valid for the element type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Map<String, serde_json::Value>>,
    /// Full replacement of the animation for `animation.property`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,
    /// Drop the animation on this property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_animation: Option<String>,
    /// Target layer index (0-based). Used by `move`, and by `add` to insert instead of append.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
}

impl Changes {
    /// Whether nothing is set.
    pub fn is_empty(&self) -> bool {
        self.label.is_none()
            && self.from.is_none()
            && self.duration_in_frames.is_none()
            && self.properties.as_ref().is_none_or(|p| p.is_empty())
            && self.animation.is_none()
            && self.remove_animation.is_none()
            && self.position.is_none()
    }

    /// Whether only `from` / `durationInFrames` / `position` are set (the `move` subset).
    pub fn is_move_only(&self) -> bool {
        self.label.is_none()
            && self.properties.as_ref().is_none_or(|p| p.is_empty())
            && self.animation.is_none()
            && self.remove_animation.is_none()
    }

    /// Validated `from`, if set.
    pub fn from_frame(&self) -> EditResult<Option<u64>> {
        self.from
            .map(|f| {
                u64::try_from(f)
                    .map_err(|_| EditError::invalid_range(format!("from must be >= 0, got {f}")))
            })
            .transpose()
    }

    /// Validated `durationInFrames`, if set.
    pub fn duration_frames(&self) -> EditResult<Option<u64>> {
        self.duration_in_frames
            .map(|d| {
                if d <= 0 {
                    return Err(EditError::invalid_range(format!(
                        "durationInFrames must be > 0, got {d}"
                    )));
                }
                Ok(d as u64)
            })
            .transpose()
    }

    /// Validated layer position against a layer count of `len`, if set.
    ///
    /// `inclusive_end` allows `position == len` (append slot, used by `add`).
    pub fn layer_position(&self, len: usize, inclusive_end: bool) -> EditResult<Option<usize>> {
        let Some(p) = self.position else {
            return Ok(None);
        };
        let limit = if inclusive_end { len } else { len.saturating_sub(1) };
        match usize::try_from(p) {
            Ok(p) if p <= limit && (inclusive_end || len > 0) => Ok(Some(p)),
            _ => Err(EditError::invalid_range(format!(
                "position must be within [0, {limit}], got {p}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Structured instruction produced by the planner.
pub struct EditPlan {
    /// Operation to perform.
    pub operation: OperationKind,
    /// Target elements (update/delete/move).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<Selector>,
    /// Source asset (add).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    /// Operation payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<Changes>,
}

impl EditPlan {
    /// Parse planner output, reporting any shape problem (including an unsupported operation
    /// kind) as [`EditError::InvalidPlan`].
    pub fn from_json_str(s: &str) -> EditResult<Self> {
        serde_json::from_str(s).map_err(|e| EditError::invalid_plan(e.to_string()))
    }

    /// Parse planner output from an already-decoded JSON value.
    pub fn from_value(v: serde_json::Value) -> EditResult<Self> {
        serde_json::from_value(v).map_err(|e| EditError::invalid_plan(e.to_string()))
    }

    /// Same plan with its selector replaced; used to re-issue after disambiguation.
    pub fn with_selector(&self, selector: Selector) -> Self {
        Self {
            selector: Some(selector),
            ..self.clone()
        }
    }

    /// Payload or an empty one.
    pub fn changes_or_default(&self) -> Changes {
        self.changes.clone().unwrap_or_default()
    }
}
