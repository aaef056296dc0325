use crate::selector::resolve::DisambiguationOption;

/// Convenience result type used across the editing engine.
pub type EditResult<T> = Result<T, EditError>;

/// Stable, machine-readable error kind reported alongside the message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Referenced element, asset, composition or version does not exist.
    NotFound,
    /// Selector matched several equally valid elements.
    AmbiguousSelector,
    /// Selector is missing a field its variant requires.
    InvalidSelector,
    /// Timing/position value outside its documented range.
    InvalidRange,
    /// Unknown property key or out-of-domain property value.
    InvalidProperty,
    /// Asset exists but is not playable yet.
    AssetNotReady,
    /// Optimistic concurrency check failed on commit.
    VersionConflict,
    /// History cursor already at the oldest snapshot.
    NothingToUndo,
    /// History cursor already at the newest snapshot.
    NothingToRedo,
    /// Edit plan is malformed or names an unsupported operation.
    InvalidPlan,
    /// Serialization or deserialization failure.
    Serde,
    /// Wrapped lower-level failure.
    Other,
}

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum EditError {
    /// Referenced element, asset, composition or version does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Selector matched more than one element; carries the choices to present.
    #[error("ambiguous selector: {} candidates", .options.len())]
    AmbiguousSelector {
        /// One option per candidate element, in IR order.
        options: Vec<DisambiguationOption>,
    },

    /// Selector is missing a field its variant requires.
    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    /// Timing/position value outside its documented range.
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// Unknown property key or out-of-domain property value.
    #[error("invalid property: {0}")]
    InvalidProperty(String),

    /// Asset exists but its status is not `ready`.
    #[error("asset not ready: {0}")]
    AssetNotReady(String),

    /// Stored version differs from the version the caller read.
    #[error("version conflict: expected {expected}, found {actual}")]
    VersionConflict {
        /// Version the caller based its edit on.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },

    /// No older snapshot to move back to.
    #[error("nothing to undo")]
    NothingToUndo,

    /// No newer snapshot to move forward to.
    #[error("nothing to redo")]
    NothingToRedo,

    /// Edit plan is malformed or names an unsupported operation.
    #[error("invalid plan: {0}")]
    InvalidPlan(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EditError {
    /// Build a [`EditError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`EditError::InvalidSelector`] value.
    pub fn invalid_selector(msg: impl Into<String>) -> Self {
        Self::InvalidSelector(msg.into())
    }

    /// Build a [`EditError::InvalidRange`] value.
    pub fn invalid_range(msg: impl Into<String>) -> Self {
        Self::InvalidRange(msg.into())
    }

    /// Build a [`EditError::InvalidProperty`] value.
    pub fn invalid_property(msg: impl Into<String>) -> Self {
        Self::InvalidProperty(msg.into())
    }

    /// Build a [`EditError::AssetNotReady`] value.
    pub fn asset_not_ready(msg: impl Into<String>) -> Self {
        Self::AssetNotReady(msg.into())
    }

    /// Build a [`EditError::InvalidPlan`] value.
    pub fn invalid_plan(msg: impl Into<String>) -> Self {
        Self::InvalidPlan(msg.into())
    }

    /// Build a [`EditError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Stable kind code for reporting.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AmbiguousSelector { .. } => ErrorKind::AmbiguousSelector,
            Self::InvalidSelector(_) => ErrorKind::InvalidSelector,
            Self::InvalidRange(_) => ErrorKind::InvalidRange,
            Self::InvalidProperty(_) => ErrorKind::InvalidProperty,
            Self::AssetNotReady(_) => ErrorKind::AssetNotReady,
            Self::VersionConflict { .. } => ErrorKind::VersionConflict,
            Self::NothingToUndo => ErrorKind::NothingToUndo,
            Self::NothingToRedo => ErrorKind::NothingToRedo,
            Self::InvalidPlan(_) => ErrorKind::InvalidPlan,
            Self::Serde(_) => ErrorKind::Serde,
            Self::Other(_) => ErrorKind::Other,
        }
    }

    /// Disambiguation choices when this is an ambiguity outcome.
    pub fn disambiguation_options(&self) -> Option<&[DisambiguationOption]> {
        match self {
            Self::AmbiguousSelector { options } => Some(options.as_slice()),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
