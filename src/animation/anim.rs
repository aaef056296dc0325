use crate::{
    animation::ease::Ease,
    foundation::error::{EditError, EditResult},
};

/// One `(frame, value)` point of an animation. Frames are element-local.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframe {
    /// Element-local frame (0 = element start).
    pub frame: u64,
    /// Property value at `frame`.
    pub value: f64,
}

impl Keyframe {
    /// Convenience constructor.
    pub fn new(frame: u64, value: f64) -> Self {
        Self { frame, value }
    }
}

/// Keyframed animation of a single numeric property of one element.
///
/// An element holds at most one animation per property; animations on different properties are
/// independent.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animation {
    /// Animated property name (`x`, `y`, `scale`, `rotation`, `opacity`, `volume`).
    pub property: String,
    /// Keyframes, strictly increasing by frame.
    pub keyframes: Vec<Keyframe>,
    /// Easing applied between every pair of adjacent keyframes.
    #[serde(default)]
    pub easing: Ease,
}

impl Animation {
    /// Build an animation; call [`Animation::validate`] before using it.
    pub fn new(property: impl Into<String>, keyframes: Vec<Keyframe>, easing: Ease) -> Self {
        Self {
            property: property.into(),
            keyframes,
            easing,
        }
    }

    /// Check structural invariants: named property, >= 2 keys, strictly increasing frames,
    /// finite values.
    pub fn validate(&self) -> EditResult<()> {
        if self.property.trim().is_empty() {
            return Err(EditError::invalid_range(
                "animation property must be non-empty",
            ));
        }
        if self.keyframes.len() < 2 {
            return Err(EditError::invalid_range(format!(
                "animation '{}' needs at least 2 keyframes, has {}",
                self.property,
                self.keyframes.len()
            )));
        }
        if !self.keyframes.windows(2).all(|w| w[0].frame < w[1].frame) {
            return Err(EditError::invalid_range(format!(
                "animation '{}' keyframes must be strictly increasing by frame",
                self.property
            )));
        }
        if let Some(k) = self.keyframes.iter().find(|k| !k.value.is_finite()) {
            return Err(EditError::invalid_range(format!(
                "animation '{}' keyframe at frame {} has a non-finite value",
                self.property, k.frame
            )));
        }
        Ok(())
    }

    /// Sample the animated value at an element-local frame.
    ///
    /// Holds the first value before the first key and the last value after the last key.
    /// Returns `None` when the animation has no keyframes.
    pub fn sample(&self, frame: u64) -> Option<f64> {
        let first = self.keyframes.first()?;
        let last = self.keyframes.last()?;
        if frame <= first.frame {
            return Some(first.value);
        }
        if frame >= last.frame {
            return Some(last.value);
        }

        let i = self.keyframes.partition_point(|k| k.frame <= frame);
        let a = self.keyframes[i - 1];
        let b = self.keyframes[i];
        let span = (b.frame - a.frame) as f64;
        let t = self.easing.apply((frame - a.frame) as f64 / span);
        Some(a.value + (b.value - a.value) * t)
    }

    /// Smallest and largest keyframe values.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        let mut it = self.keyframes.iter().map(|k| k.value);
        let first = it.next()?;
        Some(it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/anim.rs"]
mod tests;
