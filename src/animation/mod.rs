//! Keyframe animations attached to element properties.

/// Keyframed property animations and sampling.
pub mod anim;
/// Easing curves.
pub mod ease;
