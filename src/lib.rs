//! Wavyte Edit is the editing engine behind conversational video composition.
//!
//! A planner turns a natural-language request into an [`EditPlan`]; this crate maps that plan
//! onto a versioned [`CompositionIR`] (the timed arrangement of media elements that drives
//! preview and render) and reports exactly what changed.
//!
//! # Pipeline overview
//!
//! 1. **Validate**: `EditPlan + IR + assets -> ok | typed error` ([`validate_plan`])
//! 2. **Resolve**: `Selector + IR -> element ids | disambiguation options` ([`resolve`])
//! 3. **Execute**: `IR + EditOp -> new IR + Receipt` ([`execute`])
//! 4. **Record**: the new IR becomes the live state and a [`HistorySnapshot`]
//!
//! [`Composition`] runs these steps in order and owns the version counter and history.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **All-or-nothing**: a failed edit leaves the input IR untouched.
//! - **Never guess**: equally valid selector matches surface as
//!   [`EditError::AmbiguousSelector`] carrying the options to show the user.
//! - **No global state**: everything lives in a `Composition` value passed by the caller.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod animation;
pub mod assets;
pub mod executor;
pub mod foundation;
pub mod history;
pub mod ir;
pub mod plan;
pub mod selector;
pub mod session;

pub use animation::anim::{Animation, Keyframe};
pub use animation::ease::Ease;
pub use assets::catalog::{AssetCatalog, AssetInfo, AssetStatus, InMemoryAssets};
pub use executor::ids::{IdGenerator, RandomIds, fresh_id};
pub use executor::ops::{Applied, EditOp, execute};
pub use executor::receipt::{FieldChange, Receipt};
pub use foundation::config::EditorConfig;
pub use foundation::core::{Canvas, CompositionId, ElementId, Fps};
pub use foundation::error::{EditError, EditResult, ErrorKind};
pub use history::manager::{History, HistorySnapshot};
pub use ir::model::{
    AudioProps, CompositionIR, Element, ElementKind, FitMode, ImageProps, Properties, Settings,
    ShapeKind, ShapeProps, TextProps, VideoProps,
};
pub use ir::validate::{PathElem, Violation, ViolationKind, ensure_valid, validate_ir};
pub use plan::model::{Changes, EditPlan, OperationKind};
pub use plan::validate::validate_plan;
pub use selector::resolve::{DisambiguationOption, ElementFilter, Resolution, Selector, resolve};
pub use session::composition::{Composition, CompositionSnapshot, EditOutcome};
pub use session::store::{CompositionStore, InMemoryStore, StoredComposition};
