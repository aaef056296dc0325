use crate::{
    assets::catalog::{AssetCatalog, AssetInfo},
    foundation::error::{EditError, EditResult},
    ir::model::{CompositionIR, ElementKind, Properties},
    plan::model::{Changes, EditPlan, OperationKind},
};

const ALL_KINDS: [ElementKind; 5] = [
    ElementKind::Video,
    ElementKind::Audio,
    ElementKind::Image,
    ElementKind::Text,
    ElementKind::Shape,
];

/// Pre-flight check of a plan against the live IR and the asset collaborator.
///
/// Fails fast with a typed error so the executor never discovers a bad plan mid-mutation.
/// Returns the looked-up asset for `add` plans.
#[tracing::instrument(skip(ir, assets), fields(op = %plan.operation))]
pub fn validate_plan(
    plan: &EditPlan,
    ir: &CompositionIR,
    assets: &dyn AssetCatalog,
) -> EditResult<Option<AssetInfo>> {
    let changes = plan.changes_or_default();
    check_timing(&changes)?;
    check_property_patch(changes.properties.as_ref())?;
    if let Some(anim) = &changes.animation {
        anim.validate()?;
    }

    match plan.operation {
        OperationKind::Add => {
            let asset_id = plan
                .asset_id
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| EditError::invalid_plan("add requires 'assetId'"))?;
            let asset = assets
                .get_asset(asset_id)
                .ok_or_else(|| EditError::not_found(format!("asset '{asset_id}'")))?;
            if !asset.is_ready() {
                return Err(EditError::asset_not_ready(format!(
                    "asset '{asset_id}' is {:?}",
                    asset.status
                )));
            }
            if changes.remove_animation.is_some() {
                return Err(EditError::invalid_plan(
                    "add cannot remove an animation from a new element",
                ));
            }
            changes.layer_position(ir.elements.len(), true)?;
            if let Some(patch) = &changes.properties {
                check_keys_for(asset.kind, patch)?;
            }
            Ok(Some(asset))
        }
        OperationKind::Update => {
            require_selector(plan)?;
            if changes.is_empty() {
                return Err(EditError::invalid_plan("update requires non-empty 'changes'"));
            }
            if changes.position.is_some() {
                return Err(EditError::invalid_plan(
                    "update cannot reorder layers; use move",
                ));
            }
            Ok(None)
        }
        OperationKind::Delete => {
            require_selector(plan)?;
            Ok(None)
        }
        OperationKind::Move => {
            require_selector(plan)?;
            if !changes.is_move_only() {
                return Err(EditError::invalid_plan(
                    "move only accepts 'from', 'durationInFrames' and 'position'",
                ));
            }
            if changes.from.is_none()
                && changes.duration_in_frames.is_none()
                && changes.position.is_none()
            {
                return Err(EditError::invalid_plan(
                    "move requires 'from', 'durationInFrames' or 'position'",
                ));
            }
            changes.layer_position(ir.elements.len(), false)?;
            Ok(None)
        }
    }
}

fn require_selector(plan: &EditPlan) -> EditResult<()> {
    match &plan.selector {
        Some(sel) => sel.validate(),
        None => Err(EditError::invalid_selector(format!(
            "{} requires a selector",
            plan.operation
        ))),
    }
}

fn check_timing(changes: &Changes) -> EditResult<()> {
    changes.from_frame()?;
    changes.duration_frames()?;
    if let Some(label) = &changes.label
        && label.trim().is_empty()
    {
        return Err(EditError::invalid_property("label must be non-empty"));
    }
    Ok(())
}

fn check_property_patch(
    patch: Option<&serde_json::Map<String, serde_json::Value>>,
) -> EditResult<()> {
    let Some(patch) = patch else {
        return Ok(());
    };
    for (key, value) in patch {
        if !ALL_KINDS
            .iter()
            .any(|k| k.property_keys().contains(&key.as_str()))
        {
            return Err(EditError::invalid_property(format!(
                "unknown property '{key}'"
            )));
        }
        let range = match key.as_str() {
            "volume" | "opacity" => Some((0.0, 1.0)),
            "playbackRate" => Some((0.25, 4.0)),
            "fontSizePx" => Some((f64::MIN_POSITIVE, f64::MAX)),
            _ => None,
        };
        if let Some((lo, hi)) = range {
            let v = value.as_f64().ok_or_else(|| {
                EditError::invalid_property(format!("'{key}' must be a number, got {value}"))
            })?;
            if !(lo..=hi).contains(&v) {
                return Err(EditError::invalid_property(format!(
                    "'{key}' out of range: {v}"
                )));
            }
        }
    }
    Ok(())
}

fn check_keys_for(
    kind: ElementKind,
    patch: &serde_json::Map<String, serde_json::Value>,
) -> EditResult<()> {
    Properties::default_for(kind, "-").patched(patch).map(|_| ())
}

#[cfg(test)]
#[path = "../../tests/unit/plan/validate.rs"]
mod tests;
