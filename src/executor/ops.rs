use crate::{
    assets::catalog::AssetInfo,
    executor::ids::{IdGenerator, fresh_id},
    executor::receipt::{FieldChange, Receipt},
    foundation::config::EditorConfig,
    foundation::core::ElementId,
    foundation::error::{EditError, EditResult},
    ir::model::{CompositionIR, Element, Properties},
    ir::validate::ensure_valid,
    plan::model::{Changes, OperationKind},
};

#[derive(Clone, Debug, PartialEq)]
/// A validated operation whose selector has been resolved to concrete ids.
pub enum EditOp {
    /// Place a new element from a ready asset.
    Add {
        /// Source asset metadata.
        asset: AssetInfo,
        /// Optional `label` / `from` / `durationInFrames` / `properties` / `animation` /
        /// `position` overrides.
        changes: Changes,
    },
    /// Change every target atomically.
    Update {
        /// Resolved targets.
        targets: Vec<ElementId>,
        /// Payload.
        changes: Changes,
    },
    /// Remove every target together with its animations.
    Delete {
        /// Resolved targets.
        targets: Vec<ElementId>,
    },
    /// Retime and/or reorder targets.
    Move {
        /// Resolved targets.
        targets: Vec<ElementId>,
        /// `from` / `durationInFrames` / `position` only.
        changes: Changes,
    },
}

impl EditOp {
    /// Operation kind.
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Add { .. } => OperationKind::Add,
            Self::Update { .. } => OperationKind::Update,
            Self::Delete { .. } => OperationKind::Delete,
            Self::Move { .. } => OperationKind::Move,
        }
    }
}

#[derive(Clone, Debug)]
/// Result of a successful execution.
pub struct Applied {
    /// New IR; shares nothing with the input.
    pub ir: CompositionIR,
    /// What changed.
    pub receipt: Receipt,
}

/// Apply one operation to `ir`, producing a new IR and a receipt.
///
/// `ir` is never mutated. The edit is all-or-nothing: any failure, including an invariant
/// violation found after the change, returns an error and no IR. Identical inputs give identical
/// outputs apart from the id drawn for `add`.
#[tracing::instrument(skip_all, fields(op = %op.kind()))]
pub fn execute(
    ir: &CompositionIR,
    op: &EditOp,
    config: &EditorConfig,
    ids: &mut dyn IdGenerator,
) -> EditResult<Applied> {
    let mut next = ir.clone();
    let receipt = match op {
        EditOp::Add { asset, changes } => apply_add(&mut next, asset, changes, config, ids),
        EditOp::Update { targets, changes } => apply_update(&mut next, targets, changes),
        EditOp::Delete { targets } => apply_delete(&mut next, targets),
        EditOp::Move { targets, changes } => apply_move(&mut next, targets, changes),
    }
    .inspect_err(|e| tracing::warn!(error = %e, "edit rejected"))?;

    next.refresh_duration();
    ensure_valid(&next).inspect_err(|e| tracing::warn!(error = %e, "edit breaks IR invariants"))?;

    tracing::debug!(summary = %receipt.summary, "edit applied");
    Ok(Applied { ir: next, receipt })
}

fn apply_add(
    ir: &mut CompositionIR,
    asset: &AssetInfo,
    changes: &Changes,
    config: &EditorConfig,
    ids: &mut dyn IdGenerator,
) -> EditResult<Receipt> {
    if !asset.is_ready() {
        return Err(EditError::asset_not_ready(format!(
            "asset '{}' is {:?}",
            asset.id, asset.status
        )));
    }
    if changes.remove_animation.is_some() {
        return Err(EditError::invalid_plan(
            "add cannot remove an animation from a new element",
        ));
    }

    let fps = ir.settings.fps;
    let mut properties =
        Properties::default_for(asset.kind, &asset.src).patched(&asset.default_properties)?;
    if let Some(patch) = &changes.properties {
        properties = properties.patched(patch)?;
    }

    let duration = match changes.duration_frames()? {
        Some(d) => d,
        None => match asset.natural_duration_frames(fps) {
            Some(d) => d,
            None if !asset.kind.is_timed_media() => {
                fps.secs_to_frames_round(config.default_still_duration_sec)
            }
            None => {
                return Err(EditError::invalid_range(format!(
                    "asset '{}' has no natural duration; durationInFrames is required",
                    asset.id
                )));
            }
        },
    };
    if duration == 0 {
        return Err(EditError::invalid_range(format!(
            "asset '{}' resolves to a duration of 0 frames",
            asset.id
        )));
    }

    let from = changes.from_frame()?.unwrap_or_else(|| ir.append_frame());
    let len = ir.elements.len();
    let layer = changes.layer_position(len, true)?.unwrap_or(len);
    let id = fresh_id(ir, ids)?;

    let mut el = Element {
        id: id.clone(),
        label: changes.label.clone(),
        from,
        duration_in_frames: duration,
        properties,
        animations: Vec::new(),
    };
    if let Some(anim) = &changes.animation {
        el.set_animation(anim.clone());
    }

    let mut diffs = vec![
        FieldChange::new(&id, "type", None, Some(json(&el.kind())?)),
        FieldChange::new(&id, "from", None, Some(json(&el.from)?)),
        FieldChange::new(
            &id,
            "durationInFrames",
            None,
            Some(json(&el.duration_in_frames)?),
        ),
    ];
    if let Some(label) = &el.label {
        diffs.push(FieldChange::new(&id, "label", None, Some(json(label)?)));
    }
    diffs.push(FieldChange::new(&id, "layer", None, Some(json(&layer)?)));
    diffs.push(FieldChange::new(
        &id,
        "properties",
        None,
        Some(serde_json::Value::Object(el.properties.to_object()?)),
    ));
    for anim in &el.animations {
        diffs.push(FieldChange::new(
            &id,
            format!("animations.{}", anim.property),
            None,
            Some(json(anim)?),
        ));
    }

    let summary = format!(
        "Added {} {} at frame {from} for {duration} frames",
        el.kind(),
        el.display_name()
    );
    ir.elements.insert(layer, el);

    Ok(Receipt {
        operation: OperationKind::Add,
        element_ids: vec![id],
        summary,
        changes: diffs,
    })
}

fn apply_update(
    ir: &mut CompositionIR,
    targets: &[ElementId],
    changes: &Changes,
) -> EditResult<Receipt> {
    let targets = ordered_targets(ir, targets)?;
    if changes.position.is_some() {
        return Err(EditError::invalid_plan(
            "update cannot reorder layers; use move",
        ));
    }
    let from = changes.from_frame()?;
    let duration = changes.duration_frames()?;

    let mut diffs = Vec::new();
    for id in &targets {
        let el = ir
            .get_mut(id)
            .ok_or_else(|| EditError::not_found(format!("no element with id '{id}'")))?;

        if let Some(label) = &changes.label
            && el.label.as_ref() != Some(label)
        {
            diffs.push(FieldChange::new(
                id,
                "label",
                el.label.as_ref().map(json).transpose()?,
                Some(json(label)?),
            ));
            el.label = Some(label.clone());
        }
        retime(el, from, duration, &mut diffs)?;

        if let Some(patch) = &changes.properties {
            let before = el.properties.to_object()?;
            let patched = el.properties.patched(patch)?;
            let after = patched.to_object()?;
            for key in patch.keys() {
                if before.get(key) != after.get(key) {
                    diffs.push(FieldChange::new(
                        id,
                        format!("properties.{key}"),
                        before.get(key).cloned(),
                        after.get(key).cloned(),
                    ));
                }
            }
            el.properties = patched;
        }

        if let Some(anim) = &changes.animation {
            let field = format!("animations.{}", anim.property);
            let previous = el.set_animation(anim.clone());
            if previous.as_ref() != Some(anim) {
                diffs.push(FieldChange::new(
                    id,
                    field,
                    previous.as_ref().map(json).transpose()?,
                    Some(json(anim)?),
                ));
            }
        }

        if let Some(property) = &changes.remove_animation {
            let removed = el.remove_animation(property).ok_or_else(|| {
                EditError::not_found(format!("element '{id}' has no '{property}' animation"))
            })?;
            diffs.push(FieldChange::new(
                id,
                format!("animations.{property}"),
                Some(json(&removed)?),
                None,
            ));
        }
    }

    let summary = summarize("Updated", ir, &targets, &diffs);
    Ok(Receipt {
        operation: OperationKind::Update,
        element_ids: targets,
        summary,
        changes: diffs,
    })
}

fn apply_delete(ir: &mut CompositionIR, targets: &[ElementId]) -> EditResult<Receipt> {
    let targets = ordered_targets(ir, targets)?;

    let mut diffs = Vec::with_capacity(targets.len());
    let mut names = Vec::with_capacity(targets.len());
    for el in ir.elements.iter().filter(|e| targets.contains(&e.id)) {
        diffs.push(FieldChange::new(&el.id, "element", Some(json(el)?), None));
        names.push(format!("{} {}", el.kind(), el.display_name()));
    }
    ir.elements.retain(|e| !targets.contains(&e.id));

    let summary = match names.as_slice() {
        [one] => format!("Deleted {one}"),
        many => format!("Deleted {} elements: {}", many.len(), many.join(", ")),
    };
    Ok(Receipt {
        operation: OperationKind::Delete,
        element_ids: targets,
        summary,
        changes: diffs,
    })
}

fn apply_move(
    ir: &mut CompositionIR,
    targets: &[ElementId],
    changes: &Changes,
) -> EditResult<Receipt> {
    let targets = ordered_targets(ir, targets)?;
    if !changes.is_move_only() {
        return Err(EditError::invalid_plan(
            "move only accepts 'from', 'durationInFrames' and 'position'",
        ));
    }
    let from = changes.from_frame()?;
    let duration = changes.duration_frames()?;
    let position = changes.layer_position(ir.elements.len(), false)?;
    if position.is_some() && targets.len() != 1 {
        return Err(EditError::invalid_range(format!(
            "position needs exactly one target, got {}",
            targets.len()
        )));
    }

    let mut diffs = Vec::new();
    for id in &targets {
        let el = ir
            .get_mut(id)
            .ok_or_else(|| EditError::not_found(format!("no element with id '{id}'")))?;
        retime(el, from, duration, &mut diffs)?;
    }

    if let (Some(to), [id]) = (position, targets.as_slice()) {
        let current = ir
            .position_of(id)
            .ok_or_else(|| EditError::not_found(format!("no element with id '{id}'")))?;
        if current != to {
            let el = ir.elements.remove(current);
            ir.elements.insert(to, el);
            diffs.push(FieldChange::new(
                id,
                "layer",
                Some(json(&current)?),
                Some(json(&to)?),
            ));
        }
    }

    let summary = summarize("Moved", ir, &targets, &diffs);
    Ok(Receipt {
        operation: OperationKind::Move,
        element_ids: targets,
        summary,
        changes: diffs,
    })
}

fn retime(
    el: &mut Element,
    from: Option<u64>,
    duration: Option<u64>,
    diffs: &mut Vec<FieldChange>,
) -> EditResult<()> {
    if let Some(f) = from
        && el.from != f
    {
        diffs.push(FieldChange::new(
            &el.id,
            "from",
            Some(json(&el.from)?),
            Some(json(&f)?),
        ));
        el.from = f;
    }
    if let Some(d) = duration
        && el.duration_in_frames != d
    {
        diffs.push(FieldChange::new(
            &el.id,
            "durationInFrames",
            Some(json(&el.duration_in_frames)?),
            Some(json(&d)?),
        ));
        el.duration_in_frames = d;
    }
    Ok(())
}

/// Unique target ids in layer order; every id must exist.
fn ordered_targets(ir: &CompositionIR, targets: &[ElementId]) -> EditResult<Vec<ElementId>> {
    if targets.is_empty() {
        return Err(EditError::not_found("no target elements"));
    }
    if let Some(missing) = targets.iter().find(|id| !ir.contains(id)) {
        return Err(EditError::not_found(format!(
            "no element with id '{missing}'"
        )));
    }
    Ok(ir
        .elements
        .iter()
        .filter(|e| targets.contains(&e.id))
        .map(|e| e.id.clone())
        .collect())
}

fn summarize(
    verb: &str,
    ir: &CompositionIR,
    targets: &[ElementId],
    diffs: &[FieldChange],
) -> String {
    let name = |id: &ElementId| {
        ir.get(id)
            .map(|e| format!("{} {}", e.kind(), e.display_name()))
            .unwrap_or_else(|| id.to_string())
    };
    match targets {
        [id] if diffs.is_empty() => format!("{verb} {}: no changes", name(id)),
        [id] => {
            let parts: Vec<String> = diffs.iter().map(FieldChange::describe).collect();
            format!("{verb} {}: {}", name(id), parts.join(", "))
        }
        many => {
            let names: Vec<String> = many.iter().map(name).collect();
            format!(
                "{verb} {} elements ({}), {} field changes",
                many.len(),
                names.join(", "),
                diffs.len()
            )
        }
    }
}

fn json<T: serde::Serialize + ?Sized>(v: &T) -> EditResult<serde_json::Value> {
    serde_json::to_value(v).map_err(|e| EditError::serde(format!("serialize receipt value: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/executor/ops.rs"]
mod tests;
