use crate::{
    foundation::core::ElementId,
    foundation::error::{EditError, EditResult},
    ir::model::{CompositionIR, Element, ElementKind},
};

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "by", rename_all = "camelCase")]
/// Reference to one or more elements, as produced by a planner or a user choice.
///
/// Ordinals (`index`) are **1-based**: `index: 2` is the second candidate in layer order.
/// Fields are optional on the wire; a variant missing its required field is rejected with
/// [`EditError::InvalidSelector`].
pub enum Selector {
    /// Exact id match.
    Id {
        /// Element id.
        #[serde(default)]
        id: Option<ElementId>,
    },
    /// Explicit multi-selection; never ambiguous.
    Ids {
        /// Element ids.
        #[serde(default)]
        ids: Vec<ElementId>,
    },
    /// Case-insensitive substring match against element labels.
    Label {
        /// Substring to look for.
        #[serde(default)]
        label: Option<String>,
    },
    /// N-th element (1-based) of the optionally typed/filtered candidate sequence.
    Index {
        /// 1-based ordinal.
        #[serde(default)]
        index: Option<usize>,
        /// Restrict candidates to one element type.
        #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
        kind: Option<ElementKind>,
        /// Extra predicate over candidates.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filter: Option<ElementFilter>,
    },
    /// Elements of a given type, optionally narrowed by ordinal and/or predicate.
    Type {
        /// Element type.
        #[serde(default, rename = "type")]
        kind: Option<ElementKind>,
        /// 1-based ordinal within the typed set.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
        /// Extra predicate over candidates.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filter: Option<ElementFilter>,
    },
}

impl Selector {
    /// Selector for a single known id.
    pub fn id(id: impl Into<ElementId>) -> Self {
        Self::Id {
            id: Some(id.into()),
        }
    }

    /// Selector for a label substring.
    pub fn label(label: impl Into<String>) -> Self {
        Self::Label {
            label: Some(label.into()),
        }
    }

    /// Selector for the `index`-th (1-based) element of `kind`.
    pub fn nth_of_type(kind: ElementKind, index: usize) -> Self {
        Self::Type {
            kind: Some(kind),
            index: Some(index),
            filter: None,
        }
    }

    /// Check that the variant carries its required fields.
    pub fn validate(&self) -> EditResult<()> {
        match self {
            Self::Id { id } => match id {
                Some(id) if !id.as_str().trim().is_empty() => Ok(()),
                _ => Err(EditError::invalid_selector("by-id selector requires 'id'")),
            },
            Self::Ids { ids } => {
                if ids.is_empty() {
                    return Err(EditError::invalid_selector(
                        "by-ids selector requires a non-empty 'ids' list",
                    ));
                }
                Ok(())
            }
            Self::Label { label } => match label {
                Some(l) if !l.trim().is_empty() => Ok(()),
                _ => Err(EditError::invalid_selector(
                    "by-label selector requires a non-empty 'label'",
                )),
            },
            Self::Index { index, .. } => match index {
                None => Err(EditError::invalid_selector(
                    "by-index selector requires 'index'",
                )),
                Some(i) => check_ordinal(*i),
            },
            Self::Type { kind, index, .. } => {
                if kind.is_none() {
                    return Err(EditError::invalid_selector(
                        "by-type selector requires 'type'",
                    ));
                }
                match index {
                    Some(i) => check_ordinal(*i),
                    None => Ok(()),
                }
            }
        }
    }
}

fn check_ordinal(i: usize) -> EditResult<()> {
    if i == 0 {
        return Err(EditError::invalid_selector(
            "index is 1-based; 0 is not a valid ordinal",
        ));
    }
    Ok(())
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Predicate narrowing index/type selectors. All set conditions must hold.
pub struct ElementFilter {
    /// Case-insensitive label substring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_contains: Option<String>,
    /// `from >= value`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_at_or_after: Option<u64>,
    /// `from < value`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_before: Option<u64>,
    /// Element is on screen at this composition frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_at: Option<u64>,
}

impl ElementFilter {
    /// Whether `el` satisfies every set condition.
    pub fn matches(&self, el: &Element) -> bool {
        if let Some(needle) = &self.label_contains
            && !label_matches(el, &needle.to_lowercase())
        {
            return false;
        }
        if let Some(f) = self.starts_at_or_after
            && el.from < f
        {
            return false;
        }
        if let Some(f) = self.starts_before
            && el.from >= f
        {
            return false;
        }
        if let Some(f) = self.visible_at
            && !el.is_visible_at(f)
        {
            return false;
        }
        true
    }
}

fn label_matches(el: &Element, needle_lower: &str) -> bool {
    el.label
        .as_deref()
        .is_some_and(|l| l.to_lowercase().contains(needle_lower))
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// One candidate offered back to the user when a selector is ambiguous.
pub struct DisambiguationOption {
    /// Concrete id to re-issue as a by-id selector.
    pub id: ElementId,
    /// Element label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Element type.
    #[serde(rename = "type")]
    pub kind: ElementKind,
    /// 0-based layer index.
    pub layer: usize,
    /// Short positional description, e.g. `video 2 of 3, layer 3, frames 30-120`; the layer
    /// number is the same 0-based index as `layer`.
    pub description: String,
}

impl DisambiguationOption {
    /// Selector that picks exactly this option.
    pub fn to_selector(&self) -> Selector {
        Selector::id(self.id.clone())
    }
}

#[derive(Clone, Debug)]
/// Outcome of resolving a selector.
pub struct Resolution<'a> {
    /// Matched elements in layer order.
    pub matches: Vec<&'a Element>,
    /// Set when several equally valid matches exist and the caller must choose.
    pub ambiguous: bool,
    /// One option per match when ambiguous; empty otherwise.
    pub options: Vec<DisambiguationOption>,
}

impl<'a> Resolution<'a> {
    fn resolved(matches: Vec<&'a Element>) -> Self {
        Self {
            matches,
            ambiguous: false,
            options: Vec::new(),
        }
    }

    fn ambiguous(ir: &CompositionIR, matches: Vec<&'a Element>) -> Self {
        let options = matches.iter().map(|el| describe(ir, el)).collect();
        Self {
            matches,
            ambiguous: true,
            options,
        }
    }

    /// Ids of all matches in layer order.
    pub fn ids(&self) -> Vec<ElementId> {
        self.matches.iter().map(|e| e.id.clone()).collect()
    }

    /// Concrete target ids, or [`EditError::AmbiguousSelector`] carrying the options.
    pub fn into_targets(self) -> EditResult<Vec<ElementId>> {
        if self.ambiguous {
            return Err(EditError::AmbiguousSelector {
                options: self.options,
            });
        }
        Ok(self.ids())
    }
}

/// Build the option shown to the user for `el`.
pub fn describe(ir: &CompositionIR, el: &Element) -> DisambiguationOption {
    let kind = el.kind();
    let layer = ir.position_of(&el.id).unwrap_or(0);
    let same_type: Vec<&ElementId> = ir
        .elements
        .iter()
        .filter(|e| e.kind() == kind)
        .map(|e| &e.id)
        .collect();
    let ordinal = same_type.iter().position(|id| **id == el.id).unwrap_or(0) + 1;
    DisambiguationOption {
        id: el.id.clone(),
        label: el.label.clone(),
        kind,
        layer,
        description: format!(
            "{kind} {ordinal} of {}, layer {layer}, frames {}-{}",
            same_type.len(),
            el.from,
            el.end()
        ),
    }
}

/// Resolve `selector` against `ir`.
///
/// Pure: never mutates the IR and never guesses between equally valid matches.
#[tracing::instrument(skip(ir), fields(elements = ir.elements.len()))]
pub fn resolve<'a>(selector: &Selector, ir: &'a CompositionIR) -> EditResult<Resolution<'a>> {
    selector.validate()?;
    if ir.elements.is_empty() {
        return Err(EditError::not_found("composition has no elements"));
    }

    let out = match selector {
        Selector::Id { id: Some(id) } => {
            let el = ir
                .get(id)
                .ok_or_else(|| EditError::not_found(format!("no element with id '{id}'")))?;
            Resolution::resolved(vec![el])
        }
        Selector::Ids { ids } => {
            if let Some(missing) = ids.iter().find(|id| !ir.contains(id)) {
                return Err(EditError::not_found(format!(
                    "no element with id '{missing}'"
                )));
            }
            let matches = ir.elements.iter().filter(|e| ids.contains(&e.id)).collect();
            Resolution::resolved(matches)
        }
        Selector::Label { label: Some(label) } => {
            let needle = label.to_lowercase();
            let matches: Vec<&Element> = ir
                .elements
                .iter()
                .filter(|e| label_matches(e, &needle))
                .collect();
            match matches.len() {
                0 => {
                    return Err(EditError::not_found(format!(
                        "no element label contains '{label}'"
                    )));
                }
                1 => Resolution::resolved(matches),
                _ => Resolution::ambiguous(ir, matches),
            }
        }
        Selector::Index {
            index: Some(index),
            kind,
            filter,
        } => Resolution::resolved(vec![nth(ir, *kind, filter.as_ref(), *index)?]),
        Selector::Type {
            kind: Some(kind),
            index: Some(index),
            filter,
        } => Resolution::resolved(vec![nth(ir, Some(*kind), filter.as_ref(), *index)?]),
        Selector::Type {
            kind: Some(kind),
            index: None,
            filter,
        } => {
            let matches = candidates(ir, Some(*kind), filter.as_ref());
            match matches.len() {
                0 => {
                    return Err(EditError::not_found(format!("no {kind} element matches")));
                }
                1 => Resolution::resolved(matches),
                _ => Resolution::ambiguous(ir, matches),
            }
        }
        // `validate` rejected every other shape.
        _ => return Err(EditError::invalid_selector("incomplete selector")),
    };

    tracing::debug!(
        matches = out.matches.len(),
        ambiguous = out.ambiguous,
        "selector resolved"
    );
    Ok(out)
}

fn candidates<'a>(
    ir: &'a CompositionIR,
    kind: Option<ElementKind>,
    filter: Option<&ElementFilter>,
) -> Vec<&'a Element> {
    ir.elements
        .iter()
        .filter(|e| kind.is_none_or(|k| e.kind() == k))
        .filter(|e| filter.is_none_or(|f| f.matches(e)))
        .collect()
}

fn nth<'a>(
    ir: &'a CompositionIR,
    kind: Option<ElementKind>,
    filter: Option<&ElementFilter>,
    index: usize,
) -> EditResult<&'a Element> {
    let cands = candidates(ir, kind, filter);
    let what = kind.map_or("element", ElementKind::as_str);
    cands.get(index - 1).copied().ok_or_else(|| {
        EditError::not_found(format!(
            "{what} #{index} requested but only {} match",
            cands.len()
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/selector/resolve.rs"]
mod tests;
