use crate::{foundation::core::ElementId, plan::model::OperationKind};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Exact before/after value of one field of one element.
///
/// `before == None` means the field did not exist (element added, animation created);
/// `after == None` means it was removed.
pub struct FieldChange {
    /// Affected element.
    pub element_id: ElementId,
    /// Field path, e.g. `from`, `properties.volume`, `animations.opacity`, `layer`.
    pub field: String,
    /// Value before the edit.
    #[serde(default)]
    pub before: Option<serde_json::Value>,
    /// Value after the edit.
    #[serde(default)]
    pub after: Option<serde_json::Value>,
}

impl FieldChange {
    pub(crate) fn new(
        element_id: &ElementId,
        field: impl Into<String>,
        before: Option<serde_json::Value>,
        after: Option<serde_json::Value>,
    ) -> Self {
        Self {
            element_id: element_id.clone(),
            field: field.into(),
            before,
            after,
        }
    }

    /// `field a -> b` rendering used in summaries.
    pub fn describe(&self) -> String {
        format!(
            "{} {} -> {}",
            self.field,
            render(self.before.as_ref()),
            render(self.after.as_ref())
        )
    }
}

fn render(v: Option<&serde_json::Value>) -> String {
    match v {
        None => "(none)".to_string(),
        Some(serde_json::Value::String(s)) => format!("\"{s}\""),
        Some(serde_json::Value::Object(_)) | Some(serde_json::Value::Array(_)) => "{..}".to_string(),
        Some(v) => v.to_string(),
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Reversible, human-readable record of what one operation changed.
pub struct Receipt {
    /// Operation that produced this receipt.
    pub operation: OperationKind,
    /// Affected element ids in layer order (for delete: order before removal).
    pub element_ids: Vec<ElementId>,
    /// One-line description for user confirmation.
    pub summary: String,
    /// Per-field diffs, grouped by element.
    pub changes: Vec<FieldChange>,
}

impl Receipt {
    /// Diffs recorded for one element.
    pub fn changes_for<'a>(&'a self, id: &'a ElementId) -> impl Iterator<Item = &'a FieldChange> {
        self.changes.iter().filter(move |c| &c.element_id == id)
    }

    /// Diff of one field of one element.
    pub fn change(&self, id: &ElementId, field: &str) -> Option<&FieldChange> {
        self.changes
            .iter()
            .find(|c| &c.element_id == id && c.field == field)
    }
}
