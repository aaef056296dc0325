use rand::Rng;

use crate::{
    foundation::core::ElementId,
    foundation::error::{EditError, EditResult},
    ir::model::CompositionIR,
};

const MAX_ATTEMPTS: usize = 16;

/// Source of candidate element ids.
///
/// Candidates are collision-checked by [`fresh_id`]; generators only need to make collisions
/// unlikely.
pub trait IdGenerator {
    /// Produce the next candidate id.
    fn next_id(&mut self) -> ElementId;
}

/// Timestamp + random suffix ids: `<prefix>_<millis base36>_<6 random base36 chars>`.
#[derive(Clone, Debug)]
pub struct RandomIds {
    prefix: String,
}

impl RandomIds {
    /// Generator producing ids with `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for RandomIds {
    fn default() -> Self {
        Self::new("el")
    }
}

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> ElementId {
        let millis = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
        let mut rng = rand::rng();
        let suffix: String = (0..6)
            .map(|_| base36_digit(rng.random_range(0..36u8)))
            .collect();
        ElementId(format!("{}_{}_{suffix}", self.prefix, to_base36(millis)))
    }
}

fn base36_digit(d: u8) -> char {
    char::from_digit(u32::from(d), 36).unwrap_or('0')
}

fn to_base36(mut v: u64) -> String {
    if v == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while v > 0 {
        digits.push(base36_digit((v % 36) as u8));
        v /= 36;
    }
    digits.iter().rev().collect()
}

/// Draw ids from `ids` until one is not used in `ir`.
pub fn fresh_id(ir: &CompositionIR, ids: &mut dyn IdGenerator) -> EditResult<ElementId> {
    for _ in 0..MAX_ATTEMPTS {
        let id = ids.next_id();
        if !id.as_str().is_empty() && !ir.contains(&id) {
            return Ok(id);
        }
        tracing::debug!(%id, "generated element id collides, retrying");
    }
    Err(EditError::Other(anyhow::anyhow!(
        "could not generate a unique element id after {MAX_ATTEMPTS} attempts"
    )))
}
