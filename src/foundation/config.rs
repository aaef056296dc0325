use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::error::{EditError, EditResult};

/// Tunables for the editing engine.
///
/// Every field has a default so a partial JSON object (or none at all) is a valid config.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct EditorConfig {
    /// Maximum number of history snapshots kept per composition.
    pub history_cap: usize,
    /// Duration given to image/text/shape assets that carry no natural duration.
    pub default_still_duration_sec: f64,
    /// Prefix of freshly generated element ids.
    pub id_prefix: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_cap: 50,
            default_still_duration_sec: 5.0,
            id_prefix: "el".to_string(),
        }
    }
}

impl EditorConfig {
    /// Parse a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> EditResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| EditError::serde(format!("parse editor config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> EditResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            EditError::Other(anyhow::anyhow!(
                "open editor config '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> EditResult<()> {
        if self.history_cap == 0 {
            return Err(EditError::invalid_range("historyCap must be > 0"));
        }
        if !self.default_still_duration_sec.is_finite() || self.default_still_duration_sec <= 0.0
        {
            return Err(EditError::invalid_range(
                "defaultStillDurationSec must be finite and > 0",
            ));
        }
        if self.id_prefix.trim().is_empty() {
            return Err(EditError::invalid_range("idPrefix must be non-empty"));
        }
        Ok(())
    }
}
