use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::{
    foundation::core::Fps,
    foundation::error::{EditError, EditResult},
    ir::model::ElementKind,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Processing state reported by the asset store.
pub enum AssetStatus {
    /// Upload still in progress.
    Uploading,
    /// Transcoding or probing.
    Processing,
    /// Playable.
    Ready,
    /// Processing failed.
    Error,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Asset metadata as returned by the asset collaborator.
pub struct AssetInfo {
    /// Asset id.
    pub id: String,
    /// Element type created from this asset.
    #[serde(rename = "type")]
    pub kind: ElementKind,
    /// Processing state.
    pub status: AssetStatus,
    /// Playable URL (empty for text/shape presets).
    #[serde(default)]
    pub src: String,
    /// Natural duration in frames, when the store already converted it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_in_frames: Option<u64>,
    /// Natural duration in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_sec: Option<f64>,
    /// Properties patch applied on top of the type defaults when the asset is placed.
    #[serde(default)]
    pub default_properties: serde_json::Map<String, serde_json::Value>,
}

impl AssetInfo {
    /// Whether the asset can be placed.
    pub fn is_ready(&self) -> bool {
        self.status == AssetStatus::Ready
    }

    /// Natural duration at `fps`: frames if known, otherwise seconds converted and rounded.
    pub fn natural_duration_frames(&self, fps: Fps) -> Option<u64> {
        self.duration_in_frames
            .or_else(|| self.duration_sec.map(|s| fps.secs_to_frames_round(s)))
    }
}

/// Asset collaborator: looks up asset metadata by id.
///
/// Lookups happen before the engine runs; implementations may cache or front a remote store.
pub trait AssetCatalog {
    /// Metadata for `id`, or `None` if the asset is unknown.
    fn get_asset(&self, id: &str) -> Option<AssetInfo>;
}

/// In-memory asset catalog keyed by asset id.
#[derive(Clone, Debug, Default)]
pub struct InMemoryAssets {
    assets: BTreeMap<String, AssetInfo>,
}

impl InMemoryAssets {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an asset.
    pub fn insert(&mut self, asset: AssetInfo) {
        self.assets.insert(asset.id.clone(), asset);
    }

    /// Builder-style insert.
    pub fn with(mut self, asset: AssetInfo) -> Self {
        self.insert(asset);
        self
    }

    /// Number of assets.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Load a JSON array of [`AssetInfo`].
    pub fn from_reader<R: std::io::Read>(r: R) -> EditResult<Self> {
        let list: Vec<AssetInfo> = serde_json::from_reader(r)
            .map_err(|e| EditError::serde(format!("parse asset list JSON: {e}")))?;
        let mut out = Self::new();
        for asset in list {
            if out.assets.contains_key(&asset.id) {
                return Err(EditError::serde(format!(
                    "duplicate asset id '{}'",
                    asset.id
                )));
            }
            out.insert(asset);
        }
        Ok(out)
    }

    /// Load a JSON array of [`AssetInfo`] from disk.
    pub fn from_path(path: impl AsRef<Path>) -> EditResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            EditError::Other(anyhow::anyhow!("open asset list '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }
}

impl AssetCatalog for InMemoryAssets {
    fn get_asset(&self, id: &str) -> Option<AssetInfo> {
        self.assets.get(id).cloned()
    }
}
