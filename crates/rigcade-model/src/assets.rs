//! Asset manifest: layer id to rasterized image path.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ModelError;
use crate::layer::LayerTree;

/// Maps layer ids to image paths, as produced by the external rasterizer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetManifest {
    entries: BTreeMap<String, String>,
}

impl AssetManifest {
    /// An empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an entry.
    pub fn insert(&mut self, layer_id: impl Into<String>, path: impl Into<String>) {
        self.entries.insert(layer_id.into(), path.into());
    }

    /// Builder form of [`AssetManifest::insert`].
    pub fn with(mut self, layer_id: impl Into<String>, path: impl Into<String>) -> Self {
        self.insert(layer_id, path);
        self
    }

    /// Path for a layer.
    pub fn get(&self, layer_id: &str) -> Option<&str> {
        self.entries.get(layer_id).map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in layer-id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Conventional manifest for a tree: `<layer id>.png` for every
    /// pixel-bearing leaf.
    pub fn for_layers(tree: &LayerTree) -> Self {
        let mut manifest = Self::new();
        for visit in tree.walk() {
            if !visit.hidden && visit.node.has_pixels() {
                manifest.insert(visit.node.id.clone(), format!("{}.png", visit.node.id));
            }
        }
        manifest
    }

    /// Parses a manifest from JSON.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a manifest file.
    pub fn from_json_file(path: &Path) -> Result<Self, ModelError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

/// Strips the file extension, keeping any directories: `img/head.png` becomes
/// `img/head`.
pub fn attachment_path(path: &str) -> &str {
    let file_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[file_start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..file_start + dot],
        _ => path,
    }
}
