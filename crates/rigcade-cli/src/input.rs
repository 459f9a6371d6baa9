//! Loading command inputs from disk and writing artifacts back.
//!
//! Every loader validates what it reads, so commands only ever see inputs
//! that satisfy the model's structural invariants.

use anyhow::{Context, Result};
use rigcade_model::{AssetManifest, EngineConfig, LayerTree, Skeleton, Timeline};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// A timeline file holds either one timeline or an array of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum TimelineFile {
    Many(Vec<Timeline>),
    One(Timeline),
}

fn read(path: &Path, what: &str) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} file: {}", what, path.display()))
}

/// Loads the engine config, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config file: {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

/// Loads and validates a layer tree.
pub fn load_layers(path: &Path) -> Result<LayerTree> {
    let json = read(path, "layer tree")?;
    LayerTree::from_json(&json)
        .with_context(|| format!("Failed to parse layer tree: {}", path.display()))
}

/// Loads and validates a skeleton written by `rig`.
pub fn load_skeleton(path: &Path) -> Result<Skeleton> {
    let json = read(path, "skeleton")?;
    Skeleton::from_json(&json)
        .with_context(|| format!("Failed to parse skeleton: {}", path.display()))
}

/// Loads and validates every timeline in a file.
pub fn load_timelines(path: &Path) -> Result<Vec<Timeline>> {
    let json = read(path, "timeline")?;
    let file: TimelineFile = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse timeline file: {}", path.display()))?;
    let timelines = match file {
        TimelineFile::Many(timelines) => timelines,
        TimelineFile::One(timeline) => vec![timeline],
    };
    for timeline in &timelines {
        timeline.validate().with_context(|| {
            format!("Invalid timeline '{}' in {}", timeline.name, path.display())
        })?;
    }
    Ok(timelines)
}

/// Loads an asset manifest.
pub fn load_assets(path: &Path) -> Result<AssetManifest> {
    AssetManifest::from_json_file(path)
        .with_context(|| format!("Failed to load asset manifest: {}", path.display()))
}

/// Writes an artifact, creating parent directories as needed.
pub fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write: {}", path.display()))
}
