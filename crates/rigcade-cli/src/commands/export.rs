//! Export command implementation
//!
//! Serializes a skeleton and its timelines into a Spine project document.

use anyhow::Result;
use rigcade_backend_spine::{serialize, ProjectDocument};
use rigcade_model::{EngineConfig, Timeline};
use std::path::Path;
use std::process::ExitCode;

use super::json_output::JsonError;
use super::reporting::Reporter;
use crate::input::{load_assets, load_skeleton, load_timelines};

/// Summary lines for a written document.
pub(crate) fn summarize(reporter: &Reporter, document: &ProjectDocument) {
    reporter.detail(format!(
        "{} bones, {} slots, {} IK constraints, {} animations",
        document.bones.len(),
        document.slots.len(),
        document.ik.len(),
        document.animations.len()
    ));
    for name in document.animations.keys() {
        reporter.detail(format!("animation: {}", name));
    }
}

/// Run the export command
///
/// # Arguments
/// * `skeleton_path` - Path to a skeleton written by `rig`
/// * `timeline_paths` - Timeline files written by `animate`
/// * `assets_path` - Path to the layer id -> image path manifest
/// * `output` - Where to write the document (default: stdout)
/// * `config` - Engine configuration
/// * `json_output` - Whether to output machine-readable JSON diagnostics
pub fn run(
    skeleton_path: &str,
    timeline_paths: &[String],
    assets_path: &str,
    output: Option<&str>,
    config: &EngineConfig,
    json_output: bool,
) -> Result<ExitCode> {
    let reporter = Reporter::new("export", json_output);
    reporter.heading("Exporting:", skeleton_path);

    let skeleton = match load_skeleton(Path::new(skeleton_path)) {
        Ok(skeleton) => skeleton,
        Err(e) => return reporter.input_failed(e),
    };
    let assets = match load_assets(Path::new(assets_path)) {
        Ok(assets) => assets,
        Err(e) => return reporter.input_failed(e),
    };
    let mut timelines: Vec<Timeline> = Vec::new();
    for path in timeline_paths {
        match load_timelines(Path::new(path)) {
            Ok(loaded) => timelines.extend(loaded),
            Err(e) => return reporter.input_failed(e),
        }
    }

    let document = match serialize(&skeleton, &timelines, &assets, &config.export) {
        Ok(document) => document,
        Err(e) => {
            return reporter.failed(vec![JsonError::engine(e.code(), e.to_string())], Vec::new())
        }
    };

    summarize(&reporter, &document);
    reporter.succeeded(&document, Vec::new(), output)
}
