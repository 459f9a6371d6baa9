//! Rig command implementation
//!
//! Infers a skeleton from a layer tree.

use anyhow::Result;
use rigcade_engine::infer;
use rigcade_model::EngineConfig;
use std::path::Path;
use std::process::ExitCode;

use super::json_output::{warnings_to_json, JsonError};
use super::reporting::Reporter;
use crate::input::load_layers;

/// Run the rig command
///
/// # Arguments
/// * `layers_path` - Path to the layer tree JSON
/// * `output` - Where to write the skeleton (default: stdout)
/// * `config` - Engine configuration
/// * `json_output` - Whether to output machine-readable JSON diagnostics
///
/// # Returns
/// Exit code: 0 if a skeleton was produced, 1 otherwise
pub fn run(
    layers_path: &str,
    output: Option<&str>,
    config: &EngineConfig,
    json_output: bool,
) -> Result<ExitCode> {
    let reporter = Reporter::new("rig", json_output);
    reporter.heading("Rigging:", layers_path);

    let tree = match load_layers(Path::new(layers_path)) {
        Ok(tree) => tree,
        Err(e) => return reporter.input_failed(e),
    };

    let (skeleton, warnings) = match infer(&tree, &config.inference) {
        Ok(outcome) => outcome.into_parts(),
        Err(e) => return reporter.failed(vec![JsonError::engine(e.code(), e.to_string())], Vec::new()),
    };

    reporter.detail(format!(
        "{} bones, {} IK constraints, {} attachments",
        skeleton.bones().len(),
        skeleton.ik_constraints().len(),
        skeleton.attachments().len()
    ));
    reporter.succeeded(&skeleton, warnings_to_json(&warnings), output)
}
