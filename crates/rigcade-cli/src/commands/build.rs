//! Build command implementation
//!
//! Runs the whole pipeline in one process: layer tree to skeleton, each text
//! to a timeline, and everything into one Spine project document.

use anyhow::Result;
use rigcade_backend_spine::serialize;
use rigcade_engine::infer;
use rigcade_model::{AssetManifest, EngineConfig, Timeline};
use std::path::Path;
use std::process::ExitCode;

use super::animate::{animate_all, animation_warnings, failure_errors, partition};
use super::json_output::{warnings_to_json, JsonError};
use super::reporting::Reporter;
use crate::input::{load_assets, load_layers};

/// Run the build command
///
/// # Arguments
/// * `layers_path` - Path to the layer tree JSON
/// * `assets_path` - Asset manifest (default: `<layer id>.png` per pixel layer)
/// * `texts` - One free-text request per animation
/// * `output` - Where to write the document (default: stdout)
/// * `config` - Engine configuration
/// * `json_output` - Whether to output machine-readable JSON diagnostics
///
/// # Returns
/// Exit code: 0 if the document was produced, 1 otherwise
pub fn run(
    layers_path: &str,
    assets_path: Option<&str>,
    texts: &[String],
    output: Option<&str>,
    config: &EngineConfig,
    json_output: bool,
) -> Result<ExitCode> {
    let reporter = Reporter::new("build", json_output);
    reporter.heading("Building:", layers_path);

    let tree = match load_layers(Path::new(layers_path)) {
        Ok(tree) => tree,
        Err(e) => return reporter.input_failed(e),
    };
    let assets = match assets_path {
        Some(path) => match load_assets(Path::new(path)) {
            Ok(assets) => assets,
            Err(e) => return reporter.input_failed(e),
        },
        None => AssetManifest::for_layers(&tree),
    };

    let (skeleton, rig_warnings) = match infer(&tree, &config.inference) {
        Ok(outcome) => outcome.into_parts(),
        Err(e) => return reporter.failed(vec![JsonError::engine(e.code(), e.to_string())], Vec::new()),
    };
    reporter.detail(format!(
        "rigged {} bones, {} IK constraints",
        skeleton.bones().len(),
        skeleton.ik_constraints().len()
    ));

    let (animations, failures) = partition(animate_all(&skeleton, texts, config));
    let mut warnings = warnings_to_json(&rig_warnings);
    warnings.extend(animation_warnings(&animations));
    if !failures.is_empty() {
        return reporter.failed(failure_errors(&failures), warnings);
    }
    super::animate::summarize(&reporter, &animations);

    let timelines: Vec<Timeline> = animations.into_iter().map(|a| a.timeline).collect();
    let document = match serialize(&skeleton, &timelines, &assets, &config.export) {
        Ok(document) => document,
        Err(e) => return reporter.failed(vec![JsonError::engine(e.code(), e.to_string())], warnings),
    };

    super::export::summarize(&reporter, &document);
    reporter.succeeded(&document, warnings, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rigcade_backend_spine::ProjectDocument;
    use rigcade_model::{LayerNode, LayerTree, Rect};
    use std::fs;
    use tempfile::tempdir;

    fn write_layers(dir: &Path) -> String {
        let tree = LayerTree::new(LayerNode::group(
            "doc",
            "Character",
            0,
            vec![
                LayerNode::new("torso", "Body", Rect::new(40.0, 60.0, 40.0, 80.0), 1),
                LayerNode::new("head", "Head", Rect::new(40.0, 10.0, 40.0, 45.0), 2),
            ],
        ));
        let path = dir.join("layers.json");
        fs::write(&path, tree.to_json_pretty().unwrap()).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_build_produces_one_animation_per_text() {
        let dir = tempdir().unwrap();
        let layers = write_layers(dir.path());
        let out = dir.path().join("out/project.json");
        let texts = vec!["nod".to_string(), "happy nod with sparkles".to_string()];

        let code = run(&layers, None, &texts, out.to_str(), &EngineConfig::default(), true).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);

        let document = ProjectDocument::from_json(&fs::read_to_string(&out).unwrap()).unwrap();
        let names: Vec<&String> = document.animations.keys().collect();
        assert_eq!(names, vec!["nod", "nod_happy"]);
        assert!(document.events.contains_key("effect_sparkle"));
    }

    #[test]
    fn test_build_fails_on_unparseable_text() {
        let dir = tempdir().unwrap();
        let layers = write_layers(dir.path());
        let out = dir.path().join("project.json");
        let texts = vec!["nod".to_string(), "xyzzy".to_string()];

        let code = run(&layers, None, &texts, out.to_str(), &EngineConfig::default(), true).unwrap();
        assert_eq!(code, ExitCode::from(1));
        assert!(!out.exists());
    }
}
