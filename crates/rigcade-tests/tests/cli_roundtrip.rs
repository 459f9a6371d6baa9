//! CLI round-trip tests for Rigcade
//!
//! Tests verify:
//! - `rig` -> `animate` -> `export` through files matches a one-shot `build`
//! - Config files flow through every stage
//! - Failures leave no partial artifacts behind
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p rigcade-tests --test cli_roundtrip
//! ```

use pretty_assertions::assert_eq;
use rigcade_backend_spine::ProjectDocument;
use rigcade_cli::commands;
use rigcade_cli::input::{load_config, load_timelines};
use rigcade_model::{AssetManifest, EngineConfig, Skeleton};
use rigcade_tests::{bust, full_character, ProjectFixture};
use std::path::Path;
use std::process::ExitCode;

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn rig(project: &ProjectFixture, output: &str, config: &EngineConfig) -> ExitCode {
    commands::rig::run(&project.file("layers.json"), Some(output), config, true).unwrap()
}

fn animate(skeleton: &str, requests: &[&str], output: &str, config: &EngineConfig) -> ExitCode {
    commands::animate::run(skeleton, &texts(requests), Some(output), config, true).unwrap()
}

fn staged(project: &ProjectFixture, config: &EngineConfig, requests: &[&str]) -> ProjectDocument {
    let skeleton = project.file("skeleton.json");
    let timelines = project.file("timelines.json");
    let assets = project.file("assets.json");
    let document = project.file("staged.json");

    assert_eq!(rig(project, &skeleton, config), ExitCode::SUCCESS);
    assert_eq!(
        animate(&skeleton, requests, &timelines, config),
        ExitCode::SUCCESS
    );
    let code = commands::export::run(
        &skeleton,
        &[timelines],
        &assets,
        Some(document.as_str()),
        config,
        true,
    )
    .unwrap();
    assert_eq!(code, ExitCode::SUCCESS);

    ProjectDocument::from_json(&project.read("staged.json")).unwrap()
}

fn built(project: &ProjectFixture, config: &EngineConfig, requests: &[&str]) -> ProjectDocument {
    let layers = project.file("layers.json");
    let assets = project.file("assets.json");
    let document = project.file("built.json");

    let code = commands::build::run(
        &layers,
        Some(assets.as_str()),
        &texts(requests),
        Some(document.as_str()),
        config,
        true,
    )
    .unwrap();
    assert_eq!(code, ExitCode::SUCCESS);

    ProjectDocument::from_json(&project.read("built.json")).unwrap()
}

fn assert_same_structure(a: &ProjectDocument, b: &ProjectDocument) {
    assert_eq!(a.skeleton.hash, b.skeleton.hash);
    assert_eq!(a.bone_parents(), b.bone_parents());
    assert_eq!(a.slots, b.slots);
    assert_eq!(a.ik_memberships(), b.ik_memberships());
    assert_eq!(a.events.keys().collect::<Vec<_>>(), b.events.keys().collect::<Vec<_>>());
    assert_eq!(
        a.animations.keys().collect::<Vec<_>>(),
        b.animations.keys().collect::<Vec<_>>()
    );
    for name in a.animations.keys() {
        assert_eq!(a.key_counts(name), b.key_counts(name), "animation {}", name);
        assert_eq!(
            a.animations[name].events.len(),
            b.animations[name].events.len()
        );
    }
}

#[test]
fn test_staged_commands_match_build() {
    let project = ProjectFixture::new();
    let tree = full_character();
    project.write_layers(&tree);
    project.write_assets(&AssetManifest::for_layers(&tree));
    let config = EngineConfig::default();
    let requests = ["walk", "wave happily with sparkles", "jump with dust"];

    let staged = staged(&project, &config, &requests);
    let built = built(&project, &config, &requests);
    assert_same_structure(&staged, &built);
    assert_eq!(staged.animations.len(), 3);
}

#[test]
fn test_rig_output_reloads() {
    let project = ProjectFixture::new();
    project.write_layers(&full_character());
    let out = project.file("skeleton.json");

    assert_eq!(rig(&project, &out, &EngineConfig::default()), ExitCode::SUCCESS);

    let skeleton = Skeleton::from_json(&project.read("skeleton.json")).unwrap();
    assert_eq!(skeleton.ik_constraints().len(), 4);
}

#[test]
fn test_animate_writes_one_timeline_per_text() {
    let project = ProjectFixture::new();
    project.write_layers(&full_character());
    let config = EngineConfig::default();
    let skeleton = project.file("skeleton.json");
    let timelines = project.file("timelines.json");

    rig(&project, &skeleton, &config);
    let code = animate(&skeleton, &["nod", "sad nod", "dance"], &timelines, &config);
    assert_eq!(code, ExitCode::SUCCESS);

    let loaded = load_timelines(Path::new(&timelines)).unwrap();
    let names: Vec<&str> = loaded.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["nod", "nod_sad", "dance"]);
}

#[test]
fn test_config_file_changes_frame_rate() {
    let project = ProjectFixture::new();
    let tree = bust();
    project.write_layers(&tree);
    project.write_assets(&AssetManifest::for_layers(&tree));
    project.write("engine.json", r#"{ "synthesis": { "frame_rate": 24.0 } }"#);

    let config = load_config(Some(project.path().join("engine.json").as_path())).unwrap();
    assert_eq!(config.synthesis.frame_rate, 24.0);

    let skeleton = project.file("skeleton.json");
    let timelines = project.file("timelines.json");
    rig(&project, &skeleton, &config);
    animate(&skeleton, &["nod"], &timelines, &config);

    let loaded = load_timelines(Path::new(&timelines)).unwrap();
    assert_eq!(loaded[0].frame_rate, 24.0);
}

#[test]
fn test_failed_animation_writes_nothing() {
    let project = ProjectFixture::new();
    project.write_layers(&bust());
    let config = EngineConfig::default();
    let skeleton = project.file("skeleton.json");
    let timelines = project.file("timelines.json");

    rig(&project, &skeleton, &config);
    let code = animate(&skeleton, &["nod", "contemplate the void"], &timelines, &config);
    assert_eq!(code, ExitCode::from(1));
    assert!(!project.path().join("timelines.json").exists());
}

#[test]
fn test_export_rejects_timeline_for_other_skeleton() {
    let project = ProjectFixture::new();
    let config = EngineConfig::default();

    project.write_layers(&full_character());
    let big = project.file("big.json");
    rig(&project, &big, &config);
    let timelines = project.file("walk.json");
    animate(&big, &["walk"], &timelines, &config);

    project.write_layers(&bust());
    project.write_assets(&AssetManifest::for_layers(&bust()));
    let small = project.file("small.json");
    rig(&project, &small, &config);

    let out = project.file("project.json");
    let code = commands::export::run(
        &small,
        &[timelines],
        &project.file("assets.json"),
        Some(out.as_str()),
        &config,
        true,
    )
    .unwrap();
    assert_eq!(code, ExitCode::from(1));
    assert!(!project.path().join("project.json").exists());
}
