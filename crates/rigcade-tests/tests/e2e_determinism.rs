//! End-to-end determinism tests for Rigcade
//!
//! Identical inputs must give byte-identical skeletons, timelines, and
//! project documents, whether animations run sequentially or in parallel.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p rigcade-tests --test e2e_determinism
//! ```

use pretty_assertions::assert_eq;
use rigcade_backend_spine::serialize;
use rigcade_cli::commands::animate::animate_all;
use rigcade_engine::{infer, parse, synthesize, TemplateTable};
use rigcade_model::{short_hash, AssetManifest, EngineConfig, LayerTree, Timeline};
use rigcade_tests::{bust, full_character, verify_determinism, MOTION_TEXTS};

fn document_json(tree: &LayerTree, texts: &[&str]) -> String {
    let config = EngineConfig::default();
    let templates = TemplateTable::builtin();
    let skeleton = infer(tree, &config.inference).unwrap().value;
    let timelines: Vec<Timeline> = texts
        .iter()
        .map(|text| {
            let intent = parse(text, &config.intent).unwrap().value;
            synthesize(&skeleton, &intent, &templates, &config.synthesis)
                .unwrap()
                .value
        })
        .collect();
    serialize(
        &skeleton,
        &timelines,
        &AssetManifest::for_layers(tree),
        &config.export,
    )
    .unwrap()
    .to_json_pretty()
    .unwrap()
}

#[test]
fn test_document_is_deterministic() {
    let result = verify_determinism(|| document_json(&full_character(), MOTION_TEXTS), 3);
    result.assert_deterministic();
}

#[test]
fn test_bust_document_is_deterministic() {
    let result = verify_determinism(|| document_json(&bust(), &["walk", "nod", "wave"]), 3);
    result.assert_deterministic();
}

#[test]
fn test_skeleton_json_is_deterministic() {
    let config = EngineConfig::default();
    let result = verify_determinism(
        || {
            infer(&full_character(), &config.inference)
                .unwrap()
                .value
                .to_json_pretty()
                .unwrap()
        },
        3,
    );
    result.assert_deterministic();
}

#[test]
fn test_skeleton_hash_tracks_content() {
    let config = EngineConfig::default();
    let a = infer(&full_character(), &config.inference).unwrap().value;
    let b = infer(&full_character(), &config.inference).unwrap().value;
    let c = infer(&bust(), &config.inference).unwrap().value;
    assert_eq!(short_hash(&a).unwrap(), short_hash(&b).unwrap());
    assert_ne!(short_hash(&a).unwrap(), short_hash(&c).unwrap());
}

#[test]
fn test_parallel_animation_matches_sequential() {
    let config = EngineConfig::default();
    let templates = TemplateTable::builtin();
    let skeleton = infer(&full_character(), &config.inference).unwrap().value;
    let texts: Vec<String> = MOTION_TEXTS.iter().map(|t| t.to_string()).collect();

    let parallel: Vec<Timeline> = animate_all(&skeleton, &texts, &config)
        .into_iter()
        .map(|r| r.unwrap().timeline)
        .collect();
    let sequential: Vec<Timeline> = texts
        .iter()
        .map(|text| {
            let intent = parse(text, &config.intent).unwrap().value;
            synthesize(&skeleton, &intent, &templates, &config.synthesis)
                .unwrap()
                .value
        })
        .collect();
    assert_eq!(parallel, sequential);
}

#[test]
fn test_document_differs_when_timelines_differ() {
    let a = document_json(&full_character(), &["walk"]);
    let b = document_json(&full_character(), &["sad walk"]);
    assert_ne!(a, b);
}
