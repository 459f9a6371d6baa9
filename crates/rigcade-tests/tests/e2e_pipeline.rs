//! End-to-end pipeline tests for Rigcade
//!
//! Tests verify:
//! - A fully grouped character rigs into the expected hierarchy
//! - Every motion exports into a document that reads back consistently
//! - Partial characters still export, with warnings
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p rigcade-tests --test e2e_pipeline
//! ```

use pretty_assertions::assert_eq;
use rigcade_backend_spine::{serialize, IkMembership, ProjectDocument};
use rigcade_engine::{infer, parse, synthesize, CharacterId, SkeletonCache, TemplateTable};
use rigcade_model::{
    short_hash, AssetManifest, EngineConfig, LayerTree, Skeleton, Timeline, WarningCode,
};
use rigcade_tests::{bust, expressive_bust, full_character, MOTION_TEXTS};
use std::collections::BTreeSet;
use std::sync::Arc;

// ============================================================================
// Helpers
// ============================================================================

fn rig(tree: &LayerTree) -> Skeleton {
    infer(tree, &EngineConfig::default().inference).unwrap().value
}

fn animate(skeleton: &Skeleton, text: &str) -> Timeline {
    let config = EngineConfig::default();
    let intent = parse(text, &config.intent).unwrap().value;
    synthesize(skeleton, &intent, &TemplateTable::builtin(), &config.synthesis)
        .unwrap()
        .value
}

fn export(tree: &LayerTree, texts: &[&str]) -> (Skeleton, Vec<Timeline>, ProjectDocument) {
    let skeleton = rig(tree);
    let timelines: Vec<Timeline> = texts.iter().map(|t| animate(&skeleton, t)).collect();
    let document = serialize(
        &skeleton,
        &timelines,
        &AssetManifest::for_layers(tree),
        &EngineConfig::default().export,
    )
    .unwrap();
    (skeleton, timelines, document)
}

fn parent_of<'a>(document: &'a ProjectDocument, bone: &str) -> Option<&'a str> {
    document
        .bones
        .iter()
        .find(|b| b.name == bone)
        .and_then(|b| b.parent.as_deref())
}

// ============================================================================
// Rigging
// ============================================================================

#[test]
fn test_full_character_hierarchy() {
    let skeleton = rig(&full_character());
    let names: BTreeSet<&str> = skeleton.bones().iter().map(|b| b.name.as_str()).collect();
    for expected in [
        "root",
        "torso",
        "head",
        "upper_arm_l",
        "forearm_l",
        "hand_l",
        "upper_arm_r",
        "forearm_r",
        "hand_r",
        "thigh_l",
        "shin_l",
        "foot_l",
        "thigh_r",
        "shin_r",
        "foot_r",
        "hair",
        "cape",
    ] {
        assert!(names.contains(expected), "missing bone {}", expected);
    }
    assert_eq!(skeleton.bones()[0].name, "root");
    assert!(skeleton.bone_by_name("hair").unwrap().follower);
}

#[test]
fn test_every_pixel_layer_has_one_slot() {
    let tree = full_character();
    let (skeleton, _, document) = export(&tree, &[]);

    assert_eq!(document.slots.len(), AssetManifest::for_layers(&tree).len());
    assert_eq!(document.slots.len(), skeleton.attachments().len());
    let slot_names: BTreeSet<&str> = document.slots.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(slot_names.len(), document.slots.len());
    assert!(slot_names.contains("slot_hand_r"));
    assert!(slot_names.contains("slot_eye"));
}

#[test]
fn test_limbs_become_ik_chains() {
    let (_, _, document) = export(&full_character(), &[]);
    let chains: Vec<IkMembership> = document.ik_memberships();
    let summary: Vec<(Vec<&str>, &str)> = chains
        .iter()
        .map(|ik| {
            (
                ik.bones.iter().map(String::as_str).collect(),
                ik.target.as_str(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            (vec!["upper_arm_l", "forearm_l"], "hand_l"),
            (vec!["upper_arm_r", "forearm_r"], "hand_r"),
            (vec!["thigh_l", "shin_l"], "foot_l"),
            (vec!["thigh_r", "shin_r"], "foot_r"),
        ]
    );
    for (index, ik) in document.ik.iter().enumerate() {
        assert_eq!(ik.order as usize, index);
        assert_eq!(ik.mix, 1.0);
    }
}

// ============================================================================
// Document round trip
// ============================================================================

#[test]
fn test_document_reads_back() {
    let (skeleton, timelines, document) = export(&full_character(), MOTION_TEXTS);
    let json = document.to_json_pretty().unwrap();
    let parsed = ProjectDocument::from_json(&json).unwrap();

    assert_eq!(parsed.bone_parents(), document.bone_parents());
    assert_eq!(parsed.skeleton.hash, short_hash(&skeleton).unwrap());
    assert_eq!(parsed.skeleton.spine, "4.1.00");
    assert_eq!(parent_of(&parsed, "forearm_l"), Some("upper_arm_l"));
    assert_eq!(parent_of(&parsed, "hair"), Some("head"));

    for timeline in &timelines {
        let counts = parsed
            .key_counts(&timeline.name)
            .unwrap_or_else(|| panic!("missing animation {}", timeline.name));
        for (bone, keys) in &timeline.tracks {
            let name = &skeleton.bone(*bone).unwrap().name;
            assert_eq!(counts.get(name), Some(&keys.len()), "{} / {}", timeline.name, name);
        }
    }
}

#[test]
fn test_animation_names() {
    let (_, _, document) = export(&full_character(), MOTION_TEXTS);
    let names: Vec<&str> = document.animations.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        vec![
            "dance_excited",
            "idle",
            "jump",
            "nod_sad",
            "run",
            "walk",
            "wave",
            "wave_happy",
        ]
    );
}

#[test]
fn test_effects_are_declared_and_keyed() {
    let (_, _, document) = export(&full_character(), MOTION_TEXTS);
    let declared: Vec<&str> = document.events.keys().map(String::as_str).collect();
    assert_eq!(declared, vec!["effect_dust", "effect_fire", "effect_sparkle"]);

    let wave = &document.animations["wave_happy"];
    assert!(!wave.events.is_empty());
    assert!(wave.events.iter().all(|e| e.name == "effect_sparkle"));
    let times: Vec<f64> = wave.events.iter().map(|e| e.time).collect();
    assert!(times.windows(2).all(|w| w[0] <= w[1]));

    assert!(document.animations["walk"].events.is_empty());
}

#[test]
fn test_targeted_wave_moves_only_the_left_arm() {
    let skeleton = rig(&full_character());
    let timeline = animate(&skeleton, "wave with left arm");
    let upper_left = skeleton.bone_by_name("upper_arm_l").unwrap().id;
    let upper_right = skeleton.bone_by_name("upper_arm_r").unwrap().id;
    let head = skeleton.bone_by_name("head").unwrap().id;

    assert!(timeline.peak_rotation(upper_left) > 90.0);
    assert_eq!(timeline.peak_rotation(upper_right), 0.0);
    assert_eq!(timeline.peak_rotation(head), 0.0);
}

#[test]
fn test_skin_uses_manifest_paths() {
    let tree = full_character();
    let skeleton = rig(&tree);
    let mut assets = AssetManifest::new();
    for (layer, _) in AssetManifest::for_layers(&tree).iter() {
        assets.insert(layer, format!("parts/{}.png", layer));
    }
    let document = serialize(&skeleton, &[], &assets, &EngineConfig::default().export).unwrap();

    let skin = document.default_skin().unwrap();
    let face = &skin.attachments["slot_face"]["parts/face"];
    assert_eq!(face.path.as_deref(), Some("parts/face"));
    assert_eq!(face.width, 60.0);
    assert_eq!(face.height, 60.0);
}

#[test]
fn test_expression_layers_swap_on_the_face_slot() {
    let tree = expressive_bust();
    let (skeleton, _, document) = export(&tree, &["sad nod", "happy nod", "angry nod"]);

    // Variants ride on the default face's slot.
    assert_eq!(skeleton.attachments().len(), 4);
    let slots: Vec<&str> = document.slots.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(slots, vec!["slot_torso", "slot_face"]);
    let face = &document.default_skin().unwrap().attachments["slot_face"];
    assert_eq!(
        face.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["face", "face_happy", "face_sad"]
    );

    assert_eq!(document.attachment_swaps("nod_sad", "slot_face"), vec![Some("face_sad")]);
    assert_eq!(
        document.attachment_swaps("nod_happy", "slot_face"),
        vec![Some("face_happy")]
    );
    assert!(document.attachment_swaps("nod_angry", "slot_face").is_empty());

    let json = document.to_json_pretty().unwrap();
    let reread = ProjectDocument::from_json(&json).unwrap();
    assert_eq!(reread, document);
}

// ============================================================================
// Partial characters and caching
// ============================================================================

#[test]
fn test_bust_walk_exports_a_rest_timeline() {
    let config = EngineConfig::default();
    let skeleton = rig(&bust());
    let intent = parse("walk", &config.intent).unwrap().value;
    let outcome = synthesize(&skeleton, &intent, &TemplateTable::builtin(), &config.synthesis).unwrap();
    assert!(outcome.has_warning(WarningCode::PartialSkeleton));

    let document = serialize(
        &skeleton,
        &[outcome.value],
        &AssetManifest::for_layers(&bust()),
        &config.export,
    )
    .unwrap();
    let counts = document.key_counts("walk").unwrap();
    assert_eq!(counts.keys().map(String::as_str).collect::<Vec<_>>(), vec!["root"]);
}

#[test]
fn test_cached_skeleton_is_shared_across_threads() {
    let cache = SkeletonCache::new();
    let id = CharacterId::new("hero");
    let config = EngineConfig::default();
    let first = cache
        .get_or_infer(&id, &full_character(), &config.inference)
        .unwrap()
        .value;

    let names: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = ["walk", "wave", "nod"]
            .iter()
            .map(|text| {
                let cache = &cache;
                let id = &id;
                scope.spawn(move || {
                    let skeleton = cache.get(id).unwrap();
                    animate(&skeleton, text).name
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(names, vec!["walk", "wave", "nod"]);

    let again = cache
        .get_or_infer(&id, &full_character(), &config.inference)
        .unwrap()
        .value;
    assert!(Arc::ptr_eq(&first, &again));
}
