//! Layer tree fixtures and temporary project directories.

use rigcade_model::{AssetManifest, EngineConfig, LayerNode, LayerTree, Rect};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Requests covering every built-in motion, several emotions, targeting,
/// and effects.
pub const MOTION_TEXTS: &[&str] = &[
    "idle",
    "walk",
    "run fast",
    "jump with dust",
    "wave happily with sparkles",
    "sad nod",
    "excited dance with fire",
    "wave with left arm",
];

fn leaf(id: &str, name: &str, x: f64, y: f64, w: f64, h: f64, z: i32) -> LayerNode {
    LayerNode::new(id, name, Rect::new(x, y, w, h), z)
}

/// A 200x300 front-facing character with every body part, grouped the way
/// an artist would export it: split arms and legs inside side groups, an
/// eye inside the head group, hair, and a cape.
pub fn full_character() -> LayerTree {
    LayerTree::new(LayerNode::group(
        "doc",
        "Character",
        0,
        vec![
            leaf("body", "Body", 70.0, 100.0, 60.0, 90.0, 1),
            LayerNode::group(
                "head_grp",
                "Head",
                2,
                vec![
                    leaf("face", "face", 70.0, 30.0, 60.0, 60.0, 3),
                    leaf("eye", "Eye", 85.0, 50.0, 10.0, 5.0, 4),
                ],
            ),
            LayerNode::group(
                "arm_l_grp",
                "Left Arm",
                5,
                vec![
                    leaf("arm_l_upper", "upper", 40.0, 100.0, 20.0, 40.0, 6),
                    leaf("arm_l_lower", "lower", 40.0, 140.0, 20.0, 40.0, 7),
                    leaf("hand_l", "hand L", 40.0, 180.0, 20.0, 15.0, 8),
                ],
            ),
            LayerNode::group(
                "arm_r_grp",
                "Right Arm",
                9,
                vec![
                    leaf("arm_r_upper", "upper", 140.0, 100.0, 20.0, 40.0, 10),
                    leaf("arm_r_lower", "lower", 140.0, 140.0, 20.0, 40.0, 11),
                    leaf("hand_r", "hand R", 140.0, 180.0, 20.0, 15.0, 12),
                ],
            ),
            LayerNode::group(
                "leg_l_grp",
                "Left Leg",
                13,
                vec![
                    leaf("leg_l_upper", "upper", 75.0, 190.0, 20.0, 45.0, 14),
                    leaf("leg_l_lower", "lower", 75.0, 235.0, 20.0, 45.0, 15),
                    leaf("foot_l", "foot L", 70.0, 280.0, 25.0, 12.0, 16),
                ],
            ),
            LayerNode::group(
                "leg_r_grp",
                "Right Leg",
                17,
                vec![
                    leaf("leg_r_upper", "upper", 105.0, 190.0, 20.0, 45.0, 18),
                    leaf("leg_r_lower", "lower", 105.0, 235.0, 20.0, 45.0, 19),
                    leaf("foot_r", "foot R", 105.0, 280.0, 25.0, 12.0, 20),
                ],
            ),
            leaf("hair", "Hair", 65.0, 20.0, 70.0, 50.0, 21),
            leaf("cape", "Cape", 60.0, 100.0, 80.0, 100.0, 22),
        ],
    ))
}

/// Torso and head only.
pub fn bust() -> LayerTree {
    LayerTree::new(LayerNode::group(
        "doc",
        "Bust",
        0,
        vec![
            leaf("torso", "Torso", 40.0, 60.0, 40.0, 80.0, 1),
            leaf("head", "Head", 40.0, 10.0, 40.0, 45.0, 2),
        ],
    ))
}

/// Torso and a head group with a default face plus happy and sad
/// expression layers drawn over it.
pub fn expressive_bust() -> LayerTree {
    LayerTree::new(LayerNode::group(
        "doc",
        "Bust",
        0,
        vec![
            leaf("torso", "Torso", 40.0, 60.0, 40.0, 80.0, 1),
            LayerNode::group(
                "head_grp",
                "Head",
                2,
                vec![
                    leaf("face", "face", 40.0, 10.0, 40.0, 45.0, 3),
                    leaf("face_happy", "face_happy", 45.0, 20.0, 30.0, 25.0, 4),
                    leaf("face_sad", "Sad Face", 45.0, 20.0, 30.0, 25.0, 5),
                ],
            ),
        ],
    ))
}

/// A temporary directory holding CLI inputs and outputs.
pub struct ProjectFixture {
    pub root: TempDir,
}

impl ProjectFixture {
    /// Creates an empty project directory.
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// The project root path.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Path of a file inside the project, as a string for CLI arguments.
    pub fn file(&self, name: &str) -> String {
        self.path().join(name).to_string_lossy().into_owned()
    }

    /// Writes a layer tree as `layers.json`.
    pub fn write_layers(&self, tree: &LayerTree) -> PathBuf {
        let json = tree.to_json_pretty().expect("Failed to serialize layer tree");
        self.write("layers.json", &json)
    }

    /// Writes an asset manifest as `assets.json`.
    pub fn write_assets(&self, assets: &AssetManifest) -> PathBuf {
        let json = serde_json::to_string_pretty(assets).expect("Failed to serialize assets");
        self.write("assets.json", &json)
    }

    /// Writes an engine config as `engine.json`.
    pub fn write_config(&self, config: &EngineConfig) -> PathBuf {
        let json = serde_json::to_string_pretty(config).expect("Failed to serialize config");
        self.write("engine.json", &json)
    }

    /// Writes an arbitrary file.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path().join(name);
        fs::write(&path, contents).expect("Failed to write fixture file");
        path
    }

    /// Reads a file back.
    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path().join(name)).expect("Failed to read project file")
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}
