//! Spine 4.1 JSON project document.
//!
//! These types mirror the subset of the Spine skeleton JSON schema that
//! Rigcade emits. Field names follow the schema (camelCase); arrays keep
//! declaration order, which Spine relies on for parent resolution and draw
//! order. Maps are `BTreeMap` so output is byte-stable.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::error::{ExportError, ExportResult};

/// Top-level project document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDocument {
    /// Header.
    pub skeleton: SkeletonHeader,
    /// Bones, parents before children.
    pub bones: Vec<BoneData>,
    /// Slots in draw order.
    #[serde(default)]
    pub slots: Vec<SlotData>,
    /// IK constraints.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ik: Vec<IkData>,
    /// Skins; Rigcade emits only `default`.
    #[serde(default)]
    pub skins: Vec<SkinData>,
    /// Event declarations.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub events: BTreeMap<String, EventData>,
    /// Animations by name.
    #[serde(default)]
    pub animations: BTreeMap<String, AnimationData>,
}

/// Document header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkeletonHeader {
    /// Content hash of the skeleton.
    pub hash: String,
    /// Schema version, e.g. `4.1.00`.
    pub spine: String,
    /// Left edge of the setup-pose bounds.
    pub x: f64,
    /// Bottom edge of the setup-pose bounds.
    pub y: f64,
    /// Bounds width.
    pub width: f64,
    /// Bounds height.
    pub height: f64,
    /// Image directory.
    pub images: String,
    /// Audio directory.
    #[serde(default)]
    pub audio: String,
}

/// Bone declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub length: f64,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub rotation: f64,
}

/// Slot declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotData {
    pub name: String,
    pub bone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
}

/// IK constraint declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IkData {
    pub name: String,
    #[serde(default)]
    pub order: u32,
    pub bones: Vec<String>,
    pub target: String,
    #[serde(default = "default_mix")]
    pub mix: f64,
    #[serde(default)]
    pub bend_positive: bool,
}

fn default_mix() -> f64 {
    1.0
}

/// A named skin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinData {
    pub name: String,
    /// Slot name -> attachment name -> attachment.
    #[serde(default)]
    pub attachments: BTreeMap<String, BTreeMap<String, RegionAttachment>>,
}

/// Textured quad attached to a slot's bone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionAttachment {
    /// Image path relative to the images directory, without extension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub rotation: f64,
    pub width: f64,
    pub height: f64,
}

/// Event declaration with default payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    #[serde(default)]
    pub int: i64,
    #[serde(default)]
    pub float: f64,
    #[serde(default)]
    pub string: String,
}

/// One animation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationData {
    /// Bone name -> timelines.
    #[serde(default)]
    pub bones: BTreeMap<String, BoneTimelines>,
    /// Slot name -> timelines.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub slots: BTreeMap<String, SlotTimelines>,
    /// Event keys in time order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<EventKey>,
}

/// Timelines for one slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotTimelines {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachment: Vec<AttachmentSwap>,
}

/// Attachment key; `None` hides the slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentSwap {
    pub time: f64,
    pub name: Option<String>,
}

/// Timelines for one bone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoneTimelines {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rotate: Vec<RotateKey>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub translate: Vec<TranslateKey>,
}

/// Rotation key. A missing curve means linear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotateKey {
    pub time: f64,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve: Option<String>,
}

/// Translation key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslateKey {
    pub time: f64,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve: Option<String>,
}

/// Event key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventKey {
    pub time: f64,
    pub name: String,
    #[serde(default)]
    pub int: i64,
    #[serde(default)]
    pub float: f64,
    #[serde(default)]
    pub string: String,
}

/// An IK constraint as read back from a document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct IkMembership {
    pub name: String,
    pub bones: Vec<String>,
    pub target: String,
}

impl ProjectDocument {
    /// Parses a document and checks its declaration order.
    pub fn from_json(json: &str) -> ExportResult<Self> {
        let document: ProjectDocument = serde_json::from_str(json)?;
        document.check_references()?;
        Ok(document)
    }

    /// Serializes to pretty JSON.
    pub fn to_json_pretty(&self) -> ExportResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serializes to compact JSON.
    pub fn to_json(&self) -> ExportResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Ensures parents are declared before their children and that every
    /// other bone reference names a declared bone.
    pub fn check_references(&self) -> ExportResult<()> {
        let mut declared: HashSet<&str> = HashSet::new();
        for bone in &self.bones {
            if let Some(parent) = &bone.parent {
                if !declared.contains(parent.as_str()) {
                    return Err(unknown(format!("bone '{}'", bone.name), parent));
                }
            }
            declared.insert(&bone.name);
        }

        for slot in &self.slots {
            if !declared.contains(slot.bone.as_str()) {
                return Err(unknown(format!("slot '{}'", slot.name), &slot.bone));
            }
        }
        for ik in &self.ik {
            for bone in ik.bones.iter().chain(std::iter::once(&ik.target)) {
                if !declared.contains(bone.as_str()) {
                    return Err(unknown(format!("ik '{}'", ik.name), bone));
                }
            }
        }
        let slots: HashSet<&str> = self.slots.iter().map(|s| s.name.as_str()).collect();
        for (name, animation) in &self.animations {
            for bone in animation.bones.keys() {
                if !declared.contains(bone.as_str()) {
                    return Err(unknown(format!("animation '{}'", name), bone));
                }
            }
            if let Some(slot) = animation.slots.keys().find(|s| !slots.contains(s.as_str())) {
                return Err(ExportError::UnknownSlot {
                    context: format!("animation '{}'", name),
                    slot: slot.clone(),
                });
            }
        }
        Ok(())
    }

    /// Bone names with their parent names, in declaration order.
    pub fn bone_parents(&self) -> Vec<(String, Option<String>)> {
        self.bones
            .iter()
            .map(|b| (b.name.clone(), b.parent.clone()))
            .collect()
    }

    /// IK constraints with their member bone names, in declaration order.
    pub fn ik_memberships(&self) -> Vec<IkMembership> {
        self.ik
            .iter()
            .map(|ik| IkMembership {
                name: ik.name.clone(),
                bones: ik.bones.clone(),
                target: ik.target.clone(),
            })
            .collect()
    }

    /// Keys per bone in an animation; `None` if the animation is absent.
    pub fn key_counts(&self, animation: &str) -> Option<BTreeMap<String, usize>> {
        let animation = self.animations.get(animation)?;
        Some(
            animation
                .bones
                .iter()
                .map(|(bone, t)| (bone.clone(), t.rotate.len().max(t.translate.len())))
                .collect(),
        )
    }

    /// Attachment names an animation shows on a slot, in key order.
    pub fn attachment_swaps(&self, animation: &str, slot: &str) -> Vec<Option<&str>> {
        self.animations
            .get(animation)
            .and_then(|a| a.slots.get(slot))
            .map(|t| t.attachment.iter().map(|k| k.name.as_deref()).collect())
            .unwrap_or_default()
    }

    /// The default skin, if present.
    pub fn default_skin(&self) -> Option<&SkinData> {
        self.skins.iter().find(|s| s.name == "default")
    }
}

fn unknown(context: String, bone: &str) -> ExportError {
    ExportError::UnknownBone {
        context,
        bone: bone.to_string(),
    }
}
