//! Skeleton and timeline to project document conversion.

use log::debug;
use std::collections::{BTreeMap, HashMap};

use rigcade_model::{
    attachment_path, round_to, short_hash, AssetManifest, BoneId, EffectTag, ExportConfig,
    Interpolation, Keyframe, Skeleton, Timeline,
};

use crate::document::{
    AnimationData, AttachmentSwap, BoneData, BoneTimelines, EventData, EventKey, IkData,
    ProjectDocument, RegionAttachment, RotateKey, SkeletonHeader, SkinData, SlotData,
    SlotTimelines, TranslateKey,
};
use crate::error::{ExportError, ExportResult};

/// Decimal places for positions, lengths, and angles.
const SPATIAL_DECIMALS: i32 = 2;
/// Decimal places for key times.
const TIME_DECIMALS: i32 = 4;

/// Name of the single skin Rigcade emits.
pub const DEFAULT_SKIN: &str = "default";

/// Slot name for a layer.
pub fn slot_name(layer_id: &str) -> String {
    format!("slot_{}", layer_id)
}

/// Event name for an effect.
pub fn event_name(effect: EffectTag) -> String {
    format!("effect_{}", effect.as_str())
}

/// Builds a project document from a skeleton and its animations.
///
/// Bones and slots keep the skeleton's arena and attachment order. Every
/// attachment's layer must have an entry in `assets`. Face expression
/// variants share the default face's slot as extra skin entries. Timelines
/// with the same name get `_2`, `_3`, ... suffixes in input order.
pub fn serialize(
    skeleton: &Skeleton,
    timelines: &[Timeline],
    assets: &AssetManifest,
    config: &ExportConfig,
) -> ExportResult<ProjectDocument> {
    let names = |id: BoneId, context: &dyn Fn() -> String| {
        skeleton
            .bone(id)
            .map(|b| b.name.clone())
            .ok_or_else(|| ExportError::UnknownBone {
                context: context(),
                bone: id.to_string(),
            })
    };

    let bounds = skeleton.bounds();
    let skeleton_header = SkeletonHeader {
        hash: short_hash(skeleton)?,
        spine: config.spine_version.clone(),
        x: round_to(bounds.x, SPATIAL_DECIMALS),
        y: round_to(-bounds.bottom(), SPATIAL_DECIMALS),
        width: round_to(bounds.width, SPATIAL_DECIMALS),
        height: round_to(bounds.height, SPATIAL_DECIMALS),
        images: config.images_dir.clone(),
        audio: String::new(),
    };

    let mut bones = Vec::with_capacity(skeleton.bones().len());
    for bone in skeleton.bones() {
        let parent = match bone.parent {
            Some(p) => Some(names(p, &|| format!("bone '{}'", bone.name))?),
            None => None,
        };
        bones.push(BoneData {
            name: bone.name.clone(),
            parent,
            length: round_to(bone.length, SPATIAL_DECIMALS),
            x: round_to(bone.local_position.x, SPATIAL_DECIMALS),
            y: round_to(bone.local_position.y, SPATIAL_DECIMALS),
            rotation: round_to(bone.local_rotation, SPATIAL_DECIMALS),
        });
    }

    let mut slots = Vec::with_capacity(skeleton.attachments().len());
    let mut skin = SkinData {
        name: DEFAULT_SKIN.to_string(),
        attachments: BTreeMap::new(),
    };
    let mut regions: HashMap<&str, String> = HashMap::new();
    for attachment in skeleton.attachments() {
        let path = assets
            .get(&attachment.layer_id)
            .ok_or_else(|| ExportError::MissingAsset {
                layer_id: attachment.layer_id.clone(),
            })?;
        let region_name = attachment_path(path).to_string();
        let owner = skeleton.slot_layer(&attachment.layer_id);
        let slot = slot_name(owner);
        let bone = names(attachment.bone, &|| format!("slot '{}'", slot))?;

        skin.attachments.entry(slot.clone()).or_default().insert(
            region_name.clone(),
            RegionAttachment {
                path: Some(region_name.clone()),
                x: round_to(attachment.offset.x, SPATIAL_DECIMALS),
                y: round_to(attachment.offset.y, SPATIAL_DECIMALS),
                rotation: round_to(attachment.offset.rotation, SPATIAL_DECIMALS),
                width: round_to(attachment.width, SPATIAL_DECIMALS),
                height: round_to(attachment.height, SPATIAL_DECIMALS),
            },
        );
        regions.insert(&attachment.layer_id, region_name.clone());
        if owner == attachment.layer_id {
            slots.push(SlotData {
                name: slot,
                bone,
                attachment: Some(region_name),
            });
        }
    }

    let mut ik = Vec::with_capacity(skeleton.ik_constraints().len());
    for (order, constraint) in skeleton.ik_constraints().iter().enumerate() {
        let context = || format!("ik '{}'", constraint.name);
        let members = constraint
            .chain
            .iter()
            .map(|&id| names(id, &context))
            .collect::<ExportResult<Vec<_>>>()?;
        ik.push(IkData {
            name: constraint.name.clone(),
            order: order as u32,
            bones: members,
            target: names(constraint.target, &context)?,
            mix: 1.0,
            bend_positive: constraint.bend.is_positive(),
        });
    }

    let mut events = BTreeMap::new();
    let mut animations = BTreeMap::new();
    for timeline in timelines {
        let name = unique_animation_name(&timeline.name, &animations);
        let mut animation = AnimationData::default();
        for (&bone, keys) in &timeline.tracks {
            let bone_name = names(bone, &|| format!("animation '{}'", name))?;
            animation.bones.insert(bone_name, bone_timelines(keys));
        }
        for (layer, keys) in &timeline.slot_keys {
            let mut swaps = Vec::with_capacity(keys.len());
            for key in keys {
                let region = regions.get(key.layer.as_str()).ok_or_else(|| {
                    ExportError::MissingAsset {
                        layer_id: key.layer.clone(),
                    }
                })?;
                swaps.push(AttachmentSwap {
                    time: round_to(key.time, TIME_DECIMALS),
                    name: Some(region.clone()),
                });
            }
            animation
                .slots
                .insert(slot_name(layer), SlotTimelines { attachment: swaps });
        }
        for event in &timeline.event_tracks {
            let spec = event.effect.spec();
            let payload = EventData {
                int: i64::from(spec.count),
                float: spec.duration,
                string: spec.color.to_string(),
            };
            animation.events.push(EventKey {
                time: round_to(event.time, TIME_DECIMALS),
                name: event_name(event.effect),
                int: payload.int,
                float: payload.float,
                string: payload.string.clone(),
            });
            events.insert(event_name(event.effect), payload);
        }
        animations.insert(name, animation);
    }

    let document = ProjectDocument {
        skeleton: skeleton_header,
        bones,
        slots,
        ik,
        skins: vec![skin],
        events,
        animations,
    };
    document.check_references()?;
    debug!(
        "serialized {} bones, {} slots, {} ik, {} animations",
        document.bones.len(),
        document.slots.len(),
        document.ik.len(),
        document.animations.len()
    );
    Ok(document)
}

fn bone_timelines(keys: &[Keyframe]) -> BoneTimelines {
    let curve = |k: &Keyframe| match k.curve {
        Interpolation::Linear => None,
        Interpolation::Stepped => Some("stepped".to_string()),
    };
    let rotate = keys
        .iter()
        .map(|k| RotateKey {
            time: round_to(k.time, TIME_DECIMALS),
            value: round_to(k.rotation, SPATIAL_DECIMALS),
            curve: curve(k),
        })
        .collect();
    let translate = if keys.iter().any(Keyframe::has_translation) {
        keys.iter()
            .map(|k| TranslateKey {
                time: round_to(k.time, TIME_DECIMALS),
                x: round_to(k.x, SPATIAL_DECIMALS),
                y: round_to(k.y, SPATIAL_DECIMALS),
                curve: curve(k),
            })
            .collect()
    } else {
        Vec::new()
    };
    BoneTimelines { rotate, translate }
}

fn unique_animation_name(base: &str, taken: &BTreeMap<String, AnimationData>) -> String {
    if !taken.contains_key(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{}_{}", base, n))
        .find(|candidate| !taken.contains_key(candidate))
        .unwrap_or_else(|| base.to_string())
}
