//! Skeleton types: bones, IK constraints, and skin attachments.
//!
//! Bones live in a single ordered arena and refer to each other by
//! [`BoneId`] (the arena index). A bone's parent always precedes it, so the
//! arena order is a topological order and is also the declaration order
//! used when the skeleton is exported.
//!
//! A [`Skeleton`] is immutable once built. Re-rigging produces a new value.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::{ModelError, SkeletonError};
use crate::geometry::{Point, Rect, Transform2D};
use crate::intent::Emotion;

// =============================================================================
// Identifiers and tags
// =============================================================================

/// Index of a bone in its skeleton's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoneId(pub u32);

impl BoneId {
    /// The arena index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for BoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Structural role of a bone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoneRole {
    /// The single parentless bone.
    Root,
    /// Torso and head.
    Spine,
    /// A non-terminal link of a limb chain.
    LimbLink,
    /// The last bone of a limb chain (hand, foot).
    EndEffector,
    /// Anything else: unmatched layers, hair, cloth.
    Auxiliary,
}

/// Screen-space side qualifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Left side.
    Left,
    /// Right side.
    Right,
    /// Not sided.
    #[default]
    Center,
}

impl Side {
    /// Suffix used in bone names.
    pub fn suffix(&self) -> &'static str {
        match self {
            Side::Left => "_l",
            Side::Right => "_r",
            Side::Center => "",
        }
    }

    /// The mirrored side.
    pub fn opposite(&self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::Center => Side::Center,
        }
    }
}

/// Limb families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Limb {
    /// Arm chain: upper arm, forearm, hand.
    Arm,
    /// Leg chain: thigh, shin, foot.
    Leg,
}

/// Body-part classification of a layer or bone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartKind {
    /// Head.
    Head,
    /// Torso, body, chest.
    Torso,
    /// Upper arm.
    UpperArm,
    /// Forearm.
    Forearm,
    /// A whole arm in one layer.
    Arm,
    /// Hand.
    Hand,
    /// Thigh.
    Thigh,
    /// Shin.
    Shin,
    /// A whole leg in one layer.
    Leg,
    /// Foot.
    Foot,
    /// Hair; follows the head.
    Hair,
    /// Cape, skirt, scarf and the like; follows the torso.
    Cloth,
}

impl PartKind {
    /// Limb family this part belongs to.
    pub fn limb(&self) -> Option<Limb> {
        match self {
            PartKind::UpperArm | PartKind::Forearm | PartKind::Arm | PartKind::Hand => {
                Some(Limb::Arm)
            }
            PartKind::Thigh | PartKind::Shin | PartKind::Leg | PartKind::Foot => Some(Limb::Leg),
            _ => None,
        }
    }

    /// Hands and feet terminate limb chains.
    pub fn is_effector(&self) -> bool {
        matches!(self, PartKind::Hand | PartKind::Foot)
    }

    /// Hair and cloth get secondary motion.
    pub fn is_follower(&self) -> bool {
        matches!(self, PartKind::Hair | PartKind::Cloth)
    }

    /// Base bone name (without side suffix).
    pub fn base_name(&self) -> &'static str {
        match self {
            PartKind::Head => "head",
            PartKind::Torso => "torso",
            PartKind::UpperArm => "upper_arm",
            PartKind::Forearm => "forearm",
            PartKind::Arm => "arm",
            PartKind::Hand => "hand",
            PartKind::Thigh => "thigh",
            PartKind::Shin => "shin",
            PartKind::Leg => "leg",
            PartKind::Foot => "foot",
            PartKind::Hair => "hair",
            PartKind::Cloth => "cloth",
        }
    }
}

/// Coarse body regions, used for request targeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyRegion {
    /// Head and hair.
    Head,
    /// Torso and cloth.
    Torso,
    /// Left arm chain.
    LeftArm,
    /// Right arm chain.
    RightArm,
    /// Left leg chain.
    LeftLeg,
    /// Right leg chain.
    RightLeg,
}

impl BodyRegion {
    /// Region of a limb on one side.
    pub fn for_limb(limb: Limb, side: Side) -> Option<BodyRegion> {
        match (limb, side) {
            (Limb::Arm, Side::Left) => Some(BodyRegion::LeftArm),
            (Limb::Arm, Side::Right) => Some(BodyRegion::RightArm),
            (Limb::Leg, Side::Left) => Some(BodyRegion::LeftLeg),
            (Limb::Leg, Side::Right) => Some(BodyRegion::RightLeg),
            (_, Side::Center) => None,
        }
    }

    /// Region a classified part falls in.
    pub fn for_part(part: PartKind, side: Side) -> Option<BodyRegion> {
        match part {
            PartKind::Head | PartKind::Hair => Some(BodyRegion::Head),
            PartKind::Torso | PartKind::Cloth => Some(BodyRegion::Torso),
            other => other.limb().and_then(|limb| BodyRegion::for_limb(limb, side)),
        }
    }

    /// Region name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyRegion::Head => "head",
            BodyRegion::Torso => "torso",
            BodyRegion::LeftArm => "left_arm",
            BodyRegion::RightArm => "right_arm",
            BodyRegion::LeftLeg => "left_leg",
            BodyRegion::RightLeg => "right_leg",
        }
    }
}

// =============================================================================
// Bones, constraints, attachments
// =============================================================================

/// A bone in bind pose. Transforms are relative to the parent bone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    /// Arena index.
    pub id: BoneId,
    /// Unique name.
    pub name: String,
    /// Parent bone; `None` only for the root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<BoneId>,
    /// Position in the parent's frame.
    pub local_position: Point,
    /// Rotation relative to the parent, in degrees.
    pub local_rotation: f64,
    /// Bone length.
    pub length: f64,
    /// Structural role.
    pub role: BoneRole,
    /// Classified body part, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part: Option<PartKind>,
    /// Side qualifier.
    #[serde(default)]
    pub side: Side,
    /// Region used by request targeting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<BodyRegion>,
    /// True for hair/cloth bones that receive secondary motion.
    #[serde(default)]
    pub follower: bool,
    /// Layer this bone was derived from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_layer: Option<String>,
}

/// Data needed to create a bone; the id is assigned by the builder.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneSpec {
    /// Unique name.
    pub name: String,
    /// Parent bone.
    pub parent: Option<BoneId>,
    /// Position in the parent's frame.
    pub local_position: Point,
    /// Rotation relative to the parent, in degrees.
    pub local_rotation: f64,
    /// Bone length.
    pub length: f64,
    /// Structural role.
    pub role: BoneRole,
    /// Classified part.
    pub part: Option<PartKind>,
    /// Side.
    pub side: Side,
    /// Region.
    pub region: Option<BodyRegion>,
    /// Secondary-motion follower.
    pub follower: bool,
    /// Source layer id.
    pub source_layer: Option<String>,
}

impl BoneSpec {
    /// A bone spec with the given name, parent, and role; everything else
    /// at rest defaults.
    pub fn new(name: impl Into<String>, parent: Option<BoneId>, role: BoneRole) -> Self {
        Self {
            name: name.into(),
            parent,
            local_position: Point::ORIGIN,
            local_rotation: 0.0,
            length: 0.0,
            role,
            part: None,
            side: Side::Center,
            region: None,
            follower: false,
            source_layer: None,
        }
    }
}

/// Bend direction of a two-bone IK solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BendDirection {
    /// Counter-clockwise bend.
    Positive,
    /// Clockwise bend.
    Negative,
}

impl BendDirection {
    /// Returns true for [`BendDirection::Positive`].
    pub fn is_positive(&self) -> bool {
        matches!(self, BendDirection::Positive)
    }
}

/// An IK constraint solving `chain` so the chain tip reaches `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IkConstraint {
    /// Unique constraint name.
    pub name: String,
    /// Bones from chain root to tip; each is the parent of the next.
    pub chain: Vec<BoneId>,
    /// Effector bone the chain solves toward.
    pub target: BoneId,
    /// Bend direction.
    pub bend: BendDirection,
}

/// Binds one pixel layer to one bone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinAttachment {
    /// Source layer id.
    pub layer_id: String,
    /// Source layer name.
    pub layer_name: String,
    /// Bone the image follows.
    pub bone: BoneId,
    /// Image center relative to the bone at bind time.
    pub offset: Transform2D,
    /// Image width.
    pub width: f64,
    /// Image height.
    pub height: f64,
    /// Paint order of the source layer.
    pub z_index: i32,
}

/// Alternate face images, one per emotion, that take turns in one slot.
///
/// The base layer is what the slot shows by default. Every variant is bound
/// to the base layer's bone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionSet {
    /// Layer id of the default face.
    pub base_layer: String,
    /// Layer id per emotion. May include the base layer itself.
    pub variants: BTreeMap<Emotion, String>,
}

impl ExpressionSet {
    /// The layer to show for an emotion, if it differs from the default.
    pub fn swap_for(&self, emotion: Emotion) -> Option<&str> {
        self.variants
            .get(&emotion)
            .map(String::as_str)
            .filter(|layer| *layer != self.base_layer)
    }

    /// Returns true if the layer is a variant other than the base.
    pub fn is_variant(&self, layer_id: &str) -> bool {
        layer_id != self.base_layer && self.variants.values().any(|v| v == layer_id)
    }
}

// =============================================================================
// Skeleton
// =============================================================================

/// Bone hierarchy, IK constraints, and skin attachments for one character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skeleton {
    bones: Vec<Bone>,
    ik_constraints: Vec<IkConstraint>,
    attachments: Vec<SkinAttachment>,
    bounds: Rect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expressions: Option<ExpressionSet>,
}

impl Skeleton {
    /// Starts building a skeleton for a character occupying `bounds`.
    pub fn builder(bounds: Rect) -> SkeletonBuilder {
        SkeletonBuilder {
            skeleton: Skeleton {
                bones: Vec::new(),
                ik_constraints: Vec::new(),
                attachments: Vec::new(),
                bounds,
                expressions: None,
            },
            names: HashMap::new(),
        }
    }

    /// Parses and validates a skeleton from JSON.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let skeleton: Skeleton = serde_json::from_str(json)?;
        skeleton.validate()?;
        Ok(skeleton)
    }

    /// Serializes to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Bones in topological (creation) order.
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// IK constraints in creation order.
    pub fn ik_constraints(&self) -> &[IkConstraint] {
        &self.ik_constraints
    }

    /// Skin attachments in paint order.
    pub fn attachments(&self) -> &[SkinAttachment] {
        &self.attachments
    }

    /// Character bounds in image space.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Face variants, if the character has any.
    pub fn expressions(&self) -> Option<&ExpressionSet> {
        self.expressions.as_ref()
    }

    /// Layer whose slot shows `layer_id`: the base face for face variants,
    /// the layer itself otherwise.
    pub fn slot_layer<'a>(&'a self, layer_id: &'a str) -> &'a str {
        match &self.expressions {
            Some(set) if set.is_variant(layer_id) => &set.base_layer,
            _ => layer_id,
        }
    }

    /// Attachment binding a layer.
    pub fn attachment(&self, layer_id: &str) -> Option<&SkinAttachment> {
        self.attachments.iter().find(|a| a.layer_id == layer_id)
    }

    /// Looks up a bone by id.
    pub fn bone(&self, id: BoneId) -> Option<&Bone> {
        self.bones.get(id.index())
    }

    /// Looks up a bone by name.
    pub fn bone_by_name(&self, name: &str) -> Option<&Bone> {
        self.bones.iter().find(|b| b.name == name)
    }

    /// The root bone.
    pub fn root(&self) -> Option<&Bone> {
        self.bones.first()
    }

    /// Bones matching a predicate, in arena order.
    pub fn bones_where<'a, F>(&'a self, mut pred: F) -> impl Iterator<Item = &'a Bone> + 'a
    where
        F: FnMut(&Bone) -> bool + 'a,
    {
        self.bones.iter().filter(move |b| pred(b))
    }

    /// Direct children of a bone.
    pub fn children(&self, id: BoneId) -> impl Iterator<Item = &Bone> + '_ {
        self.bones.iter().filter(move |b| b.parent == Some(id))
    }

    /// Walks from `id` up to the root (excluding `id`).
    pub fn ancestors(&self, id: BoneId) -> Vec<BoneId> {
        let mut out = Vec::new();
        let mut current = self.bone(id).and_then(|b| b.parent);
        while let Some(p) = current {
            out.push(p);
            current = self.bone(p).and_then(|b| b.parent);
        }
        out
    }

    /// World (rig-space) position and rotation of every bone, by index.
    pub fn world_transforms(&self) -> Vec<(Point, f64)> {
        let mut world: Vec<(Point, f64)> = Vec::with_capacity(self.bones.len());
        for bone in &self.bones {
            let entry = match bone.parent.and_then(|p| world.get(p.index()).copied()) {
                Some((ppos, prot)) => (
                    ppos + bone.local_position.rotated(prot),
                    prot + bone.local_rotation,
                ),
                None => (bone.local_position, bone.local_rotation),
            };
            world.push(entry);
        }
        world
    }

    /// Checks every structural invariant.
    pub fn validate(&self) -> Result<(), SkeletonError> {
        let root = self.bones.first().ok_or(SkeletonError::MissingRoot)?;
        if root.parent.is_some() {
            return Err(SkeletonError::MissingRoot);
        }

        let mut names = HashSet::new();
        for (index, bone) in self.bones.iter().enumerate() {
            if bone.id.index() != index {
                return Err(SkeletonError::UnknownBone(bone.id.0));
            }
            if !names.insert(bone.name.as_str()) {
                return Err(SkeletonError::DuplicateBoneName(bone.name.clone()));
            }
            match bone.parent {
                None if index > 0 => return Err(SkeletonError::SecondRoot(bone.name.clone())),
                Some(parent) if parent.index() >= index => {
                    return Err(SkeletonError::UnknownParent {
                        bone: bone.name.clone(),
                        parent: parent.0,
                    })
                }
                _ => {}
            }
        }

        let mut links: HashMap<BoneId, &str> = HashMap::new();
        for ik in &self.ik_constraints {
            self.check_chain(ik)?;
            for &bone in &ik.chain {
                if let Some(first) = links.insert(bone, ik.name.as_str()) {
                    return Err(SkeletonError::SharedChainLink {
                        bone: bone.0,
                        first: first.to_string(),
                        second: ik.name.clone(),
                    });
                }
            }
        }

        let mut layers = HashSet::new();
        for attachment in &self.attachments {
            if self.bone(attachment.bone).is_none() {
                return Err(SkeletonError::UnknownBone(attachment.bone.0));
            }
            if !layers.insert(attachment.layer_id.as_str()) {
                return Err(SkeletonError::DuplicateAttachment(
                    attachment.layer_id.clone(),
                ));
            }
        }

        if let Some(set) = &self.expressions {
            let base = self
                .attachment(&set.base_layer)
                .ok_or_else(|| SkeletonError::ExpressionLayer(set.base_layer.clone()))?;
            for layer in set.variants.values() {
                if self.attachment(layer).map(|a| a.bone) != Some(base.bone) {
                    return Err(SkeletonError::ExpressionLayer(layer.clone()));
                }
            }
        }
        Ok(())
    }

    fn check_chain(&self, ik: &IkConstraint) -> Result<(), SkeletonError> {
        if ik.chain.is_empty() {
            return Err(SkeletonError::NoncontiguousChain(ik.name.clone()));
        }
        for id in ik.chain.iter().chain(std::iter::once(&ik.target)) {
            if self.bone(*id).is_none() {
                return Err(SkeletonError::UnknownBone(id.0));
            }
        }
        for pair in ik.chain.windows(2) {
            if self.bone(pair[1]).and_then(|b| b.parent) != Some(pair[0]) {
                return Err(SkeletonError::NoncontiguousChain(ik.name.clone()));
            }
        }
        // The target must sit on the same lineage as the chain.
        let tip = ik.chain[ik.chain.len() - 1];
        let target_lineage = self.ancestors(ik.target);
        let tip_lineage = self.ancestors(tip);
        if ik.target != tip && !target_lineage.contains(&tip) && !tip_lineage.contains(&ik.target)
        {
            return Err(SkeletonError::NoncontiguousChain(ik.name.clone()));
        }
        Ok(())
    }
}

/// Builds a [`Skeleton`] bone by bone in topological order.
#[derive(Debug)]
pub struct SkeletonBuilder {
    skeleton: Skeleton,
    names: HashMap<String, BoneId>,
}

impl SkeletonBuilder {
    /// Appends a bone. The parent must already exist and the name must be
    /// unique.
    pub fn add_bone(&mut self, spec: BoneSpec) -> Result<BoneId, SkeletonError> {
        let id = BoneId(self.skeleton.bones.len() as u32);
        if self.names.contains_key(&spec.name) {
            return Err(SkeletonError::DuplicateBoneName(spec.name));
        }
        match spec.parent {
            None if id.0 > 0 => return Err(SkeletonError::SecondRoot(spec.name)),
            Some(parent) if parent >= id => {
                return Err(SkeletonError::UnknownParent {
                    bone: spec.name,
                    parent: parent.0,
                })
            }
            _ => {}
        }
        self.names.insert(spec.name.clone(), id);
        self.skeleton.bones.push(Bone {
            id,
            name: spec.name,
            parent: spec.parent,
            local_position: spec.local_position,
            local_rotation: spec.local_rotation,
            length: spec.length,
            role: spec.role,
            part: spec.part,
            side: spec.side,
            region: spec.region,
            follower: spec.follower,
            source_layer: spec.source_layer,
        });
        Ok(id)
    }

    /// Returns a name not yet used, appending `_2`, `_3`, ... if needed.
    pub fn unique_name(&self, base: &str) -> String {
        if !self.names.contains_key(base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{}_{}", base, n))
            .find(|candidate| !self.names.contains_key(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    /// Looks up a bone already added.
    pub fn bone(&self, id: BoneId) -> Option<&Bone> {
        self.skeleton.bone(id)
    }

    /// Number of bones added so far.
    pub fn bone_count(&self) -> usize {
        self.skeleton.bones.len()
    }

    /// World transforms of the bones added so far.
    pub fn world_transforms(&self) -> Vec<(Point, f64)> {
        self.skeleton.world_transforms()
    }

    /// Appends an IK constraint.
    pub fn add_ik(&mut self, ik: IkConstraint) {
        self.skeleton.ik_constraints.push(ik);
    }

    /// Appends a skin attachment.
    pub fn attach(&mut self, attachment: SkinAttachment) {
        self.skeleton.attachments.push(attachment);
    }

    /// Sets the face variants.
    pub fn set_expressions(&mut self, expressions: ExpressionSet) {
        self.skeleton.expressions = Some(expressions);
    }

    /// Validates and returns the skeleton.
    pub fn build(self) -> Result<Skeleton, SkeletonError> {
        self.skeleton.validate()?;
        Ok(self.skeleton)
    }
}
