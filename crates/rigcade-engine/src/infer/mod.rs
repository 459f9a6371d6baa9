//! Skeleton inference from a layer tree.
//!
//! Layer names are classified against a body-part vocabulary, each body
//! slot (`torso`, `head`, `upper_arm_l`, ...) is resolved to one winning
//! layer, and bones are placed from the winners' bounding boxes. Every
//! pixel-bearing layer ends up bound to exactly one bone; layers that match
//! nothing or lose a slot become auxiliary bones rather than disappearing.
//! Face expression layers (`face_happy`, `Sad Face`) skip matching and share
//! the default face's bone so the exporter can swap them on one slot.
//!
//! Bones are created in a fixed order (root, torso, head, left arm, right
//! arm, left leg, right leg, followers, auxiliaries) so the same tree always
//! yields the same skeleton.

mod vocabulary;


use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use log::{debug, warn};
use rigcade_model::{
    image_to_rig, normalize_degrees, BendDirection, BodyRegion, BoneId, BoneRole, BoneSpec,
    Emotion, EngineWarning, ExpressionSet, IkConstraint, InferenceConfig, LayerTree, LayerVisit,
    Limb, Outcome, PartKind, Point, Rect, Side, Skeleton, SkeletonBuilder, SkeletonError,
    SkinAttachment, Transform2D, WarningCode,
};

use crate::error::InferenceError;

pub use vocabulary::{
    classify_name, expression_of, names_face, part_rank, tokenize, NameInfo, Segment,
};

/// Infers a skeleton from a layer tree.
///
/// Deterministic: the same tree and config always produce an identical
/// skeleton. Fails when no visible layer matches the vocabulary or when more
/// than `max_ambiguous_matches` equally specific layers compete for a slot.
pub fn infer(
    tree: &LayerTree,
    config: &InferenceConfig,
) -> Result<Outcome<Skeleton>, InferenceError> {
    tree.validate()?;
    let visits = tree.walk();
    let mut inference = Inference::new(&visits, config);
    inference.classify();
    if inference.candidates.is_empty() {
        return Err(InferenceError::NoMatchableLayers);
    }
    debug!(
        "classified {} of {} layers as body parts",
        inference.candidates.len(),
        visits.len()
    );

    let overall = tree.bounds().unwrap_or(tree.root.bounds);
    inference.build(overall)
}

/// Bend direction policy for limb IK.
pub fn bend_direction(limb: Limb, side: Side) -> BendDirection {
    match (limb, side) {
        (Limb::Arm, Side::Left) => BendDirection::Positive,
        (Limb::Arm, _) => BendDirection::Negative,
        (Limb::Leg, _) => BendDirection::Negative,
    }
}

// =============================================================================
// Classification
// =============================================================================

/// A visible layer whose name resolved to a body part.
#[derive(Debug, Clone)]
struct Candidate {
    visit: usize,
    part: PartKind,
    side: Side,
    specificity: u8,
    term: String,
}

/// Outcome of resolving one body slot.
#[derive(Debug, Clone)]
struct SlotPick {
    /// Winning candidate.
    winner: usize,
    /// Candidates on the winner's lineage; they share its bone.
    merged: Vec<usize>,
    /// Unrelated candidates that lost.
    losers: Vec<usize>,
}

/// A layer that still needs an auxiliary bone.
#[derive(Debug, Clone)]
struct AuxRequest {
    parent: BoneId,
    warning: EngineWarning,
}

/// One link of a limb chain before bone creation.
#[derive(Debug, Clone)]
struct LinkPlan {
    pick: SlotPick,
    part: PartKind,
    span: (f64, f64),
}

struct Inference<'a> {
    visits: &'a [LayerVisit<'a>],
    config: &'a InferenceConfig,
    candidates: Vec<Candidate>,
    /// Face variant layers by visit; they share the default face's bone.
    expressions: BTreeMap<usize, Emotion>,
    warnings: Vec<EngineWarning>,
}

impl<'a> Inference<'a> {
    fn new(visits: &'a [LayerVisit<'a>], config: &'a InferenceConfig) -> Self {
        Self {
            visits,
            config,
            candidates: Vec::new(),
            expressions: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    /// Visible groups and visible leaves with pixels.
    fn active(&self, v: usize) -> bool {
        let visit = &self.visits[v];
        !visit.hidden && (!visit.node.is_leaf() || visit.node.has_pixels())
    }

    fn ancestors(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.visits[v].parent, move |&p| self.visits[p].parent)
    }

    fn is_ancestor(&self, a: usize, b: usize) -> bool {
        self.ancestors(b).any(|p| p == a)
    }

    fn related(&self, a: usize, b: usize) -> bool {
        a == b || self.is_ancestor(a, b) || self.is_ancestor(b, a)
    }

    fn bounds(&self, candidate: usize) -> Rect {
        self.visits[self.candidates[candidate].visit].node.bounds
    }

    fn layer_id(&self, candidate: usize) -> &str {
        &self.visits[self.candidates[candidate].visit].node.id
    }

    fn push_warning(&mut self, warning: EngineWarning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    fn classify(&mut self) {
        let infos: Vec<NameInfo> = self
            .visits
            .iter()
            .map(|v| classify_name(&v.node.name))
            .collect();

        // The first layer per emotion is the variant; repeats rig normally.
        for v in 0..self.visits.len() {
            if !self.active(v) || !self.visits[v].node.is_leaf() {
                continue;
            }
            if let Some(emotion) = expression_of(&self.visits[v].node.name) {
                if !self.expressions.values().any(|&e| e == emotion) {
                    self.expressions.insert(v, emotion);
                }
            }
        }

        for v in 0..self.visits.len() {
            if !self.active(v) || self.expressions.contains_key(&v) {
                continue;
            }
            let info = &infos[v];
            let part = match (info.part, info.segment) {
                (Some(part), _) => Some(part),
                (None, Some(segment)) => self
                    .ancestors(v)
                    .find_map(|a| infos[a].part.and_then(|p| p.limb()))
                    .map(|limb| segment.on(limb)),
                (None, None) => None,
            };
            let Some(part) = part else {
                continue;
            };
            let inherited = self.ancestors(v).find_map(|a| infos[a].side);
            let side = info.side.or(inherited).unwrap_or(Side::Center);
            self.candidates.push(Candidate {
                visit: v,
                part,
                side,
                specificity: part_rank(part) + u8::from(info.side.is_some()),
                term: info
                    .term
                    .clone()
                    .unwrap_or_else(|| part.base_name().to_string()),
            });
        }
    }

    /// Gives unsided limb layers a side from their position relative to the
    /// body's center line. Segments inside a whole-limb group follow the
    /// group's position.
    fn resolve_sides(&mut self, center_x: f64) {
        for i in 0..self.candidates.len() {
            let (visit, side, part) = {
                let c = &self.candidates[i];
                (c.visit, c.side, c.part)
            };
            let Some(limb) = part.limb() else {
                continue;
            };
            if side != Side::Center {
                continue;
            }
            let whole = match limb {
                Limb::Arm => PartKind::Arm,
                Limb::Leg => PartKind::Leg,
            };
            let reference = if part == whole {
                visit
            } else {
                self.ancestors(visit)
                    .find(|&a| {
                        self.candidates
                            .iter()
                            .any(|o| o.visit == a && o.part == whole)
                    })
                    .unwrap_or(visit)
            };
            let x = self.visits[reference].node.bounds.center().x;
            self.candidates[i].side = if x < center_x { Side::Left } else { Side::Right };
        }
    }

    fn members<F>(&self, pred: F) -> Vec<usize>
    where
        F: Fn(&Candidate) -> bool,
    {
        (0..self.candidates.len())
            .filter(|&i| pred(&self.candidates[i]))
            .collect()
    }

    /// Resolves one slot: the most specific candidates compete, the deepest
    /// wins, and document order breaks remaining ties.
    fn pick_slot(&self, slot: &str, members: &[usize]) -> Result<Option<SlotPick>, InferenceError> {
        let Some(top_spec) = members
            .iter()
            .map(|&m| self.candidates[m].specificity)
            .max()
        else {
            return Ok(None);
        };
        let top: Vec<usize> = members
            .iter()
            .copied()
            .filter(|&m| self.candidates[m].specificity == top_spec)
            .collect();
        // A group and a layer inside it naming the same slot are one match.
        let distinct: Vec<usize> = top
            .iter()
            .copied()
            .filter(|&m| {
                !top.iter().any(|&o| {
                    o != m && self.is_ancestor(self.candidates[m].visit, self.candidates[o].visit)
                })
            })
            .collect();
        if distinct.len() > self.config.max_ambiguous_matches {
            return Err(InferenceError::AmbiguousMatch {
                slot: slot.to_string(),
                candidates: distinct
                    .iter()
                    .map(|&m| self.layer_id(m).to_string())
                    .collect(),
            });
        }
        let Some(winner) = distinct.iter().copied().min_by_key(|&m| {
            let visit = self.candidates[m].visit;
            (Reverse(self.visits[visit].depth), visit)
        }) else {
            return Ok(None);
        };

        let mut merged = Vec::new();
        let mut losers = Vec::new();
        for &m in members {
            if m == winner {
                continue;
            }
            if self.related(self.candidates[m].visit, self.candidates[winner].visit) {
                merged.push(m);
            } else {
                losers.push(m);
            }
        }
        if !losers.is_empty() {
            debug!(
                "slot {}: '{}' wins over {} other layer(s)",
                slot,
                self.layer_id(winner),
                losers.len()
            );
        }
        Ok(Some(SlotPick {
            winner,
            merged,
            losers,
        }))
    }

    /// Records which layers a freshly created slot bone stands for.
    fn claim(
        &self,
        slot: &str,
        pick: &SlotPick,
        bone: BoneId,
        node_bone: &mut HashMap<usize, BoneId>,
        aux: &mut BTreeMap<usize, AuxRequest>,
    ) {
        node_bone.insert(self.candidates[pick.winner].visit, bone);
        for &m in &pick.merged {
            node_bone.entry(self.candidates[m].visit).or_insert(bone);
        }
        for &m in &pick.losers {
            aux.insert(
                self.candidates[m].visit,
                AuxRequest {
                    parent: bone,
                    warning: EngineWarning::new(
                        WarningCode::TieBroken,
                        format!(
                            "layer '{}' also matched {}; '{}' was chosen",
                            self.layer_id(m),
                            slot,
                            self.layer_id(pick.winner)
                        ),
                    ),
                },
            );
        }
    }

    // =========================================================================
    // Bone construction
    // =========================================================================

    fn build(mut self, overall: Rect) -> Result<Outcome<Skeleton>, InferenceError> {
        let mut rig = RigBuilder::new(Skeleton::builder(overall));
        let mut node_bone: HashMap<usize, BoneId> = HashMap::new();
        let mut aux: BTreeMap<usize, AuxRequest> = BTreeMap::new();

        let root = rig.add(
            BoneSpec::new("root", None, BoneRole::Root),
            image_to_rig(overall.center()),
            0.0,
        )?;

        let torso_pick = self.pick_slot("torso", &self.members(|c| c.part == PartKind::Torso))?;
        let head_pick = self.pick_slot("head", &self.members(|c| c.part == PartKind::Head))?;
        let torso_center = torso_pick
            .as_ref()
            .map(|p| self.bounds(p.winner).center())
            .unwrap_or_else(|| overall.center());
        self.resolve_sides(torso_center.x);

        let torso = match &torso_pick {
            Some(pick) => {
                let id = self.add_spine_bone(&mut rig, pick, PartKind::Torso, root)?;
                self.claim("torso", pick, id, &mut node_bone, &mut aux);
                Some(id)
            }
            None => None,
        };
        let body = torso.unwrap_or(root);
        let head = match &head_pick {
            Some(pick) => {
                let id = self.add_spine_bone(&mut rig, pick, PartKind::Head, body)?;
                self.claim("head", pick, id, &mut node_bone, &mut aux);
                Some(id)
            }
            None => None,
        };

        // Shoulder and hip points orient limb layers and order their links.
        let (shoulder, hip) = match &torso_pick {
            Some(pick) => {
                let t = self.bounds(pick.winner);
                (
                    Point::new(t.center().x, t.y),
                    Point::new(t.center().x, t.bottom()),
                )
            }
            None => {
                let c = overall.center();
                (
                    Point::new(c.x, overall.y + overall.height * 0.25),
                    Point::new(c.x, overall.y + overall.height * 0.55),
                )
            }
        };
        for (limb, side) in [
            (Limb::Arm, Side::Left),
            (Limb::Arm, Side::Right),
            (Limb::Leg, Side::Left),
            (Limb::Leg, Side::Right),
        ] {
            let anchor = match limb {
                Limb::Arm => shoulder,
                Limb::Leg => hip,
            };
            self.build_chain(
                &mut rig,
                limb,
                side,
                body,
                anchor,
                &mut node_bone,
                &mut aux,
            )?;
        }

        self.build_followers(&mut rig, head, torso, root, &mut node_bone)?;
        self.build_auxiliaries(&mut rig, root, &mut node_bone, aux)?;
        self.attach_layers(&mut rig, root, head, &node_bone);

        let skeleton = rig.skeleton.build()?;
        debug!(
            "inferred {} bones, {} IK constraints, {} attachments",
            skeleton.bones().len(),
            skeleton.ik_constraints().len(),
            skeleton.attachments().len()
        );
        Ok(Outcome::with_warnings(skeleton, self.warnings))
    }

    /// Torso and head: origin at the bottom center, pointing up.
    fn add_spine_bone(
        &self,
        rig: &mut RigBuilder,
        pick: &SlotPick,
        part: PartKind,
        parent: BoneId,
    ) -> Result<BoneId, SkeletonError> {
        let b = self.bounds(pick.winner);
        let mut spec = BoneSpec::new(
            rig.skeleton.unique_name(part.base_name()),
            Some(parent),
            BoneRole::Spine,
        );
        spec.length = b.height;
        spec.part = Some(part);
        spec.region = BodyRegion::for_part(part, Side::Center);
        spec.source_layer = Some(self.layer_id(pick.winner).to_string());
        rig.add(spec, image_to_rig(Point::new(b.center().x, b.bottom())), 90.0)
    }

    #[allow(clippy::too_many_arguments)]
    fn build_chain(
        &self,
        rig: &mut RigBuilder,
        limb: Limb,
        side: Side,
        parent: BoneId,
        anchor: Point,
        node_bone: &mut HashMap<usize, BoneId>,
        aux: &mut BTreeMap<usize, AuxRequest>,
    ) -> Result<(), InferenceError> {
        let (whole, effector_part) = match limb {
            Limb::Arm => (PartKind::Arm, PartKind::Hand),
            Limb::Leg => (PartKind::Leg, PartKind::Foot),
        };
        let slot = |part: PartKind| format!("{}{}", part.base_name(), side.suffix());
        let of = |part: PartKind| self.members(|c| c.part == part && c.side == side);

        let mut links = Vec::new();
        for segment in [Segment::Upper, Segment::Lower] {
            let part = segment.on(limb);
            if let Some(pick) = self.pick_slot(&slot(part), &of(part))? {
                links.push(LinkPlan {
                    pick,
                    part,
                    span: (0.0, 1.0),
                });
            }
        }

        let whole_members = of(whole);
        let mut superseded = Vec::new();
        if links.is_empty() {
            if let Some(pick) = self.pick_slot(&slot(whole), &whole_members)? {
                if self.config.split_single_limb {
                    links.push(LinkPlan {
                        pick: pick.clone(),
                        part: Segment::Upper.on(limb),
                        span: (0.0, 0.5),
                    });
                    links.push(LinkPlan {
                        pick: SlotPick {
                            winner: pick.winner,
                            merged: Vec::new(),
                            losers: Vec::new(),
                        },
                        part: Segment::Lower.on(limb),
                        span: (0.5, 1.0),
                    });
                } else {
                    links.push(LinkPlan {
                        pick,
                        part: whole,
                        span: (0.0, 1.0),
                    });
                }
            }
        } else {
            superseded = whole_members;
        }

        // Proximal links first: centroid distance from the attachment point decides.
        if links.len() == 2 && links[0].pick.winner != links[1].pick.winner {
            let d0 = self.bounds(links[0].pick.winner).center().distance(anchor);
            let d1 = self.bounds(links[1].pick.winner).center().distance(anchor);
            if d1 < d0 {
                links.swap(0, 1);
            }
        }

        let mut chain = Vec::new();
        let mut chain_parent = parent;
        for link in &links {
            let name = rig.skeleton.unique_name(&slot(link.part));
            let id = self.add_limb_bone(
                rig,
                name,
                chain_parent,
                link,
                BoneRole::LimbLink,
                limb,
                side,
                anchor,
            )?;
            if node_bone.contains_key(&self.candidates[link.pick.winner].visit) {
                // Second half of a split limb; the layer stays on the first.
                chain.push(id);
                chain_parent = id;
                continue;
            }
            self.claim(&slot(link.part), &link.pick, id, node_bone, aux);
            chain.push(id);
            chain_parent = id;
        }

        if let Some(&first) = chain.first() {
            for m in superseded {
                let visit = self.candidates[m].visit;
                if chain_visits_related(self, &links, visit) {
                    node_bone.entry(visit).or_insert(first);
                } else {
                    aux.insert(
                        visit,
                        AuxRequest {
                            parent: first,
                            warning: EngineWarning::new(
                                WarningCode::AuxiliaryLayer,
                                format!(
                                    "layer '{}' is a whole {} next to separate segments; rigged as auxiliary",
                                    self.layer_id(m),
                                    whole.base_name()
                                ),
                            ),
                        },
                    );
                }
            }
        }

        if let Some(pick) = self.pick_slot(&slot(effector_part), &of(effector_part))? {
            let link = LinkPlan {
                pick,
                part: effector_part,
                span: (0.0, 1.0),
            };
            let name = rig.skeleton.unique_name(&slot(effector_part));
            let id = self.add_limb_bone(
                rig,
                name,
                chain_parent,
                &link,
                BoneRole::EndEffector,
                limb,
                side,
                anchor,
            )?;
            self.claim(&slot(effector_part), &link.pick, id, node_bone, aux);
            chain.push(id);
        }

        if chain.len() >= 2 {
            let target = chain[chain.len() - 1];
            let name = format!(
                "{}{}_ik",
                match limb {
                    Limb::Arm => "arm",
                    Limb::Leg => "leg",
                },
                side.suffix()
            );
            debug!("IK constraint {} over {} bones", name, chain.len() - 1);
            rig.skeleton.add_ik(IkConstraint {
                name,
                chain: chain[..chain.len() - 1].to_vec(),
                target,
                bend: bend_direction(limb, side),
            });
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn add_limb_bone(
        &self,
        rig: &mut RigBuilder,
        name: String,
        parent: BoneId,
        link: &LinkPlan,
        role: BoneRole,
        limb: Limb,
        side: Side,
        anchor: Point,
    ) -> Result<BoneId, SkeletonError> {
        let (proximal, distal) = oriented_axis(self.bounds(link.pick.winner), anchor);
        let start = image_to_rig(proximal.lerp(distal, link.span.0));
        let end = image_to_rig(proximal.lerp(distal, link.span.1));
        let direction = end - start;
        let rotation = if direction.length() > 0.0 {
            direction.angle_degrees()
        } else {
            -90.0
        };

        let mut spec = BoneSpec::new(name, Some(parent), role);
        spec.length = direction.length();
        spec.part = Some(link.part);
        spec.side = side;
        spec.region = BodyRegion::for_limb(limb, side);
        spec.source_layer = Some(self.layer_id(link.pick.winner).to_string());
        rig.add(spec, start, rotation)
    }

    /// Hair hangs from the head and cloth from the torso. A follower layer
    /// nested in another follower hangs from that one instead.
    fn build_followers(
        &self,
        rig: &mut RigBuilder,
        head: Option<BoneId>,
        torso: Option<BoneId>,
        root: BoneId,
        node_bone: &mut HashMap<usize, BoneId>,
    ) -> Result<(), InferenceError> {
        let followers = self.members(|c| c.part.is_follower());
        for m in followers {
            let (visit, part, side, term) = {
                let c = &self.candidates[m];
                (c.visit, c.part, c.side, c.term.clone())
            };
            let nested = self.ancestors(visit).find_map(|a| {
                node_bone
                    .get(&a)
                    .copied()
                    .filter(|b| rig.skeleton.bone(*b).is_some_and(|bone| bone.follower))
            });
            let anchor = match part {
                PartKind::Hair => head.or(torso).unwrap_or(root),
                _ => torso.unwrap_or(root),
            };
            let parent = nested.unwrap_or(anchor);

            let b = self.visits[visit].node.bounds;
            let mut spec = BoneSpec::new(
                rig.skeleton.unique_name(&term),
                Some(parent),
                BoneRole::Auxiliary,
            );
            spec.length = b.height;
            spec.part = Some(part);
            spec.side = side;
            spec.region = BodyRegion::for_part(part, side);
            spec.follower = true;
            spec.source_layer = Some(self.visits[visit].node.id.clone());
            let id = rig.add(spec, image_to_rig(Point::new(b.center().x, b.y)), -90.0)?;
            node_bone.insert(visit, id);
        }
        Ok(())
    }

    /// Tie losers, superseded limbs, and unmatched pixel layers, in
    /// document order.
    fn build_auxiliaries(
        &mut self,
        rig: &mut RigBuilder,
        root: BoneId,
        node_bone: &mut HashMap<usize, BoneId>,
        mut requests: BTreeMap<usize, AuxRequest>,
    ) -> Result<(), InferenceError> {
        for v in 0..self.visits.len() {
            if !self.active(v) {
                continue;
            }
            let node = self.visits[v].node;
            let request = match requests.remove(&v) {
                Some(request) => request,
                None if node.is_leaf()
                    && !node_bone.contains_key(&v)
                    && !self.expressions.contains_key(&v) =>
                {
                    let parent = self
                        .ancestors(v)
                        .find_map(|a| node_bone.get(&a).copied())
                        .unwrap_or(root);
                    AuxRequest {
                        parent,
                        warning: EngineWarning::new(
                            WarningCode::AuxiliaryLayer,
                            format!(
                                "layer '{}' ({}) matched no body part; rigged as auxiliary",
                                node.id, node.name
                            ),
                        ),
                    }
                }
                None => continue,
            };

            let (region, side, parent_rotation) = match rig.skeleton.bone(request.parent) {
                Some(bone) => (
                    bone.region,
                    bone.side,
                    rig.world_rotation(request.parent),
                ),
                None => (None, Side::Center, 0.0),
            };
            let mut base = tokenize(&node.name).join("_");
            if base.is_empty() {
                base = "aux".to_string();
            }
            let mut spec = BoneSpec::new(
                rig.skeleton.unique_name(&base),
                Some(request.parent),
                BoneRole::Auxiliary,
            );
            spec.length = node.bounds.long_extent() / 2.0;
            spec.side = side;
            spec.region = region;
            spec.source_layer = Some(node.id.clone());
            let id = rig.add(spec, image_to_rig(node.pivot()), parent_rotation)?;
            node_bone.insert(v, id);
            self.push_warning(request.warning);
        }
        Ok(())
    }

    /// The default face: the first plain `face` layer, else the neutral
    /// variant, else the first variant.
    fn face_base(&self) -> Option<usize> {
        (0..self.visits.len())
            .find(|&v| {
                self.active(v)
                    && self.visits[v].node.is_leaf()
                    && !self.expressions.contains_key(&v)
                    && names_face(&self.visits[v].node.name)
            })
            .or_else(|| {
                self.expressions
                    .iter()
                    .find(|(_, &e)| e == Emotion::Neutral)
                    .map(|(&v, _)| v)
            })
            .or_else(|| self.expressions.keys().next().copied())
    }

    /// One attachment per pixel layer, in paint order. Face variants bind to
    /// the default face's bone.
    fn attach_layers(
        &self,
        rig: &mut RigBuilder,
        root: BoneId,
        head: Option<BoneId>,
        node_bone: &HashMap<usize, BoneId>,
    ) {
        let owner = |v: usize| {
            node_bone
                .get(&v)
                .copied()
                .or_else(|| self.ancestors(v).find_map(|a| node_bone.get(&a).copied()))
        };
        let base = self.face_base().filter(|_| !self.expressions.is_empty());
        let face_bone = base.map(|b| {
            if self.expressions.contains_key(&b) {
                owner(b).or(head).unwrap_or(root)
            } else {
                owner(b).unwrap_or(root)
            }
        });

        for v in 0..self.visits.len() {
            let visit = &self.visits[v];
            if visit.hidden || !visit.node.has_pixels() {
                continue;
            }
            let node = visit.node;
            let bone = match face_bone {
                Some(face) if self.expressions.contains_key(&v) || base == Some(v) => face,
                _ => owner(v).unwrap_or(root),
            };
            let (position, rotation) = rig.world(bone);
            let center = image_to_rig(node.bounds.center());
            rig.skeleton.attach(SkinAttachment {
                layer_id: node.id.clone(),
                layer_name: node.name.clone(),
                bone,
                offset: Transform2D::new(
                    (center - position).rotated(-rotation),
                    normalize_degrees(-rotation),
                ),
                width: node.bounds.width,
                height: node.bounds.height,
                z_index: node.z_index,
            });
        }

        if let Some(base) = base {
            let variants = self
                .expressions
                .iter()
                .map(|(&v, &emotion)| (emotion, self.visits[v].node.id.clone()))
                .collect();
            debug!(
                "face '{}' has {} expression variant(s)",
                self.visits[base].node.id,
                self.expressions.len()
            );
            rig.skeleton.set_expressions(ExpressionSet {
                base_layer: self.visits[base].node.id.clone(),
                variants,
            });
        }
    }
}

fn chain_visits_related(inference: &Inference<'_>, links: &[LinkPlan], visit: usize) -> bool {
    links
        .iter()
        .any(|l| inference.related(visit, inference.candidates[l.pick.winner].visit))
}

/// Long-axis endpoints of a box, the one nearer `anchor` first.
fn oriented_axis(bounds: Rect, anchor: Point) -> (Point, Point) {
    let (a, b) = bounds.long_axis();
    if b.distance(anchor) < a.distance(anchor) {
        (b, a)
    } else {
        (a, b)
    }
}

/// Skeleton builder that also tracks bind-pose world transforms, so bones
/// can be placed in world space and stored relative to their parent.
struct RigBuilder {
    skeleton: SkeletonBuilder,
    world: Vec<(Point, f64)>,
}

impl RigBuilder {
    fn new(skeleton: SkeletonBuilder) -> Self {
        Self {
            skeleton,
            world: Vec::new(),
        }
    }

    fn add(&mut self, mut spec: BoneSpec, position: Point, rotation: f64) -> Result<BoneId, SkeletonError> {
        match spec.parent.and_then(|p| self.world.get(p.index()).copied()) {
            Some((parent_position, parent_rotation)) => {
                spec.local_position = (position - parent_position).rotated(-parent_rotation);
                spec.local_rotation = normalize_degrees(rotation - parent_rotation);
            }
            None => {
                spec.local_position = position;
                spec.local_rotation = rotation;
            }
        }
        let id = self.skeleton.add_bone(spec)?;
        self.world.push((position, rotation));
        Ok(id)
    }

    fn world(&self, id: BoneId) -> (Point, f64) {
        self.world.get(id.index()).copied().unwrap_or((Point::ORIGIN, 0.0))
    }

    fn world_rotation(&self, id: BoneId) -> f64 {
        self.world(id).1
    }
}
