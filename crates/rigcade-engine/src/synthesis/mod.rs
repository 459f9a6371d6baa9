//! Keyframe synthesis.
//!
//! A motion template is evaluated against a concrete skeleton by matching
//! bones on body part and side, never by index or name, so characters with
//! missing limbs still animate. The pipeline per request:
//!
//! 1. Look up the template and the emotion profile.
//! 2. Derive the duration and the key sample times. Tremulous emotions are
//!    keyed every frame so the tremor survives sampling.
//! 3. Sum channel curves per bone, scaled by intensity and emotion energy,
//!    with emotion biases and tremor added.
//! 4. Drive follower bones from their anchor's curve with a damped spring.
//! 5. Place effect events on the template's beats.
//! 6. Swap the face slot to the emotion's expression layer, if the
//!    skeleton has one.

mod emotion;
mod secondary;
mod template;


use std::collections::BTreeMap;

use log::{debug, warn};

use rigcade_model::{
    AnimationIntent, AttachmentKey, BodyRegion, Bone, BoneId, EffectAnchor, EffectEvent,
    EngineWarning, Keyframe, Limb, Outcome, PartKind, Side, Skeleton, SynthesisConfig, Timeline, WarningCode,
};

use crate::error::SynthesisError;

pub use emotion::EmotionProfile;
pub use secondary::{follow, sample, SpringParams};
pub use template::{
    BoneSelector, Channel, CurveShape, MotionTemplate, Property, SideSelector, TemplateTable,
};

/// Keys closer than this fraction of an interval to the end are dropped.
const TAIL_FRACTION: f64 = 0.5;

/// Synthesizes a timeline for `intent` on `skeleton`.
///
/// Fails only when the template table has no entry for the motion. A
/// skeleton lacking the template's required bones yields a root-only rest
/// timeline with a `PartialSkeleton` warning instead.
pub fn synthesize(
    skeleton: &Skeleton,
    intent: &AnimationIntent,
    templates: &TemplateTable,
    config: &SynthesisConfig,
) -> Result<Outcome<Timeline>, SynthesisError> {
    Synthesizer::new(templates, config).synthesize(skeleton, intent)
}

/// Borrowed template table plus settings; cheap to share across threads.
#[derive(Debug, Clone, Copy)]
pub struct Synthesizer<'a> {
    templates: &'a TemplateTable,
    config: &'a SynthesisConfig,
}

impl<'a> Synthesizer<'a> {
    /// Creates a synthesizer over a template table.
    pub fn new(templates: &'a TemplateTable, config: &'a SynthesisConfig) -> Self {
        Self { templates, config }
    }

    /// See [`synthesize`].
    pub fn synthesize(
        &self,
        skeleton: &Skeleton,
        intent: &AnimationIntent,
    ) -> Result<Outcome<Timeline>, SynthesisError> {
        let template = self
            .templates
            .get(intent.base_motion)
            .ok_or(SynthesisError::UnknownTemplate(intent.base_motion))?;
        let profile = EmotionProfile::for_emotion(intent.emotion);
        let duration = template.cycle_seconds / (intent.speed_factor * profile.tempo);
        let interval = if profile.jitters() {
            self.config.frame_seconds()
        } else {
            self.config.key_interval_seconds()
        };
        let times = key_times(duration, interval);
        let primary = primary_side(skeleton, intent);
        let mut warnings = Vec::new();

        let missing_required: Vec<String> = template
            .required
            .iter()
            .filter(|s| !resolves(skeleton, s, primary))
            .map(ToString::to_string)
            .collect();

        let mut timeline =
            Timeline::new(intent.animation_name(), duration, self.config.frame_rate);

        if !missing_required.is_empty() {
            warnings.push(EngineWarning::new(
                WarningCode::PartialSkeleton,
                format!(
                    "skeleton has no {} needed for '{}'; emitting rest pose",
                    missing_required.join(", "),
                    intent.base_motion
                ),
            ));
            if let Some(root) = skeleton.root() {
                timeline
                    .tracks
                    .insert(root.id, vec![Keyframe::rest(0.0), Keyframe::rest(duration)]);
            }
        } else {
            let mut missing_optional: Vec<String> = Vec::new();
            for channel in &template.channels {
                let name = channel.selector.to_string();
                if !resolves(skeleton, &channel.selector, primary)
                    && !missing_optional.contains(&name)
                {
                    missing_optional.push(name);
                }
            }
            if !missing_optional.is_empty() {
                warnings.push(EngineWarning::new(
                    WarningCode::PartialSkeleton,
                    format!(
                        "'{}' skips {}: no matching bones",
                        intent.base_motion,
                        missing_optional.join(", ")
                    ),
                ));
            }

            let evaluator = Evaluator {
                skeleton,
                intent,
                template,
                profile,
                duration,
                primary,
                sample_rate: interval.recip(),
            };
            timeline.tracks = evaluator.primary_tracks(&times);
            self.add_follower_tracks(&evaluator, &times, &mut timeline.tracks);
            timeline.event_tracks = effect_events(intent, template, duration);
            if let Some((slot, keys)) = expression_keys(skeleton, intent) {
                timeline.slot_keys.insert(slot, keys);
            }
        }

        timeline.validate()?;

        for warning in &warnings {
            warn!("{}", warning);
        }
        debug!(
            "synthesized '{}': {:.3}s, {} tracks, {} keys, {} events",
            timeline.name,
            timeline.duration_seconds,
            timeline.tracks.len(),
            timeline.key_count(),
            timeline.event_tracks.len()
        );
        Ok(Outcome::with_warnings(timeline, warnings))
    }

    fn add_follower_tracks(
        &self,
        evaluator: &Evaluator<'_>,
        times: &[f64],
        tracks: &mut BTreeMap<BoneId, Vec<Keyframe>>,
    ) {
        let params = SpringParams {
            stiffness: self.config.follower_stiffness,
            gain: self.config.follower_gain,
            lag_seconds: self.config.follower_lag_seconds,
        };
        // Arena order puts parents first, so nested followers see their
        // anchor's finished track.
        let skeleton = evaluator.skeleton;
        for bone in skeleton.bones().iter().filter(|b| b.follower) {
            let Some(anchor) = skeleton
                .ancestors(bone.id)
                .into_iter()
                .find_map(|id| tracks.get(&id))
            else {
                continue;
            };
            let values = if evaluator.animated(bone) {
                follow(anchor, times, evaluator.duration, evaluator.template.looping, &params)
            } else {
                vec![0.0; times.len()]
            };
            let keys = times
                .iter()
                .zip(values)
                .map(|(&time, rotation)| Keyframe {
                    rotation,
                    ..Keyframe::rest(time)
                })
                .collect();
            tracks.insert(bone.id, keys);
        }
    }
}

/// Per-request evaluation state.
struct Evaluator<'a> {
    skeleton: &'a Skeleton,
    intent: &'a AnimationIntent,
    template: &'a MotionTemplate,
    profile: EmotionProfile,
    duration: f64,
    primary: Side,
    /// Keys per second.
    sample_rate: f64,
}

impl Evaluator<'_> {
    /// True if the bone is inside the targeted regions. Root never is when
    /// any region is targeted.
    fn animated(&self, bone: &Bone) -> bool {
        self.intent.targets(bone.region)
    }

    fn primary_tracks(&self, times: &[f64]) -> BTreeMap<BoneId, Vec<Keyframe>> {
        let body_height = self.skeleton.bounds().height.max(1.0);
        let scale = self.intent.intensity * self.profile.energy;
        let mut tracks = BTreeMap::new();

        for bone in self.skeleton.bones() {
            let channels: Vec<&Channel> = self
                .template
                .channels
                .iter()
                .filter(|c| c.selector.selects(bone, self.primary))
                .collect();
            if channels.is_empty() {
                continue;
            }

            let animated = self.animated(bone);
            let bias = self.bias(bone);
            let keys = times
                .iter()
                .map(|&time| {
                    if !animated {
                        return Keyframe::rest(time);
                    }
                    let t = time / self.duration;
                    let (mut rotation, mut x, mut y) = (0.0, 0.0, 0.0);
                    for channel in &channels {
                        let value = channel.value(t, bone.side);
                        match channel.property {
                            Property::Rotate => rotation += value,
                            Property::TranslateX => x += value * body_height,
                            Property::TranslateY => y += value * body_height,
                        }
                    }
                    if bone.parent.is_some() {
                        rotation += bias + self.profile.jitter(time, self.sample_rate);
                    }
                    Keyframe {
                        rotation: scale * rotation,
                        x: scale * x,
                        y: scale * y,
                        ..Keyframe::rest(time)
                    }
                })
                .collect();
            tracks.insert(bone.id, keys);
        }
        tracks
    }

    /// Constant emotion offset for a bone, mirrored for left arms.
    fn bias(&self, bone: &Bone) -> f64 {
        match bone.part {
            Some(PartKind::Head) => self.profile.head_bias,
            Some(PartKind::Torso) => self.profile.torso_bias,
            Some(PartKind::UpperArm | PartKind::Arm) => match bone.side {
                Side::Left => -self.profile.arm_bias,
                _ => self.profile.arm_bias,
            },
            _ => 0.0,
        }
    }
}

/// The face slot's attachment key for the intent's emotion.
fn expression_keys(
    skeleton: &Skeleton,
    intent: &AnimationIntent,
) -> Option<(String, Vec<AttachmentKey>)> {
    let set = skeleton.expressions()?;
    let layer = set.swap_for(intent.emotion)?;
    debug!("'{}' wears expression '{}'", intent.emotion, layer);
    Some((
        set.base_layer.clone(),
        vec![AttachmentKey {
            time: 0.0,
            layer: layer.to_string(),
        }],
    ))
}

/// Key sample times: every `interval` from zero, ending exactly at `duration`.
pub fn key_times(duration: f64, interval: f64) -> Vec<f64> {
    let mut times = Vec::new();
    if interval > 0.0 && interval.is_finite() {
        let mut k = 0u32;
        loop {
            let time = k as f64 * interval;
            if time >= duration - interval * TAIL_FRACTION {
                break;
            }
            times.push(time);
            k += 1;
        }
    }
    if times.is_empty() {
        times.push(0.0);
    }
    times.push(duration);
    times
}

/// The side a one-sided motion is performed with.
///
/// A single targeted arm wins; otherwise the right arm if the skeleton has
/// one, else the left.
pub fn primary_side(skeleton: &Skeleton, intent: &AnimationIntent) -> Side {
    let left = intent.target_parts.contains(&BodyRegion::LeftArm);
    let right = intent.target_parts.contains(&BodyRegion::RightArm);
    match (left, right) {
        (true, false) => Side::Left,
        (false, true) => Side::Right,
        _ => {
            let has_arm = |side: Side| {
                skeleton
                    .bones()
                    .iter()
                    .any(|b| b.side == side && b.part.and_then(|p| p.limb()) == Some(Limb::Arm))
            };
            if !has_arm(Side::Right) && has_arm(Side::Left) {
                Side::Left
            } else {
                Side::Right
            }
        }
    }
}

fn resolves(skeleton: &Skeleton, selector: &BoneSelector, primary: Side) -> bool {
    skeleton.bones().iter().any(|b| selector.selects(b, primary))
}

/// Effect events on the template's beats, sorted by time.
fn effect_events(
    intent: &AnimationIntent,
    template: &MotionTemplate,
    duration: f64,
) -> Vec<EffectEvent> {
    let mut events = Vec::new();
    for &effect in &intent.effects {
        let beats: &[f64] = match effect.spec().anchor {
            EffectAnchor::Emphasis if !template.emphasis.is_empty() => &template.emphasis,
            EffectAnchor::Contact if !template.contacts.is_empty() => &template.contacts,
            EffectAnchor::Emphasis | EffectAnchor::Contact => &[0.5],
            EffectAnchor::Start => &[0.0],
        };
        for beat in beats {
            events.push(EffectEvent {
                time: (beat * duration).clamp(0.0, duration),
                effect,
            });
        }
    }
    events.sort_by(|a, b| a.time.total_cmp(&b.time).then(a.effect.cmp(&b.effect)));
    events.dedup();
    events
}
