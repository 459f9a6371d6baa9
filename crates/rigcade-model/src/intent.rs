//! Structured animation intent and the effect table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::skeleton::BodyRegion;

/// Base motion classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseMotion {
    /// Breathing idle loop.
    Idle,
    /// Walk cycle.
    Walk,
    /// Run cycle.
    Run,
    /// Single jump.
    Jump,
    /// One-armed wave.
    Wave,
    /// Head nod.
    Nod,
    /// Dance loop.
    Dance,
}

impl BaseMotion {
    /// All motions, in declaration order.
    pub const ALL: [BaseMotion; 7] = [
        BaseMotion::Idle,
        BaseMotion::Walk,
        BaseMotion::Run,
        BaseMotion::Jump,
        BaseMotion::Wave,
        BaseMotion::Nod,
        BaseMotion::Dance,
    ];

    /// Lower-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseMotion::Idle => "idle",
            BaseMotion::Walk => "walk",
            BaseMotion::Run => "run",
            BaseMotion::Jump => "jump",
            BaseMotion::Wave => "wave",
            BaseMotion::Nod => "nod",
            BaseMotion::Dance => "dance",
        }
    }
}

impl std::fmt::Display for BaseMotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emotional coloring of a motion.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    /// No coloring.
    #[default]
    Neutral,
    /// Upbeat.
    Happy,
    /// Droopy and slow.
    Sad,
    /// Sharp and forceful.
    Angry,
    /// Big and fast.
    Excited,
    /// Tense and jittery.
    Scared,
}

impl Emotion {
    /// Every emotion, in declaration order.
    pub const ALL: [Emotion; 6] = [
        Emotion::Neutral,
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Excited,
        Emotion::Scared,
    ];

    /// Lower-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Neutral => "neutral",
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Excited => "excited",
            Emotion::Scared => "scared",
        }
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual effects that can accompany a motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectTag {
    /// Sparkle burst.
    Sparkle,
    /// Flames.
    Fire,
    /// Dust puff at foot contacts.
    Dust,
    /// Water splash.
    Water,
    /// Floating hearts.
    Hearts,
}

/// Where in a motion an effect fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectAnchor {
    /// At the template's emphasis beats.
    Emphasis,
    /// At the template's ground-contact beats.
    Contact,
    /// Once, at time zero.
    Start,
}

/// Static description of one effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectSpec {
    /// Particle tint, `#RRGGBB`.
    pub color: &'static str,
    /// Particles per burst.
    pub count: u32,
    /// Burst lifetime in seconds.
    pub duration: f64,
    /// When the effect fires.
    pub anchor: EffectAnchor,
}

impl EffectTag {
    /// All effects, in declaration order.
    pub const ALL: [EffectTag; 5] = [
        EffectTag::Sparkle,
        EffectTag::Fire,
        EffectTag::Dust,
        EffectTag::Water,
        EffectTag::Hearts,
    ];

    /// Lower-case name; also the exported event name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectTag::Sparkle => "sparkle",
            EffectTag::Fire => "fire",
            EffectTag::Dust => "dust",
            EffectTag::Water => "water",
            EffectTag::Hearts => "hearts",
        }
    }

    /// Particle payload and anchor for this effect.
    pub fn spec(&self) -> EffectSpec {
        match self {
            EffectTag::Sparkle => EffectSpec {
                color: "#FFFF99",
                count: 10,
                duration: 0.5,
                anchor: EffectAnchor::Emphasis,
            },
            EffectTag::Fire => EffectSpec {
                color: "#FF5500",
                count: 20,
                duration: 1.0,
                anchor: EffectAnchor::Start,
            },
            EffectTag::Dust => EffectSpec {
                color: "#C8B496",
                count: 8,
                duration: 0.4,
                anchor: EffectAnchor::Contact,
            },
            EffectTag::Water => EffectSpec {
                color: "#66CCFF",
                count: 15,
                duration: 0.6,
                anchor: EffectAnchor::Emphasis,
            },
            EffectTag::Hearts => EffectSpec {
                color: "#FF6699",
                count: 6,
                duration: 0.8,
                anchor: EffectAnchor::Emphasis,
            },
        }
    }
}

impl std::fmt::Display for EffectTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed form of a free-text animation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationIntent {
    /// Motion template to run.
    pub base_motion: BaseMotion,
    /// Emotional coloring.
    #[serde(default)]
    pub emotion: Emotion,
    /// Amplitude multiplier.
    #[serde(default = "default_unit")]
    pub intensity: f64,
    /// Tempo multiplier.
    #[serde(default = "default_unit")]
    pub speed_factor: f64,
    /// Regions to animate; empty means the whole body.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub target_parts: BTreeSet<BodyRegion>,
    /// Effects to emit.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub effects: BTreeSet<EffectTag>,
}

fn default_unit() -> f64 {
    1.0
}

impl AnimationIntent {
    /// An intent with every optional field at its default.
    pub fn new(base_motion: BaseMotion) -> Self {
        Self {
            base_motion,
            emotion: Emotion::Neutral,
            intensity: 1.0,
            speed_factor: 1.0,
            target_parts: BTreeSet::new(),
            effects: BTreeSet::new(),
        }
    }

    /// Sets the emotion.
    pub fn with_emotion(mut self, emotion: Emotion) -> Self {
        self.emotion = emotion;
        self
    }

    /// Sets the intensity.
    pub fn with_intensity(mut self, intensity: f64) -> Self {
        self.intensity = intensity;
        self
    }

    /// Sets the speed factor.
    pub fn with_speed(mut self, speed_factor: f64) -> Self {
        self.speed_factor = speed_factor;
        self
    }

    /// Adds a targeted region.
    pub fn with_target(mut self, region: BodyRegion) -> Self {
        self.target_parts.insert(region);
        self
    }

    /// Adds an effect.
    pub fn with_effect(mut self, effect: EffectTag) -> Self {
        self.effects.insert(effect);
        self
    }

    /// True if the region is animated under this intent.
    pub fn targets(&self, region: Option<BodyRegion>) -> bool {
        if self.target_parts.is_empty() {
            return true;
        }
        region.is_some_and(|r| self.target_parts.contains(&r))
    }

    /// Default animation name, e.g. `wave` or `wave_happy`.
    pub fn animation_name(&self) -> String {
        match self.emotion {
            Emotion::Neutral => self.base_motion.as_str().to_string(),
            emotion => format!("{}_{}", self.base_motion, emotion),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animation_name() {
        assert_eq!(AnimationIntent::new(BaseMotion::Walk).animation_name(), "walk");
        assert_eq!(
            AnimationIntent::new(BaseMotion::Wave)
                .with_emotion(Emotion::Happy)
                .animation_name(),
            "wave_happy"
        );
    }

    #[test]
    fn test_targets_whole_body_when_empty() {
        let intent = AnimationIntent::new(BaseMotion::Idle);
        assert!(intent.targets(None));
        assert!(intent.targets(Some(BodyRegion::LeftLeg)));

        let intent = intent.with_target(BodyRegion::Head);
        assert!(intent.targets(Some(BodyRegion::Head)));
        assert!(!intent.targets(Some(BodyRegion::Torso)));
        assert!(!intent.targets(None));
    }

    #[test]
    fn test_intent_json_defaults() {
        let intent: AnimationIntent = serde_json::from_str(r#"{"base_motion": "jump"}"#).unwrap();
        assert_eq!(intent, AnimationIntent::new(BaseMotion::Jump));
    }

    #[test]
    fn test_effect_specs() {
        assert_eq!(EffectTag::Fire.spec().anchor, EffectAnchor::Start);
        assert_eq!(EffectTag::Sparkle.spec().count, 10);
        assert_eq!(EffectTag::Water.spec().color, "#66CCFF");
    }
}
