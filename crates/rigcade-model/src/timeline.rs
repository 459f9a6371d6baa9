//! Keyframe timelines.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ModelError, TimelineError};
use crate::intent::EffectTag;
use crate::skeleton::BoneId;

/// Interpolation from a key to the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Linear blend.
    #[default]
    Linear,
    /// Hold until the next key.
    Stepped,
}

/// One sample of a bone's pose, relative to its bind pose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Seconds from the start.
    pub time: f64,
    /// Rotation offset in degrees.
    pub rotation: f64,
    /// Translation offset along X.
    pub x: f64,
    /// Translation offset along Y.
    pub y: f64,
    /// Interpolation toward the next key.
    #[serde(default)]
    pub curve: Interpolation,
}

impl Keyframe {
    /// A key at rest pose.
    pub fn rest(time: f64) -> Self {
        Self {
            time,
            rotation: 0.0,
            x: 0.0,
            y: 0.0,
            curve: Interpolation::Linear,
        }
    }

    /// Returns true if the key carries any translation.
    pub fn has_translation(&self) -> bool {
        self.x != 0.0 || self.y != 0.0
    }
}

/// An effect fired at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectEvent {
    /// Seconds from the start.
    pub time: f64,
    /// Effect to fire.
    pub effect: EffectTag,
}

/// Switches the image a slot shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentKey {
    /// Seconds from the start.
    pub time: f64,
    /// Layer id of the image to show from this key on.
    pub layer: String,
}

/// Per-bone keyframe tracks plus effect events for one animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    /// Animation name.
    pub name: String,
    /// Length in seconds.
    pub duration_seconds: f64,
    /// Sampling rate used to place keys.
    pub frame_rate: f64,
    /// Keyframes per bone, sorted by time.
    pub tracks: BTreeMap<BoneId, Vec<Keyframe>>,
    /// Effect events sorted by time.
    #[serde(default)]
    pub event_tracks: Vec<EffectEvent>,
    /// Image swaps per slot, keyed by the slot's default layer id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub slot_keys: BTreeMap<String, Vec<AttachmentKey>>,
}

impl Timeline {
    /// An empty timeline.
    pub fn new(name: impl Into<String>, duration_seconds: f64, frame_rate: f64) -> Self {
        Self {
            name: name.into(),
            duration_seconds,
            frame_rate,
            tracks: BTreeMap::new(),
            event_tracks: Vec::new(),
            slot_keys: BTreeMap::new(),
        }
    }

    /// Parses and validates a timeline from JSON.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let timeline: Timeline = serde_json::from_str(json)?;
        timeline.validate()?;
        Ok(timeline)
    }

    /// Serializes to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Total number of keys across all tracks.
    pub fn key_count(&self) -> usize {
        self.tracks.values().map(Vec::len).sum()
    }

    /// Keys of one bone.
    pub fn track(&self, bone: BoneId) -> Option<&[Keyframe]> {
        self.tracks.get(&bone).map(Vec::as_slice)
    }

    /// Largest absolute rotation on a bone's track.
    pub fn peak_rotation(&self, bone: BoneId) -> f64 {
        self.track(bone)
            .unwrap_or_default()
            .iter()
            .map(|k| k.rotation.abs())
            .fold(0.0, f64::max)
    }

    /// Checks time bounds, ordering, and finiteness.
    pub fn validate(&self) -> Result<(), TimelineError> {
        let valid_duration = self.duration_seconds.is_finite() && self.duration_seconds > 0.0;
        let valid_rate = self.frame_rate.is_finite() && self.frame_rate > 0.0;
        if !valid_duration || !valid_rate {
            return Err(TimelineError::InvalidDuration(self.name.clone()));
        }

        for (bone, keys) in &self.tracks {
            let mut previous: Option<f64> = None;
            for key in keys {
                if ![key.time, key.rotation, key.x, key.y]
                    .iter()
                    .all(|v| v.is_finite())
                {
                    return Err(TimelineError::NonFinite(bone.0));
                }
                if key.time < 0.0 || key.time > self.duration_seconds {
                    return Err(TimelineError::KeyOutOfRange {
                        bone: bone.0,
                        time: key.time,
                        duration: self.duration_seconds,
                    });
                }
                if previous.is_some_and(|p| key.time <= p) {
                    return Err(TimelineError::NonIncreasing {
                        bone: bone.0,
                        time: key.time,
                    });
                }
                previous = Some(key.time);
            }
        }

        let mut previous = 0.0;
        for event in &self.event_tracks {
            if event.time < previous || event.time > self.duration_seconds {
                return Err(TimelineError::EventOrder(event.time));
            }
            previous = event.time;
        }

        for (slot, keys) in &self.slot_keys {
            let mut previous: Option<f64> = None;
            for key in keys {
                let in_range = key.time >= 0.0 && key.time <= self.duration_seconds;
                if !in_range || previous.is_some_and(|p| key.time <= p) {
                    return Err(TimelineError::SlotKeyOrder {
                        slot: slot.clone(),
                        time: key.time,
                    });
                }
                previous = Some(key.time);
            }
        }
        Ok(())
    }
}
