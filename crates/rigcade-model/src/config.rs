//! Engine configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ModelError;

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct EngineConfig {
    /// Skeleton inference settings.
    pub inference: InferenceConfig,
    /// Intent parsing settings.
    pub intent: IntentConfig,
    /// Keyframe synthesis settings.
    pub synthesis: SynthesisConfig,
    /// Project export settings.
    pub export: ExportConfig,
}

impl EngineConfig {
    /// Parses and validates a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a config file.
    pub fn from_json_file(path: &Path) -> Result<Self, ModelError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ModelError> {
        let i = &self.intent;
        if !(i.intensity_min > 0.0 && i.intensity_min <= 1.0 && i.intensity_max >= 1.0) {
            return Err(ModelError::Config(format!(
                "intensity bounds [{}, {}] must be positive and contain 1.0",
                i.intensity_min, i.intensity_max
            )));
        }
        if !(i.speed_min > 0.0 && i.speed_min <= 1.0 && i.speed_max >= 1.0) {
            return Err(ModelError::Config(format!(
                "speed bounds [{}, {}] must be positive and contain 1.0",
                i.speed_min, i.speed_max
            )));
        }
        let s = &self.synthesis;
        if !(s.frame_rate > 0.0 && s.frame_rate.is_finite()) {
            return Err(ModelError::Config("frame_rate must be positive".into()));
        }
        if s.key_interval_frames == 0 {
            return Err(ModelError::Config(
                "key_interval_frames must be at least 1".into(),
            ));
        }
        if !(s.follower_stiffness > 0.0) || s.follower_lag_seconds < 0.0 {
            return Err(ModelError::Config(
                "follower_stiffness must be positive and follower_lag_seconds non-negative".into(),
            ));
        }
        if self.inference.max_ambiguous_matches == 0 {
            return Err(ModelError::Config(
                "max_ambiguous_matches must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Skeleton inference settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct InferenceConfig {
    /// More equally-specific candidates than this for one body slot fails
    /// inference.
    pub max_ambiguous_matches: usize,
    /// Split a lone whole-arm or whole-leg layer into two chain links.
    pub split_single_limb: bool,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            max_ambiguous_matches: 4,
            split_single_limb: true,
        }
    }
}

/// Intent parsing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct IntentConfig {
    /// Lower intensity bound.
    pub intensity_min: f64,
    /// Upper intensity bound.
    pub intensity_max: f64,
    /// Lower speed bound.
    pub speed_min: f64,
    /// Upper speed bound.
    pub speed_max: f64,
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            intensity_min: 0.25,
            intensity_max: 2.0,
            speed_min: 0.25,
            speed_max: 3.0,
        }
    }
}

/// Keyframe synthesis settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SynthesisConfig {
    /// Frames per second.
    pub frame_rate: f64,
    /// Frames between consecutive keys.
    pub key_interval_frames: u32,
    /// Spring stiffness for follower bones, in rad/s.
    pub follower_stiffness: f64,
    /// Follower response relative to the anchor's rotation.
    pub follower_gain: f64,
    /// Follower delay in seconds.
    pub follower_lag_seconds: f64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            frame_rate: 30.0,
            key_interval_frames: 3,
            follower_stiffness: 14.0,
            follower_gain: 1.2,
            follower_lag_seconds: 0.08,
        }
    }
}

impl SynthesisConfig {
    /// Seconds between consecutive keys.
    pub fn key_interval_seconds(&self) -> f64 {
        self.key_interval_frames as f64 / self.frame_rate
    }

    /// Seconds per frame.
    pub fn frame_seconds(&self) -> f64 {
        1.0 / self.frame_rate
    }
}

/// Project export settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ExportConfig {
    /// Schema version written to the document header.
    pub spine_version: String,
    /// Image directory written to the document header.
    pub images_dir: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            spine_version: "4.1.00".to_string(),
            images_dir: "./images/".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(EngineConfig::from_json("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_partial_section() {
        let config =
            EngineConfig::from_json(r#"{"synthesis": {"frame_rate": 24}}"#).unwrap();
        assert_eq!(config.synthesis.frame_rate, 24.0);
        assert_eq!(config.synthesis.key_interval_frames, 3);
        assert_eq!(config.export.spine_version, "4.1.00");
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(EngineConfig::from_json(r#"{"synthesis": {"fps": 24}}"#).is_err());
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let err = EngineConfig::from_json(r#"{"intent": {"intensity_max": 0.5}}"#).unwrap_err();
        assert!(matches!(err, ModelError::Config(_)));
    }

    #[test]
    fn test_key_interval_seconds() {
        let s = SynthesisConfig::default();
        assert!((s.key_interval_seconds() - 0.1).abs() < 1e-12);
    }
}
