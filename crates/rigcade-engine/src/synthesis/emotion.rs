//! Emotion modulation.

use std::f64::consts::PI;

use rigcade_model::Emotion;

/// Highest tremor frequency as a fraction of the key sample rate.
const NYQUIST_MARGIN: f64 = 0.4;

/// Keeps the first key off a zero crossing.
const JITTER_PHASE: f64 = 0.3;

/// How an emotion reshapes a motion.
///
/// Tempo divides the cycle length, energy scales every curve, and the biases
/// add constant rotation offsets (degrees) to the head, arms, and torso.
/// Arm bias is mirrored so positive means "raised outward" on both sides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmotionProfile {
    /// Playback rate multiplier.
    pub tempo: f64,
    /// Amplitude multiplier.
    pub energy: f64,
    /// Head rotation offset.
    pub head_bias: f64,
    /// Upper-arm rotation offset.
    pub arm_bias: f64,
    /// Torso rotation offset.
    pub torso_bias: f64,
    /// Tremor amplitude in degrees.
    pub jitter_amplitude: f64,
    /// Tremor frequency in Hz.
    pub jitter_hz: f64,
}

impl EmotionProfile {
    /// The profile for an emotion.
    pub fn for_emotion(emotion: Emotion) -> Self {
        let neutral = Self {
            tempo: 1.0,
            energy: 1.0,
            head_bias: 0.0,
            arm_bias: 0.0,
            torso_bias: 0.0,
            jitter_amplitude: 0.0,
            jitter_hz: 0.0,
        };
        match emotion {
            Emotion::Neutral => neutral,
            Emotion::Happy => Self {
                tempo: 1.15,
                energy: 1.2,
                head_bias: 5.0,
                arm_bias: 6.0,
                ..neutral
            },
            Emotion::Sad => Self {
                tempo: 0.75,
                energy: 0.6,
                head_bias: -12.0,
                arm_bias: -5.0,
                torso_bias: -4.0,
                ..neutral
            },
            Emotion::Angry => Self {
                tempo: 1.2,
                energy: 1.4,
                head_bias: -4.0,
                torso_bias: 2.0,
                ..neutral
            },
            Emotion::Excited => Self {
                tempo: 1.35,
                energy: 1.6,
                head_bias: 6.0,
                arm_bias: 10.0,
                ..neutral
            },
            Emotion::Scared => Self {
                tempo: 1.25,
                energy: 0.8,
                head_bias: -6.0,
                arm_bias: -4.0,
                torso_bias: -3.0,
                jitter_amplitude: 2.5,
                jitter_hz: 12.0,
            },
        }
    }

    /// True if the emotion adds tremor.
    pub fn jitters(&self) -> bool {
        self.jitter_amplitude > 0.0 && self.jitter_hz > 0.0
    }

    /// Tremor frequency when sampled at `sample_rate` Hz, held below the
    /// Nyquist limit so the tremor never aliases into a slow drift.
    pub fn jitter_hz_at(&self, sample_rate: f64) -> f64 {
        self.jitter_hz.min(NYQUIST_MARGIN * sample_rate)
    }

    /// Tremor offset at `seconds` for keys sampled at `sample_rate` Hz,
    /// deterministic in time.
    pub fn jitter(&self, seconds: f64, sample_rate: f64) -> f64 {
        if !self.jitters() {
            return 0.0;
        }
        let w = 2.0 * PI * self.jitter_hz_at(sample_rate) * seconds;
        self.jitter_amplitude * (w + JITTER_PHASE).sin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_is_identity() {
        let p = EmotionProfile::for_emotion(Emotion::Neutral);
        assert_eq!((p.tempo, p.energy), (1.0, 1.0));
        assert_eq!(p.jitter(0.37, 30.0), 0.0);
        assert!(!p.jitters());
    }

    #[test]
    fn test_sad_is_slower_and_droops() {
        let sad = EmotionProfile::for_emotion(Emotion::Sad);
        assert!(sad.tempo < 1.0);
        assert!(sad.energy < 1.0);
        assert!(sad.head_bias < 0.0);
    }

    #[test]
    fn test_happy_lifts() {
        let happy = EmotionProfile::for_emotion(Emotion::Happy);
        assert!(happy.tempo > 1.0);
        assert!(happy.head_bias > 0.0 && happy.arm_bias > 0.0);
    }

    #[test]
    fn test_scared_jitter_is_bounded() {
        let scared = EmotionProfile::for_emotion(Emotion::Scared);
        let peak = (0..200)
            .map(|i| scared.jitter(i as f64 / 100.0, 100.0).abs())
            .fold(0.0, f64::max);
        assert!(peak > 0.5);
        assert!(peak <= scared.jitter_amplitude + 1e-9);
    }

    #[test]
    fn test_jitter_stays_below_nyquist() {
        let scared = EmotionProfile::for_emotion(Emotion::Scared);
        assert_eq!(scared.jitter_hz_at(30.0), scared.jitter_hz);
        assert!(scared.jitter_hz_at(10.0) < 5.0);
    }

    #[test]
    fn test_jitter_alternates_between_frames() {
        let scared = EmotionProfile::for_emotion(Emotion::Scared);
        for rate in [10.0, 30.0] {
            let samples: Vec<f64> = (0..60)
                .map(|i| scared.jitter(i as f64 / rate, rate))
                .collect();
            let flips = samples.windows(2).filter(|w| w[0] * w[1] < 0.0).count();
            assert!(flips >= 40, "{} flips at {} Hz", flips, rate);
        }
    }
}
