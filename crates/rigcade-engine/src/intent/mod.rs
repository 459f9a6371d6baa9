//! Free-text animation request parsing.
//!
//! Requests like `"very happy wave with sparkles"` are lower-cased, split
//! into words, and matched phrase by phrase against a fixed vocabulary.
//! Only the base motion is mandatory; everything else defaults. Body parts
//! count only after `with` or `using`, so "wave your hand" animates the
//! whole body while "wave with your hand" targets the arms.

mod vocabulary;

use log::{debug, warn};
use regex::Regex;
use std::sync::OnceLock;

use rigcade_model::{AnimationIntent, EngineWarning, IntentConfig, Outcome, WarningCode};

use crate::error::IntentError;

pub use vocabulary::{longest_match, Term, PHRASES};

const WORD_PATTERN: &str = r"[a-z]+";

static WORD_REGEX: OnceLock<Regex> = OnceLock::new();

fn word_regex() -> &'static Regex {
    WORD_REGEX.get_or_init(|| Regex::new(WORD_PATTERN).expect("invalid regex pattern"))
}

/// Parses a free-text request into an [`AnimationIntent`].
///
/// The first motion word wins; later ones are reported and ignored.
/// Intensity and speed words multiply together and the products are clamped
/// to the configured bounds. Unknown words never fail the parse; they come
/// back as `IgnoredToken` warnings.
pub fn parse(text: &str, config: &IntentConfig) -> Result<Outcome<AnimationIntent>, IntentError> {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = word_regex()
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .collect();

    let mut warnings = Vec::new();
    let mut motion = None;
    let mut emotion = None;
    let mut intensity = 1.0;
    let mut speed = 1.0;
    let mut targets = Vec::new();
    let mut effects = Vec::new();
    // Set by `with`/`using`, cleared by the next motion word.
    let mut qualified = false;

    let mut i = 0;
    while i < tokens.len() {
        let Some((len, term)) = longest_match(&tokens[i..]) else {
            warnings.push(EngineWarning::new(
                WarningCode::IgnoredToken,
                format!("ignored unknown word '{}'", tokens[i]),
            ));
            i += 1;
            continue;
        };
        let phrase = tokens[i..i + len].join(" ");
        match term {
            Term::Motion(m) => {
                qualified = false;
                match motion {
                    None => motion = Some(m),
                    Some(first) if first != m => warnings.push(EngineWarning::new(
                        WarningCode::IgnoredToken,
                        format!("ignored second motion '{}'; animating '{}'", phrase, first),
                    )),
                    Some(_) => {}
                }
            }
            Term::Emotion(e) => {
                emotion.get_or_insert(e);
            }
            Term::Intensity(factor) => intensity *= factor,
            Term::Speed(factor) => speed *= factor,
            Term::Effect(effect) => effects.push(effect),
            Term::Region(regions) if qualified => targets.extend_from_slice(regions),
            Term::Region(_) => warnings.push(EngineWarning::new(
                WarningCode::IgnoredToken,
                format!("ignored body part '{}' without 'with' or 'using'", phrase),
            )),
            Term::Qualifier => qualified = true,
            Term::Filler => {}
        }
        i += len;
    }

    let Some(base_motion) = motion else {
        return Err(IntentError::UnrecognizedMotion(text.trim().to_string()));
    };

    let intensity = clamp_reported(
        "intensity",
        intensity,
        config.intensity_min,
        config.intensity_max,
        &mut warnings,
    );
    let speed = clamp_reported("speed", speed, config.speed_min, config.speed_max, &mut warnings);

    let mut intent = AnimationIntent::new(base_motion)
        .with_emotion(emotion.unwrap_or_default())
        .with_intensity(intensity)
        .with_speed(speed);
    intent.target_parts.extend(targets);
    intent.effects.extend(effects);

    for warning in &warnings {
        warn!("{}", warning);
    }
    debug!(
        "parsed '{}' as {} (emotion {}, intensity {:.2}, speed {:.2})",
        text, intent.base_motion, intent.emotion, intent.intensity, intent.speed_factor
    );
    Ok(Outcome::with_warnings(intent, warnings))
}

fn clamp_reported(
    what: &str,
    value: f64,
    min: f64,
    max: f64,
    warnings: &mut Vec<EngineWarning>,
) -> f64 {
    let clamped = value.clamp(min, max);
    if clamped != value {
        warnings.push(EngineWarning::new(
            WarningCode::ValueClamped,
            format!("{} {:.2} clamped to {:.2}", what, value, clamped),
        ));
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rigcade_model::{BaseMotion, BodyRegion, EffectTag, Emotion};

    fn parse_ok(text: &str) -> Outcome<AnimationIntent> {
        parse(text, &IntentConfig::default()).unwrap()
    }

    #[test]
    fn test_very_happy_wave() {
        let intent = parse_ok("very happy wave").value;
        assert_eq!(intent.base_motion, BaseMotion::Wave);
        assert_eq!(intent.emotion, Emotion::Happy);
        assert!((intent.intensity - 1.5).abs() < 1e-9);
        assert_eq!(intent.speed_factor, 1.0);
    }

    #[test]
    fn test_slow_sad_walk() {
        let intent = parse_ok("slow sad walk").value;
        assert_eq!(intent.base_motion, BaseMotion::Walk);
        assert_eq!(intent.emotion, Emotion::Sad);
        assert!(intent.speed_factor < 1.0);
        assert_eq!(intent.intensity, 1.0);
    }

    #[test]
    fn test_defaults_when_only_motion() {
        let outcome = parse_ok("Jump!");
        assert_eq!(outcome.value, AnimationIntent::new(BaseMotion::Jump));
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_no_motion_fails() {
        let err = parse("very happy with sparkles", &IntentConfig::default()).unwrap_err();
        assert_eq!(
            err,
            IntentError::UnrecognizedMotion("very happy with sparkles".into())
        );
        assert!(parse("", &IntentConfig::default()).is_err());
    }

    #[test]
    fn test_intensity_stacks_and_clamps() {
        let outcome = parse_ok("extremely very excited dance");
        assert_eq!(outcome.value.intensity, 2.0);
        assert!(outcome.has_warning(WarningCode::ValueClamped));

        let outcome = parse_ok("slightly somewhat nod");
        assert!((outcome.value.intensity - 0.48).abs() < 1e-9);
        assert!(!outcome.has_warning(WarningCode::ValueClamped));
    }

    #[test]
    fn test_timing_independent_of_intensity() {
        let intent = parse_ok("a little quick run").value;
        assert!((intent.intensity - 0.6).abs() < 1e-9);
        assert!((intent.speed_factor - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_targets_and_effects() {
        let intent = parse_ok("wave using left arm with sparkles and hearts").value;
        assert_eq!(
            intent.target_parts.iter().copied().collect::<Vec<_>>(),
            vec![BodyRegion::LeftArm]
        );
        assert_eq!(
            intent.effects.iter().copied().collect::<Vec<_>>(),
            vec![EffectTag::Sparkle, EffectTag::Hearts]
        );

        let intent = parse_ok("nod with head tilt").value;
        assert_eq!(
            intent.target_parts.iter().copied().collect::<Vec<_>>(),
            vec![BodyRegion::Head]
        );
    }

    #[test]
    fn test_body_parts_need_a_qualifier() {
        let outcome = parse_ok("wave the hand");
        assert!(outcome.value.target_parts.is_empty());
        assert_eq!(
            outcome.warnings[0].message,
            "ignored body part 'hand' without 'with' or 'using'"
        );

        let intent = parse_ok("wave with the left hand and right arm").value;
        assert_eq!(
            intent.target_parts.iter().copied().collect::<Vec<_>>(),
            vec![BodyRegion::LeftArm, BodyRegion::RightArm]
        );

        // A motion word closes the qualified phrase.
        let outcome = parse_ok("with sparkles nod head");
        assert!(outcome.value.target_parts.is_empty());
        assert!(outcome.has_warning(WarningCode::IgnoredToken));
    }

    #[test]
    fn test_compound_words_do_not_match_motions() {
        let outcome = parse_ok("standard walk");
        assert_eq!(outcome.value.base_motion, BaseMotion::Walk);
        assert_eq!(
            outcome.warnings[0].message,
            "ignored unknown word 'standard'"
        );

        let outcome = parse_ok("a character in a jumpsuit walks");
        assert_eq!(outcome.value.base_motion, BaseMotion::Walk);
        assert_eq!(outcome.warnings.len(), 1);

        let intent = parse_ok("lovely wave").value;
        assert!(intent.effects.is_empty());
    }

    #[test]
    fn test_first_motion_wins() {
        let outcome = parse_ok("walk then run");
        assert_eq!(outcome.value.base_motion, BaseMotion::Walk);
        let codes: Vec<WarningCode> = outcome.warnings.iter().map(|w| w.code).collect();
        assert_eq!(codes, vec![WarningCode::IgnoredToken, WarningCode::IgnoredToken]);
    }

    #[test]
    fn test_unknown_words_are_warnings() {
        let outcome = parse_ok("happy wave at the camera");
        assert_eq!(outcome.value.base_motion, BaseMotion::Wave);
        let ignored: Vec<&str> = outcome
            .warnings
            .iter()
            .map(|w| w.message.as_str())
            .collect();
        assert_eq!(
            ignored,
            vec!["ignored unknown word 'at'", "ignored unknown word 'camera'"]
        );
    }

    #[test]
    fn test_case_insensitive_and_inflections() {
        let intent = parse_ok("HAPPILY Dancing").value;
        assert_eq!(intent.base_motion, BaseMotion::Dance);
        assert_eq!(intent.emotion, Emotion::Happy);

        let intent = parse_ok("she jumps").value;
        assert_eq!(intent.base_motion, BaseMotion::Jump);
    }

    #[test]
    fn test_parse_is_pure() {
        let a = parse_ok("scared fast walk with dust").value;
        let b = parse_ok("scared fast walk with dust").value;
        assert_eq!(a, b);
    }
}
