//! Word lists for the intent parser.

use rigcade_model::{BaseMotion, BodyRegion, EffectTag, Emotion};

/// What a vocabulary phrase means.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Term {
    /// A base motion.
    Motion(BaseMotion),
    /// An emotion.
    Emotion(Emotion),
    /// Multiplies intensity.
    Intensity(f64),
    /// Multiplies speed.
    Speed(f64),
    /// Requests an effect.
    Effect(EffectTag),
    /// Restricts animation to body regions.
    Region(&'static [BodyRegion]),
    /// Introduces the body parts or effects a motion uses.
    Qualifier,
    /// Carries no meaning but is expected in requests.
    Filler,
}

impl Term {
    /// Suffixes a one-word phrase of this kind may take.
    fn inflections(&self) -> &'static [&'static str] {
        match self {
            Term::Motion(_) | Term::Effect(_) => &["s", "es", "ed", "ing"],
            Term::Emotion(_) => &["ly"],
            Term::Speed(_) => &["er", "est", "ly"],
            Term::Region(_) => &["s"],
            Term::Intensity(_) | Term::Qualifier | Term::Filler => &[],
        }
    }
}

const BOTH_ARMS: &[BodyRegion] = &[BodyRegion::LeftArm, BodyRegion::RightArm];
const BOTH_LEGS: &[BodyRegion] = &[BodyRegion::LeftLeg, BodyRegion::RightLeg];

/// Phrases, each one or more space-separated words.
pub const PHRASES: &[(&str, Term)] = &[
    // Motions
    ("idle", Term::Motion(BaseMotion::Idle)),
    ("stand", Term::Motion(BaseMotion::Idle)),
    ("standing", Term::Motion(BaseMotion::Idle)),
    ("breathe", Term::Motion(BaseMotion::Idle)),
    ("breathing", Term::Motion(BaseMotion::Idle)),
    ("walk", Term::Motion(BaseMotion::Walk)),
    ("walking", Term::Motion(BaseMotion::Walk)),
    ("stroll", Term::Motion(BaseMotion::Walk)),
    ("run", Term::Motion(BaseMotion::Run)),
    ("running", Term::Motion(BaseMotion::Run)),
    ("runs", Term::Motion(BaseMotion::Run)),
    ("sprint", Term::Motion(BaseMotion::Run)),
    ("jog", Term::Motion(BaseMotion::Run)),
    ("jogging", Term::Motion(BaseMotion::Run)),
    ("jump", Term::Motion(BaseMotion::Jump)),
    ("hop", Term::Motion(BaseMotion::Jump)),
    ("hopping", Term::Motion(BaseMotion::Jump)),
    ("leap", Term::Motion(BaseMotion::Jump)),
    ("wave", Term::Motion(BaseMotion::Wave)),
    ("waving", Term::Motion(BaseMotion::Wave)),
    ("waves", Term::Motion(BaseMotion::Wave)),
    ("greet", Term::Motion(BaseMotion::Wave)),
    ("nod", Term::Motion(BaseMotion::Nod)),
    ("nods", Term::Motion(BaseMotion::Nod)),
    ("nodding", Term::Motion(BaseMotion::Nod)),
    ("dance", Term::Motion(BaseMotion::Dance)),
    ("dancing", Term::Motion(BaseMotion::Dance)),
    ("groove", Term::Motion(BaseMotion::Dance)),
    // Emotions
    ("neutral", Term::Emotion(Emotion::Neutral)),
    ("calm", Term::Emotion(Emotion::Neutral)),
    ("calmly", Term::Emotion(Emotion::Neutral)),
    ("happy", Term::Emotion(Emotion::Happy)),
    ("happily", Term::Emotion(Emotion::Happy)),
    ("joyful", Term::Emotion(Emotion::Happy)),
    ("cheerful", Term::Emotion(Emotion::Happy)),
    ("cheerfully", Term::Emotion(Emotion::Happy)),
    ("glad", Term::Emotion(Emotion::Happy)),
    ("sad", Term::Emotion(Emotion::Sad)),
    ("sadly", Term::Emotion(Emotion::Sad)),
    ("unhappy", Term::Emotion(Emotion::Sad)),
    ("gloomy", Term::Emotion(Emotion::Sad)),
    ("depressed", Term::Emotion(Emotion::Sad)),
    ("angry", Term::Emotion(Emotion::Angry)),
    ("angrily", Term::Emotion(Emotion::Angry)),
    ("mad", Term::Emotion(Emotion::Angry)),
    ("furious", Term::Emotion(Emotion::Angry)),
    ("excited", Term::Emotion(Emotion::Excited)),
    ("excitedly", Term::Emotion(Emotion::Excited)),
    ("energetic", Term::Emotion(Emotion::Excited)),
    ("enthusiastic", Term::Emotion(Emotion::Excited)),
    ("scared", Term::Emotion(Emotion::Scared)),
    ("afraid", Term::Emotion(Emotion::Scared)),
    ("nervous", Term::Emotion(Emotion::Scared)),
    ("nervously", Term::Emotion(Emotion::Scared)),
    ("frightened", Term::Emotion(Emotion::Scared)),
    // Intensity
    ("very", Term::Intensity(1.5)),
    ("really", Term::Intensity(1.5)),
    ("super", Term::Intensity(1.8)),
    ("extremely", Term::Intensity(2.0)),
    ("incredibly", Term::Intensity(2.0)),
    ("somewhat", Term::Intensity(0.8)),
    ("slightly", Term::Intensity(0.6)),
    ("a little", Term::Intensity(0.6)),
    ("little", Term::Intensity(0.6)),
    ("barely", Term::Intensity(0.5)),
    // Timing
    ("slow", Term::Speed(0.6)),
    ("slowly", Term::Speed(0.6)),
    ("leisurely", Term::Speed(0.7)),
    ("fast", Term::Speed(1.5)),
    ("quick", Term::Speed(1.5)),
    ("quickly", Term::Speed(1.5)),
    ("rapid", Term::Speed(1.8)),
    ("rapidly", Term::Speed(1.8)),
    // Effects
    ("sparkle", Term::Effect(EffectTag::Sparkle)),
    ("sparkles", Term::Effect(EffectTag::Sparkle)),
    ("sparkling", Term::Effect(EffectTag::Sparkle)),
    ("glitter", Term::Effect(EffectTag::Sparkle)),
    ("magic", Term::Effect(EffectTag::Sparkle)),
    ("magical", Term::Effect(EffectTag::Sparkle)),
    ("fire", Term::Effect(EffectTag::Fire)),
    ("flame", Term::Effect(EffectTag::Fire)),
    ("flames", Term::Effect(EffectTag::Fire)),
    ("fiery", Term::Effect(EffectTag::Fire)),
    ("dust", Term::Effect(EffectTag::Dust)),
    ("dusty", Term::Effect(EffectTag::Dust)),
    ("water", Term::Effect(EffectTag::Water)),
    ("splash", Term::Effect(EffectTag::Water)),
    ("splashing", Term::Effect(EffectTag::Water)),
    ("heart", Term::Effect(EffectTag::Hearts)),
    ("hearts", Term::Effect(EffectTag::Hearts)),
    ("love", Term::Effect(EffectTag::Hearts)),
    // Body regions
    ("head", Term::Region(&[BodyRegion::Head])),
    ("head tilt", Term::Region(&[BodyRegion::Head])),
    ("torso", Term::Region(&[BodyRegion::Torso])),
    ("body", Term::Region(&[BodyRegion::Torso])),
    ("hips", Term::Region(&[BodyRegion::Torso])),
    ("left arm", Term::Region(&[BodyRegion::LeftArm])),
    ("left hand", Term::Region(&[BodyRegion::LeftArm])),
    ("right arm", Term::Region(&[BodyRegion::RightArm])),
    ("right hand", Term::Region(&[BodyRegion::RightArm])),
    ("left leg", Term::Region(&[BodyRegion::LeftLeg])),
    ("left foot", Term::Region(&[BodyRegion::LeftLeg])),
    ("right leg", Term::Region(&[BodyRegion::RightLeg])),
    ("right foot", Term::Region(&[BodyRegion::RightLeg])),
    ("arm", Term::Region(BOTH_ARMS)),
    ("arms", Term::Region(BOTH_ARMS)),
    ("hand", Term::Region(BOTH_ARMS)),
    ("hands", Term::Region(BOTH_ARMS)),
    ("both arms", Term::Region(BOTH_ARMS)),
    ("leg", Term::Region(BOTH_LEGS)),
    ("legs", Term::Region(BOTH_LEGS)),
    ("feet", Term::Region(BOTH_LEGS)),
    ("both legs", Term::Region(BOTH_LEGS)),
    // Filler
    ("a", Term::Filler),
    ("an", Term::Filler),
    ("the", Term::Filler),
    ("with", Term::Qualifier),
    ("and", Term::Filler),
    ("using", Term::Qualifier),
    ("while", Term::Filler),
    ("in", Term::Filler),
    ("on", Term::Filler),
    ("of", Term::Filler),
    ("to", Term::Filler),
    ("his", Term::Filler),
    ("her", Term::Filler),
    ("their", Term::Filler),
    ("its", Term::Filler),
    ("my", Term::Filler),
    ("character", Term::Filler),
    ("bit", Term::Filler),
    ("some", Term::Filler),
    ("effect", Term::Filler),
    ("effects", Term::Filler),
    ("animation", Term::Filler),
];

/// Minimum stem length for inflected matches (`hops` -> `hop`).
const MIN_STEM: usize = 3;

/// Finds the longest phrase starting at `tokens[0]`.
///
/// Exact phrases are tried longest first. Failing that, a one-word entry
/// of at least three letters matches when the token is that entry plus one
/// of the suffixes its kind allows, so `walked`, `dancing`, `hopped`, and
/// `faster` resolve while `standard` or `jumpsuit` do not.
pub fn longest_match(tokens: &[&str]) -> Option<(usize, Term)> {
    let mut best: Option<(usize, Term)> = None;
    for (phrase, term) in PHRASES {
        let words: Vec<&str> = phrase.split(' ').collect();
        if words.len() > tokens.len() || words[..] != tokens[..words.len()] {
            continue;
        }
        if best.map_or(true, |(len, _)| words.len() > len) {
            best = Some((words.len(), *term));
        }
    }
    if best.is_some() {
        return best;
    }

    let first = tokens.first()?;
    let mut stem: Option<(usize, Term)> = None;
    for (phrase, term) in PHRASES {
        if phrase.contains(' ') || phrase.len() < MIN_STEM {
            continue;
        }
        if !term.inflections().iter().any(|suffix| inflects(first, phrase, suffix)) {
            continue;
        }
        if stem.map_or(true, |(len, _)| phrase.len() > len) {
            stem = Some((phrase.len(), *term));
        }
    }
    stem.map(|(_, term)| (1, term))
}

/// True if `word` is `stem` plus `suffix`, allowing the stem's final `e`
/// to drop (`dancing`, `danced`) and a final consonant to double
/// (`hopped`, `running`) before a vowel.
fn inflects(word: &str, stem: &str, suffix: &str) -> bool {
    let vowel_suffix = suffix.starts_with(is_vowel);
    match word.strip_prefix(stem) {
        Some(rest) if rest == suffix => true,
        Some(rest) => {
            if stem.ends_with('e') && suffix.starts_with('e') {
                return rest == &suffix[1..];
            }
            let last = stem.chars().last();
            vowel_suffix
                && last.map_or(false, |c| !is_vowel(c))
                && rest.chars().next() == last
                && &rest[1..] == suffix
        }
        None => {
            vowel_suffix
                && stem
                    .strip_suffix('e')
                    .and_then(|base| word.strip_prefix(base))
                    .map_or(false, |rest| rest == suffix)
        }
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrases_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for (phrase, _) in PHRASES {
            assert!(seen.insert(*phrase), "duplicate phrase '{}'", phrase);
        }
    }

    #[test]
    fn test_longest_phrase_wins() {
        assert_eq!(
            longest_match(&["left", "arm", "up"]),
            Some((2, Term::Region(&[BodyRegion::LeftArm])))
        );
        assert_eq!(
            longest_match(&["a", "little"]),
            Some((2, Term::Intensity(0.6)))
        );
        assert_eq!(longest_match(&["a", "walk"]), Some((1, Term::Filler)));
    }

    #[test]
    fn test_stem_match() {
        assert_eq!(
            longest_match(&["jumps"]),
            Some((1, Term::Motion(BaseMotion::Jump)))
        );
        assert_eq!(
            longest_match(&["dances"]),
            Some((1, Term::Motion(BaseMotion::Dance)))
        );
        assert_eq!(
            longest_match(&["hopped"]),
            Some((1, Term::Motion(BaseMotion::Jump)))
        );
        assert_eq!(
            longest_match(&["danced"]),
            Some((1, Term::Motion(BaseMotion::Dance)))
        );
        assert_eq!(longest_match(&["faster"]), Some((1, Term::Speed(1.5))));
        assert_eq!(
            longest_match(&["gladly"]),
            Some((1, Term::Emotion(Emotion::Happy)))
        );
        assert_eq!(longest_match(&["randomly"]), None);
    }

    #[test]
    fn test_compounds_are_not_inflections() {
        for word in ["standard", "jumpsuit", "lovely", "handsome", "walkway", "headline"] {
            assert_eq!(longest_match(&[word]), None, "'{}' matched", word);
        }
        // Suffixes belong to a kind: effects take no adverb form.
        assert_eq!(longest_match(&["dustly"]), None);
    }
}
