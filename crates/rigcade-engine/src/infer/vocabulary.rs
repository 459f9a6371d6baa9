//! Body-part vocabulary and layer-name classification.

use regex::Regex;
use std::sync::OnceLock;

use rigcade_model::{Emotion, Limb, PartKind, Side};

/// Splits a layer name into lower-case words.
///
/// Separators, camelCase humps, and letter/digit boundaries all split, and
/// glued side qualifiers (`leftarm`, `armRight`) are peeled off.
const WORD_PATTERN: &str = r"[A-Z]?[a-z]+|[A-Z]+|[0-9]+";

static WORD_REGEX: OnceLock<Regex> = OnceLock::new();

fn word_regex() -> &'static Regex {
    WORD_REGEX.get_or_init(|| Regex::new(WORD_PATTERN).expect("invalid regex pattern"))
}

/// Segment qualifier that needs a limb from context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// `upper`: upper arm or thigh.
    Upper,
    /// `lower` / `fore`: forearm or shin.
    Lower,
}

impl Segment {
    /// Part this segment denotes on a limb.
    pub fn on(&self, limb: Limb) -> PartKind {
        match (self, limb) {
            (Segment::Upper, Limb::Arm) => PartKind::UpperArm,
            (Segment::Lower, Limb::Arm) => PartKind::Forearm,
            (Segment::Upper, Limb::Leg) => PartKind::Thigh,
            (Segment::Lower, Limb::Leg) => PartKind::Shin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Term {
    Part(PartKind),
    Segment(Segment),
    Side(Side),
}

const TERMS: &[(&str, Term)] = &[
    ("head", Term::Part(PartKind::Head)),
    ("face", Term::Part(PartKind::Head)),
    ("skull", Term::Part(PartKind::Head)),
    ("torso", Term::Part(PartKind::Torso)),
    ("body", Term::Part(PartKind::Torso)),
    ("chest", Term::Part(PartKind::Torso)),
    ("trunk", Term::Part(PartKind::Torso)),
    ("hips", Term::Part(PartKind::Torso)),
    ("pelvis", Term::Part(PartKind::Torso)),
    ("upperarm", Term::Part(PartKind::UpperArm)),
    ("bicep", Term::Part(PartKind::UpperArm)),
    ("forearm", Term::Part(PartKind::Forearm)),
    ("lowerarm", Term::Part(PartKind::Forearm)),
    ("arm", Term::Part(PartKind::Arm)),
    ("arms", Term::Part(PartKind::Arm)),
    ("hand", Term::Part(PartKind::Hand)),
    ("fist", Term::Part(PartKind::Hand)),
    ("palm", Term::Part(PartKind::Hand)),
    ("glove", Term::Part(PartKind::Hand)),
    ("thigh", Term::Part(PartKind::Thigh)),
    ("upperleg", Term::Part(PartKind::Thigh)),
    ("shin", Term::Part(PartKind::Shin)),
    ("calf", Term::Part(PartKind::Shin)),
    ("lowerleg", Term::Part(PartKind::Shin)),
    ("leg", Term::Part(PartKind::Leg)),
    ("legs", Term::Part(PartKind::Leg)),
    ("foot", Term::Part(PartKind::Foot)),
    ("feet", Term::Part(PartKind::Foot)),
    ("shoe", Term::Part(PartKind::Foot)),
    ("boot", Term::Part(PartKind::Foot)),
    ("hair", Term::Part(PartKind::Hair)),
    ("bangs", Term::Part(PartKind::Hair)),
    ("ponytail", Term::Part(PartKind::Hair)),
    ("braid", Term::Part(PartKind::Hair)),
    ("fringe", Term::Part(PartKind::Hair)),
    ("cape", Term::Part(PartKind::Cloth)),
    ("cloak", Term::Part(PartKind::Cloth)),
    ("skirt", Term::Part(PartKind::Cloth)),
    ("scarf", Term::Part(PartKind::Cloth)),
    ("ribbon", Term::Part(PartKind::Cloth)),
    ("tail", Term::Part(PartKind::Cloth)),
    ("upper", Term::Segment(Segment::Upper)),
    ("lower", Term::Segment(Segment::Lower)),
    ("fore", Term::Segment(Segment::Lower)),
    ("left", Term::Side(Side::Left)),
    ("l", Term::Side(Side::Left)),
    ("lft", Term::Side(Side::Left)),
    ("right", Term::Side(Side::Right)),
    ("r", Term::Side(Side::Right)),
    ("rt", Term::Side(Side::Right)),
];

fn lookup(word: &str) -> Option<Term> {
    TERMS.iter().find(|(w, _)| *w == word).map(|(_, t)| *t)
}

/// Lower-case words of a layer name, with glued side words split off.
pub fn tokenize(name: &str) -> Vec<String> {
    let mut out = Vec::new();
    for m in word_regex().find_iter(name) {
        let word = m.as_str().to_lowercase();
        out.extend(split_side_compound(&word));
    }
    out
}

fn split_side_compound(word: &str) -> Vec<String> {
    for side in ["left", "right"] {
        if word.len() > side.len() {
            if let Some(rest) = word.strip_prefix(side) {
                if lookup(rest).is_some() {
                    return vec![side.to_string(), rest.to_string()];
                }
            }
            if let Some(rest) = word.strip_suffix(side) {
                if lookup(rest).is_some() {
                    return vec![rest.to_string(), side.to_string()];
                }
            }
        }
    }
    vec![word.to_string()]
}

/// What a layer name says about itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameInfo {
    /// Recognized part, if the name alone is enough.
    pub part: Option<PartKind>,
    /// Segment qualifier waiting for a limb from an ancestor.
    pub segment: Option<Segment>,
    /// Side stated in the name.
    pub side: Option<Side>,
    /// The word that named the part (e.g. `cape`).
    pub term: Option<String>,
}

impl NameInfo {
    /// Returns true if the name carries no vocabulary at all.
    pub fn is_empty(&self) -> bool {
        self.part.is_none() && self.segment.is_none() && self.side.is_none()
    }
}

/// Classifies a layer name against the vocabulary.
///
/// The most specific part word wins: a segment (`forearm`) beats a whole
/// limb (`arm`), and `upper`/`lower` in front of a limb word combine with it.
/// When both sides appear, the first one counts.
pub fn classify_name(name: &str) -> NameInfo {
    let mut info = NameInfo::default();
    let mut parts: Vec<(PartKind, &str)> = Vec::new();
    let words = tokenize(name);

    for word in &words {
        match lookup(word) {
            Some(Term::Part(part)) => parts.push((part, word.as_str())),
            Some(Term::Segment(segment)) => {
                info.segment.get_or_insert(segment);
            }
            Some(Term::Side(side)) => {
                info.side.get_or_insert(side);
            }
            None => {}
        }
    }

    let mut best: Option<(PartKind, &str)> = None;
    for (part, word) in parts {
        if best.map_or(true, |(b, _)| part_rank(part) > part_rank(b)) {
            best = Some((part, word));
        }
    }
    if let Some((part, word)) = best {
        let combined = match (info.segment, part) {
            (Some(segment), PartKind::Arm) => Some(segment.on(Limb::Arm)),
            (Some(segment), PartKind::Leg) => Some(segment.on(Limb::Leg)),
            _ => None,
        };
        if combined.is_some() {
            info.segment = None;
        }
        info.part = Some(combined.unwrap_or(part));
        info.term = Some(word.to_string());
    }
    info
}

/// Returns true if the layer name contains the word `face`.
pub fn names_face(name: &str) -> bool {
    tokenize(name).iter().any(|w| w == "face")
}

/// The emotion a face layer shows, for names like `face_happy` or
/// `Sad Face`. Plain `face` layers and non-face layers give `None`.
pub fn expression_of(name: &str) -> Option<Emotion> {
    let words = tokenize(name);
    if !words.iter().any(|w| w == "face") {
        return None;
    }
    words
        .iter()
        .find_map(|w| Emotion::ALL.into_iter().find(|e| e.as_str() == w))
}

/// Specificity of a part word; higher means more specific.
pub fn part_rank(part: PartKind) -> u8 {
    match part {
        PartKind::Hair | PartKind::Cloth => 1,
        PartKind::Arm | PartKind::Leg => 1,
        PartKind::Head | PartKind::Torso => 2,
        PartKind::UpperArm
        | PartKind::Forearm
        | PartKind::Thigh
        | PartKind::Shin
        | PartKind::Hand
        | PartKind::Foot => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tokenize_separators_and_camel_case() {
        assert_eq!(tokenize("Left_Upper-Arm"), vec!["left", "upper", "arm"]);
        assert_eq!(tokenize("armRight"), vec!["arm", "right"]);
        assert_eq!(tokenize("ARM_L"), vec!["arm", "l"]);
        assert_eq!(tokenize("leg 2"), vec!["leg", "2"]);
    }

    #[test]
    fn test_tokenize_glued_sides() {
        assert_eq!(tokenize("leftarm"), vec!["left", "arm"]);
        assert_eq!(tokenize("handright"), vec!["hand", "right"]);
        // Not a vocabulary word once split; stays whole.
        assert_eq!(tokenize("leftover"), vec!["leftover"]);
    }

    #[test]
    fn test_classify_combines_segment_and_limb() {
        let info = classify_name("Upper Arm L");
        assert_eq!(info.part, Some(PartKind::UpperArm));
        assert_eq!(info.side, Some(Side::Left));
        assert_eq!(info.segment, None);

        let info = classify_name("lower leg");
        assert_eq!(info.part, Some(PartKind::Shin));
    }

    #[test]
    fn test_classify_prefers_specific_part() {
        assert_eq!(classify_name("arm hand").part, Some(PartKind::Hand));
        assert_eq!(classify_name("Forearm").part, Some(PartKind::Forearm));
    }

    #[test]
    fn test_classify_bare_segment() {
        let info = classify_name("upper");
        assert_eq!(info.part, None);
        assert_eq!(info.segment, Some(Segment::Upper));
        assert!(!info.is_empty());
    }

    #[test]
    fn test_expression_names() {
        assert_eq!(expression_of("face_happy"), Some(Emotion::Happy));
        assert_eq!(expression_of("Sad Face"), Some(Emotion::Sad));
        assert_eq!(expression_of("faceAngry"), Some(Emotion::Angry));
        assert_eq!(expression_of("face"), None);
        assert_eq!(expression_of("happy hat"), None);
        assert!(names_face("Face L"));
        assert!(!names_face("facade"));
    }

    #[test]
    fn test_classify_follower_term() {
        let info = classify_name("Red Cape");
        assert_eq!(info.part, Some(PartKind::Cloth));
        assert_eq!(info.term.as_deref(), Some("cape"));
        assert!(classify_name("eye").is_empty());
    }
}
