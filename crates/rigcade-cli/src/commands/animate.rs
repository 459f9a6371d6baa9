//! Animate command implementation
//!
//! Parses each text and synthesizes one timeline per text against a rigged
//! skeleton. Texts are independent, so they run in parallel over one shared
//! [`Synthesizer`].

use anyhow::Result;
use log::debug;
use rayon::prelude::*;
use rigcade_engine::{parse, Synthesizer, TemplateTable};
use rigcade_model::{EngineConfig, EngineWarning, ErrorCode, Skeleton, Timeline};
use std::path::Path;
use std::process::ExitCode;

use super::json_output::{warnings_to_json, JsonError, JsonWarning};
use super::reporting::Reporter;
use crate::input::load_skeleton;

/// A timeline synthesized from one text.
#[derive(Debug, Clone)]
pub struct Animation {
    /// The text it came from.
    pub text: String,
    /// The synthesized timeline.
    pub timeline: Timeline,
    /// Parse and synthesis warnings, in that order.
    pub warnings: Vec<EngineWarning>,
}

/// A text that could not be animated.
#[derive(Debug, Clone)]
pub struct AnimationFailure {
    /// The text.
    pub text: String,
    /// Engine error code.
    pub code: ErrorCode,
    /// Error message.
    pub message: String,
}

impl AnimationFailure {
    fn to_json(&self) -> JsonError {
        JsonError::engine(self.code, self.message.clone()).with_text(self.text.clone())
    }
}

/// Animates every text, keeping input order in the result.
pub fn animate_all(
    skeleton: &Skeleton,
    texts: &[String],
    config: &EngineConfig,
) -> Vec<Result<Animation, AnimationFailure>> {
    let templates = TemplateTable::builtin();
    let synthesizer = Synthesizer::new(&templates, &config.synthesis);
    debug!("animating {} texts in parallel", texts.len());
    texts
        .par_iter()
        .map(|text| animate_one(skeleton, text, &synthesizer, config))
        .collect()
}

fn animate_one(
    skeleton: &Skeleton,
    text: &str,
    synthesizer: &Synthesizer<'_>,
    config: &EngineConfig,
) -> Result<Animation, AnimationFailure> {
    let failure = |code: ErrorCode, message: String| AnimationFailure {
        text: text.to_string(),
        code,
        message,
    };
    let (intent, mut warnings) = parse(text, &config.intent)
        .map_err(|e| failure(e.code(), e.to_string()))?
        .into_parts();
    let (timeline, synthesis_warnings) = synthesizer
        .synthesize(skeleton, &intent)
        .map_err(|e| failure(e.code(), e.to_string()))?
        .into_parts();
    warnings.extend(synthesis_warnings);
    Ok(Animation {
        text: text.to_string(),
        timeline,
        warnings,
    })
}

/// Splits results into animations and failures, both in input order.
pub(crate) fn partition(
    results: Vec<Result<Animation, AnimationFailure>>,
) -> (Vec<Animation>, Vec<AnimationFailure>) {
    let mut animations = Vec::new();
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(animation) => animations.push(animation),
            Err(failure) => failures.push(failure),
        }
    }
    (animations, failures)
}

/// Warnings of every animation, tagged with their text.
pub(crate) fn animation_warnings(animations: &[Animation]) -> Vec<JsonWarning> {
    animations
        .iter()
        .flat_map(|a| {
            warnings_to_json(&a.warnings)
                .into_iter()
                .map(move |w| w.with_text(a.text.clone()))
        })
        .collect()
}

/// Errors of every failure.
pub(crate) fn failure_errors(failures: &[AnimationFailure]) -> Vec<JsonError> {
    failures.iter().map(AnimationFailure::to_json).collect()
}

/// One summary line per animation.
pub(crate) fn summarize(reporter: &Reporter, animations: &[Animation]) {
    for animation in animations {
        let timeline = &animation.timeline;
        reporter.detail(format!(
            "{}: {:.2}s, {} tracks, {} keys, {} events",
            timeline.name,
            timeline.duration_seconds,
            timeline.tracks.len(),
            timeline.key_count(),
            timeline.event_tracks.len()
        ));
    }
}

/// Run the animate command
///
/// # Arguments
/// * `skeleton_path` - Path to a skeleton written by `rig`
/// * `texts` - One free-text request per timeline
/// * `output` - Where to write the timeline array (default: stdout)
/// * `config` - Engine configuration
/// * `json_output` - Whether to output machine-readable JSON diagnostics
///
/// # Returns
/// Exit code: 0 if every text was animated, 1 otherwise
pub fn run(
    skeleton_path: &str,
    texts: &[String],
    output: Option<&str>,
    config: &EngineConfig,
    json_output: bool,
) -> Result<ExitCode> {
    let reporter = Reporter::new("animate", json_output);
    reporter.heading("Animating:", skeleton_path);

    let skeleton = match load_skeleton(Path::new(skeleton_path)) {
        Ok(skeleton) => skeleton,
        Err(e) => return reporter.input_failed(e),
    };

    let (animations, failures) = partition(animate_all(&skeleton, texts, config));
    let warnings = animation_warnings(&animations);
    if !failures.is_empty() {
        return reporter.failed(failure_errors(&failures), warnings);
    }

    summarize(&reporter, &animations);
    let timelines: Vec<Timeline> = animations.into_iter().map(|a| a.timeline).collect();
    reporter.succeeded(&timelines, warnings, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rigcade_engine::infer;
    use rigcade_model::{LayerNode, LayerTree, Rect};

    fn skeleton() -> Skeleton {
        let tree = LayerTree::new(LayerNode::group(
            "doc",
            "Character",
            0,
            vec![
                LayerNode::new("torso", "Body", Rect::new(40.0, 60.0, 40.0, 80.0), 1),
                LayerNode::new("head", "Head", Rect::new(40.0, 10.0, 40.0, 45.0), 2),
            ],
        ));
        infer(&tree, &EngineConfig::default().inference).unwrap().value
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_results_keep_input_order() {
        let results = animate_all(
            &skeleton(),
            &texts(&["nod", "sad nod", "happy nod"]),
            &EngineConfig::default(),
        );
        let names: Vec<String> = results
            .into_iter()
            .map(|r| r.unwrap().timeline.name)
            .collect();
        assert_eq!(names, vec!["nod", "nod_sad", "nod_happy"]);
    }

    #[test]
    fn test_failures_carry_text_and_code() {
        let (animations, failures) = partition(animate_all(
            &skeleton(),
            &texts(&["nod", "ponder"]),
            &EngineConfig::default(),
        ));
        assert_eq!(animations.len(), 1);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].text, "ponder");
        assert_eq!(failures[0].code, ErrorCode::UnrecognizedMotion);

        let errors = failure_errors(&failures);
        assert_eq!(errors[0].code, "E200");
        assert_eq!(errors[0].text.as_deref(), Some("ponder"));
    }

    #[test]
    fn test_partial_skeleton_warnings_are_tagged() {
        let (animations, _) = partition(animate_all(
            &skeleton(),
            &texts(&["walk"]),
            &EngineConfig::default(),
        ));
        let warnings = animation_warnings(&animations);
        assert!(!warnings.is_empty());
        assert!(warnings.iter().all(|w| w.text.as_deref() == Some("walk")));
    }
}
