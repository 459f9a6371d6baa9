//! Intent command implementation
//!
//! Parses free text into a structured animation intent.

use anyhow::Result;
use rigcade_engine::parse;
use rigcade_model::EngineConfig;
use std::process::ExitCode;

use super::json_output::{warnings_to_json, JsonError};
use super::reporting::Reporter;

/// Run the intent command
///
/// # Arguments
/// * `text` - Free-text animation request
/// * `output` - Where to write the intent (default: stdout)
/// * `config` - Engine configuration
/// * `json_output` - Whether to output machine-readable JSON diagnostics
pub fn run(
    text: &str,
    output: Option<&str>,
    config: &EngineConfig,
    json_output: bool,
) -> Result<ExitCode> {
    let reporter = Reporter::new("intent", json_output);
    reporter.heading("Parsing:", text);

    let (intent, warnings) = match parse(text, &config.intent) {
        Ok(outcome) => outcome.into_parts(),
        Err(e) => {
            let error = JsonError::engine(e.code(), e.to_string()).with_text(text);
            return reporter.failed(vec![error], Vec::new());
        }
    };

    reporter.detail(format!(
        "{} ({}), intensity {:.2}, speed {:.2}",
        intent.base_motion, intent.emotion, intent.intensity, intent.speed_factor
    ));
    if !intent.target_parts.is_empty() {
        let regions: Vec<&str> = intent.target_parts.iter().map(|r| r.as_str()).collect();
        reporter.detail(format!("targets: {}", regions.join(", ")));
    }
    if !intent.effects.is_empty() {
        let effects: Vec<&str> = intent.effects.iter().map(|e| e.as_str()).collect();
        reporter.detail(format!("effects: {}", effects.join(", ")));
    }

    let warnings = warnings_to_json(&warnings)
        .into_iter()
        .map(|w| w.with_text(text))
        .collect();
    reporter.succeeded(&intent, warnings, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rigcade_model::{AnimationIntent, BaseMotion, Emotion};
    use tempfile::tempdir;

    #[test]
    fn test_intent_writes_parsed_intent() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("intent.json");

        let code = run("wave happily", out.to_str(), &EngineConfig::default(), true).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);

        let intent: AnimationIntent =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(intent.base_motion, BaseMotion::Wave);
        assert_eq!(intent.emotion, Emotion::Happy);
    }

    #[test]
    fn test_intent_without_motion_fails() {
        let code = run("hello there", None, &EngineConfig::default(), true).unwrap();
        assert_eq!(code, ExitCode::from(1));
    }
}
