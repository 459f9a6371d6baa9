//! Shared rendering for command results.
//!
//! Human mode keeps stdout for the artifact itself (when no `--output` is
//! given) and writes progress, warnings, and errors to stderr. JSON mode
//! prints a single [`CommandOutput`] to stdout.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;

use super::json_output::{error_codes, CommandOutput, JsonError, JsonWarning};
use crate::input::write_artifact;

/// Renders one command's result in the selected mode.
pub(crate) struct Reporter {
    command: &'static str,
    json: bool,
}

impl Reporter {
    pub(crate) fn new(command: &'static str, json: bool) -> Self {
        Self { command, json }
    }

    /// Prints a progress heading (human mode only).
    pub(crate) fn heading(&self, label: &str, subject: &str) {
        if !self.json {
            eprintln!("{} {}", label.cyan().bold(), subject);
        }
    }

    /// Prints a detail line (human mode only).
    pub(crate) fn detail(&self, line: impl AsRef<str>) {
        if !self.json {
            eprintln!("  {}", line.as_ref().dimmed());
        }
    }

    /// Reports an input that could not be loaded.
    pub(crate) fn input_failed(&self, err: anyhow::Error) -> Result<ExitCode> {
        self.failed(
            vec![JsonError::new(error_codes::INPUT, format!("{:#}", err))],
            Vec::new(),
        )
    }

    /// Reports a failed command.
    pub(crate) fn failed(
        &self,
        errors: Vec<JsonError>,
        warnings: Vec<JsonWarning>,
    ) -> Result<ExitCode> {
        if self.json {
            print_json(&CommandOutput::failure(self.command, errors, warnings))?;
        } else {
            print_warnings(&warnings);
            for error in &errors {
                eprintln!(
                    "  {} [{}]{}: {}",
                    "x".red(),
                    error.code.red(),
                    text_suffix(error.text.as_deref()).dimmed(),
                    error.message
                );
            }
            eprintln!("{} {}", "FAILED".red().bold(), self.command);
        }
        Ok(ExitCode::from(1))
    }

    /// Reports a produced artifact, writing it to `output` if given.
    pub(crate) fn succeeded<T: Serialize>(
        &self,
        artifact: &T,
        warnings: Vec<JsonWarning>,
        output: Option<&str>,
    ) -> Result<ExitCode> {
        let pretty = match serde_json::to_string_pretty(artifact) {
            Ok(pretty) => pretty,
            Err(e) => {
                return self.failed(
                    vec![JsonError::new(error_codes::JSON_SERIALIZE, e.to_string())],
                    warnings,
                )
            }
        };
        if let Some(path) = output {
            if let Err(e) = write_artifact(Path::new(path), &pretty) {
                return self.failed(
                    vec![JsonError::new(error_codes::OUTPUT, format!("{:#}", e))],
                    warnings,
                );
            }
        }

        if self.json {
            let result = serde_json::to_value(artifact)?;
            print_json(&CommandOutput::success(
                self.command,
                result,
                warnings,
                output,
            ))?;
        } else {
            print_warnings(&warnings);
            match output {
                Some(path) => eprintln!("{} {}", "Wrote:".green().bold(), path),
                None => println!("{}", pretty),
            }
        }
        Ok(ExitCode::SUCCESS)
    }
}

fn print_json(output: &CommandOutput) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(output)?);
    Ok(())
}

fn print_warnings(warnings: &[JsonWarning]) {
    for warning in warnings {
        eprintln!(
            "  {} [{}]{}: {}",
            "!".yellow(),
            warning.code.yellow(),
            text_suffix(warning.text.as_deref()).dimmed(),
            warning.message
        );
    }
}

fn text_suffix(text: Option<&str>) -> String {
    text.map(|t| format!(" in \"{}\"", t)).unwrap_or_default()
}
