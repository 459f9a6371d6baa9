//! JSON output types for machine-readable CLI output.
//!
//! Every command accepts `--json`. In that mode stdout carries exactly one
//! [`CommandOutput`] object and nothing is colored.

use rigcade_model::{EngineWarning, ErrorCode};
use serde::{Deserialize, Serialize};

/// Error codes for CLI-level failures.
///
/// Engine failures pass their own `E###` codes through unchanged.
pub mod error_codes {
    /// Input file could not be read or parsed
    pub const INPUT: &str = "CLI_001";
    /// Output file could not be written
    pub const OUTPUT: &str = "CLI_002";
    /// JSON serialization error
    pub const JSON_SERIALIZE: &str = "CLI_003";
}

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code (e.g., "CLI_001", "E300")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Intent text that produced the error (animate and build only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl JsonError {
    /// Creates a new error with code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            text: None,
        }
    }

    /// Creates an error from an engine error code.
    pub fn engine(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(code.code(), message)
    }

    /// Sets the intent text this error belongs to.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// A structured warning in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonWarning {
    /// Stable warning code (e.g., "W101")
    pub code: String,
    /// Human-readable warning message
    pub message: String,
    /// Intent text that produced the warning (animate and build only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl JsonWarning {
    /// Sets the intent text this warning belongs to.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

impl From<&EngineWarning> for JsonWarning {
    fn from(warning: &EngineWarning) -> Self {
        Self {
            code: warning.code.code().to_string(),
            message: warning.message.clone(),
            text: None,
        }
    }
}

/// Converts engine warnings to JSON warnings.
pub fn warnings_to_json(warnings: &[EngineWarning]) -> Vec<JsonWarning> {
    warnings.iter().map(JsonWarning::from).collect()
}

/// JSON output shared by every command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandOutput {
    /// Command name
    pub command: String,
    /// Whether the command succeeded
    pub success: bool,
    /// Errors encountered
    pub errors: Vec<JsonError>,
    /// Warnings attached to engine outcomes
    pub warnings: Vec<JsonWarning>,
    /// Path the artifact was written to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// The produced artifact (on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

impl CommandOutput {
    /// Creates a successful output.
    pub fn success(
        command: &str,
        result: serde_json::Value,
        warnings: Vec<JsonWarning>,
        output: Option<&str>,
    ) -> Self {
        Self {
            command: command.to_string(),
            success: true,
            errors: Vec::new(),
            warnings,
            output: output.map(str::to_string),
            result: Some(result),
        }
    }

    /// Creates a failed output.
    pub fn failure(command: &str, errors: Vec<JsonError>, warnings: Vec<JsonWarning>) -> Self {
        Self {
            command: command.to_string(),
            success: false,
            errors,
            warnings,
            output: None,
            result: None,
        }
    }
}
