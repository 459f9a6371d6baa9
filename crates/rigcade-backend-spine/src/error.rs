//! Error types for the Spine backend.

use rigcade_model::{ErrorCode, ModelError};
use thiserror::Error;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors that can occur while building or reading a project document.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A skin attachment's layer has no asset path.
    #[error("layer '{layer_id}' has no entry in the asset manifest")]
    MissingAsset { layer_id: String },

    /// A timeline, slot, or constraint names a bone that is not declared
    /// before it.
    #[error("{context} references unknown bone '{bone}'")]
    UnknownBone { context: String, bone: String },

    /// An animation keys a slot that is not declared.
    #[error("{context} references unknown slot '{slot}'")]
    UnknownSlot { context: String, slot: String },

    /// JSON encoding or decoding failed.
    #[error("project document JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Hashing or model serialization failed.
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl ExportError {
    /// Stable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            ExportError::MissingAsset { .. } => ErrorCode::MissingAsset,
            ExportError::UnknownBone { .. } => ErrorCode::UnknownBone,
            ExportError::UnknownSlot { .. } => ErrorCode::UnknownSlot,
            ExportError::Json(_) | ExportError::Model(_) => ErrorCode::DocumentEncoding,
        }
    }
}
