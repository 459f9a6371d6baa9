//! Engine error types.

use rigcade_model::{BaseMotion, ErrorCode, LayerTreeError, SkeletonError, TimelineError};
use thiserror::Error;

/// Skeleton inference failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    /// The input tree violates a structural invariant.
    #[error("invalid layer tree: {0}")]
    InvalidLayerTree(#[from] LayerTreeError),

    /// No visible layer name matched the body-part vocabulary.
    #[error("no layer name matches a known body part")]
    NoMatchableLayers,

    /// Too many equally-specific candidates competed for one body slot.
    #[error("{} layers are equally good matches for '{slot}': {}", .candidates.len(), .candidates.join(", "))]
    AmbiguousMatch {
        /// Slot name, e.g. `hand_l`.
        slot: String,
        /// Competing layer ids in document order.
        candidates: Vec<String>,
    },

    /// The constructed skeleton failed validation.
    #[error("inferred skeleton is invalid: {0}")]
    InvalidSkeleton(#[from] SkeletonError),
}

impl InferenceError {
    /// Stable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            InferenceError::InvalidLayerTree(_) => ErrorCode::InvalidLayerTree,
            InferenceError::NoMatchableLayers => ErrorCode::NoMatchableLayers,
            InferenceError::AmbiguousMatch { .. } => ErrorCode::AmbiguousMatch,
            InferenceError::InvalidSkeleton(_) => ErrorCode::InvalidSkeleton,
        }
    }
}

/// Intent parsing failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntentError {
    /// The text names no known base motion.
    #[error("no known motion in '{0}' (try idle, walk, run, jump, wave, nod or dance)")]
    UnrecognizedMotion(String),
}

impl IntentError {
    /// Stable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            IntentError::UnrecognizedMotion(_) => ErrorCode::UnrecognizedMotion,
        }
    }
}

/// Keyframe synthesis failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthesisError {
    /// The template table has no entry for the motion.
    #[error("no motion template registered for '{0}'")]
    UnknownTemplate(BaseMotion),

    /// The produced timeline failed validation.
    #[error("synthesized timeline is invalid: {0}")]
    InvalidTimeline(#[from] TimelineError),
}

impl SynthesisError {
    /// Stable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            SynthesisError::UnknownTemplate(_) => ErrorCode::UnknownTemplate,
            SynthesisError::InvalidTimeline(_) => ErrorCode::InvalidTimeline,
        }
    }
}
