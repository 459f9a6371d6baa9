//! Error codes, warnings, and model-level error types.

use thiserror::Error;

/// Stable error codes surfaced by every rigcade component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Layer tree / inference errors (E100-E109)
    /// E100: Layer tree violates a structural invariant
    InvalidLayerTree,
    /// E101: No layer name matched the body-part vocabulary
    NoMatchableLayers,
    /// E102: Too many equally-specific candidates for one body slot
    AmbiguousMatch,
    /// E103: Constructed skeleton violates a structural invariant
    InvalidSkeleton,

    // Intent errors (E200-E209)
    /// E200: Text contains no known base motion
    UnrecognizedMotion,

    // Synthesis errors (E300-E309)
    /// E300: No motion template is registered for the base motion
    UnknownTemplate,
    /// E301: Produced timeline violates a structural invariant
    InvalidTimeline,

    // Export errors (E400-E409)
    /// E400: A skin attachment has no entry in the asset manifest
    MissingAsset,
    /// E401: A timeline track references a bone outside the skeleton
    UnknownBone,
    /// E402: Document encoding or decoding failed
    DocumentEncoding,
    /// E403: An animation keys a slot the document does not declare
    UnknownSlot,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "E101").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::InvalidLayerTree => "E100",
            ErrorCode::NoMatchableLayers => "E101",
            ErrorCode::AmbiguousMatch => "E102",
            ErrorCode::InvalidSkeleton => "E103",
            ErrorCode::UnrecognizedMotion => "E200",
            ErrorCode::UnknownTemplate => "E300",
            ErrorCode::InvalidTimeline => "E301",
            ErrorCode::MissingAsset => "E400",
            ErrorCode::UnknownBone => "E401",
            ErrorCode::DocumentEncoding => "E402",
            ErrorCode::UnknownSlot => "E403",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Warning codes for degraded-but-valid results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WarningCode {
    /// W100: Layer did not match the vocabulary and became an auxiliary bone
    AuxiliaryLayer,
    /// W101: Several layers competed for one body slot; a tie-break decided
    TieBroken,
    /// W200: A word in the request was not understood and was ignored
    IgnoredToken,
    /// W201: A scalar was clamped to its configured bounds
    ValueClamped,
    /// W300: Skeleton lacks bones a motion template asked for
    PartialSkeleton,
}

impl WarningCode {
    /// Returns the warning code string (e.g., "W300").
    pub fn code(&self) -> &'static str {
        match self {
            WarningCode::AuxiliaryLayer => "W100",
            WarningCode::TieBroken => "W101",
            WarningCode::IgnoredToken => "W200",
            WarningCode::ValueClamped => "W201",
            WarningCode::PartialSkeleton => "W300",
        }
    }
}

impl std::fmt::Display for WarningCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A non-fatal notice attached to a best-effort result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineWarning {
    /// The warning code.
    pub code: WarningCode,
    /// Human-readable message.
    pub message: String,
}

impl EngineWarning {
    /// Creates a new warning.
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for EngineWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A value together with the warnings produced while computing it.
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    /// The produced value.
    pub value: T,
    /// Non-fatal warnings, in the order they were raised.
    pub warnings: Vec<EngineWarning>,
}

impl<T> Outcome<T> {
    /// Wraps a value with no warnings.
    pub fn clean(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    /// Wraps a value with warnings.
    pub fn with_warnings(value: T, warnings: Vec<EngineWarning>) -> Self {
        Self { value, warnings }
    }

    /// Returns true if any warning has the given code.
    pub fn has_warning(&self, code: WarningCode) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }

    /// Splits into value and warnings.
    pub fn into_parts(self) -> (T, Vec<EngineWarning>) {
        (self.value, self.warnings)
    }
}

/// Structural problems in a layer tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayerTreeError {
    /// Two nodes share an id.
    #[error("duplicate layer id '{0}'")]
    DuplicateId(String),

    /// Paint order is not strictly increasing.
    #[error("layer '{id}' has z_index {z_index}, not above preceding {previous}")]
    ZOrder {
        /// Offending layer.
        id: String,
        /// Its z index.
        z_index: i32,
        /// The z index of the node painted just before.
        previous: i32,
    },

    /// Bounds have a negative or non-finite extent.
    #[error("layer '{0}' has invalid bounds")]
    InvalidBounds(String),
}

/// Structural problems in a skeleton.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkeletonError {
    /// A bone refers to a parent that was not created before it.
    #[error("bone '{bone}' refers to unknown or later parent {parent}")]
    UnknownParent {
        /// Bone name.
        bone: String,
        /// Parent id.
        parent: u32,
    },

    /// The skeleton has no root bone.
    #[error("skeleton has no root bone")]
    MissingRoot,

    /// More than one bone has no parent.
    #[error("bone '{0}' is a second root")]
    SecondRoot(String),

    /// Two bones share a name.
    #[error("duplicate bone name '{0}'")]
    DuplicateBoneName(String),

    /// A bone id is out of range.
    #[error("bone id {0} does not exist")]
    UnknownBone(u32),

    /// An IK chain is empty or not a parent-linked path.
    #[error("IK constraint '{0}' is not a contiguous chain")]
    NoncontiguousChain(String),

    /// A bone is an intermediate link of more than one IK chain.
    #[error("bone {bone} is an intermediate link of both '{first}' and '{second}'")]
    SharedChainLink {
        /// Bone id.
        bone: u32,
        /// First constraint.
        first: String,
        /// Second constraint.
        second: String,
    },

    /// Two attachments bind the same layer.
    #[error("layer '{0}' has more than one skin attachment")]
    DuplicateAttachment(String),

    /// A face layer has no attachment or sits on a different bone than the
    /// default face.
    #[error("face layer '{0}' is not attached to the face bone")]
    ExpressionLayer(String),
}

/// Structural problems in a timeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimelineError {
    /// Duration or frame rate is not positive.
    #[error("timeline '{0}' has a non-positive duration or frame rate")]
    InvalidDuration(String),

    /// A keyframe falls outside `[0, duration]`.
    #[error("bone {bone}: keyframe at {time}s lies outside [0, {duration}]")]
    KeyOutOfRange {
        /// Bone id.
        bone: u32,
        /// Key time.
        time: f64,
        /// Timeline duration.
        duration: f64,
    },

    /// Keyframe times on a track are not strictly increasing.
    #[error("bone {bone}: keyframe times are not strictly increasing at {time}s")]
    NonIncreasing {
        /// Bone id.
        bone: u32,
        /// First offending time.
        time: f64,
    },

    /// A keyframe carries NaN or infinity.
    #[error("bone {0}: keyframe value is not finite")]
    NonFinite(u32),

    /// An event falls outside `[0, duration]` or events are out of order.
    #[error("event at {0}s is out of range or out of order")]
    EventOrder(f64),

    /// A slot key falls outside `[0, duration]` or keys are out of order.
    #[error("slot '{slot}': key at {time}s is out of range or out of order")]
    SlotKeyOrder {
        /// Default layer id of the slot.
        slot: String,
        /// Offending key time.
        time: f64,
    },
}

/// Top-level error type for model I/O and validation.
#[derive(Debug, Error)]
pub enum ModelError {
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Layer tree validation failed.
    #[error("invalid layer tree: {0}")]
    LayerTree(#[from] LayerTreeError),

    /// Skeleton validation failed.
    #[error("invalid skeleton: {0}")]
    Skeleton(#[from] SkeletonError),

    /// Timeline validation failed.
    #[error("invalid timeline: {0}")]
    Timeline(#[from] TimelineError),

    /// Configuration value out of range.
    #[error("invalid configuration: {0}")]
    Config(String),
}
