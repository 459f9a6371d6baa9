//! Rigcade Data Model
//!
//! This crate provides the types shared by every Rigcade component: the
//! decoded layer tree of a character image, the skeleton inferred from it,
//! structured animation intents, keyframe timelines, and the engine
//! configuration.
//!
//! Everything here is plain data plus validation. The algorithms that turn
//! one into another live in `rigcade-engine`, and the project document
//! writer lives in `rigcade-backend-spine`.
//!
//! # Example
//!
//! ```
//! use rigcade_model::{LayerNode, LayerTree, Rect};
//!
//! let tree = LayerTree::new(LayerNode::group(
//!     "doc",
//!     "Character",
//!     0,
//!     vec![
//!         LayerNode::new("torso", "Body", Rect::new(40.0, 60.0, 40.0, 80.0), 1),
//!         LayerNode::new("head", "Head", Rect::new(40.0, 10.0, 40.0, 40.0), 2),
//!     ],
//! ));
//! assert!(tree.validate().is_ok());
//! assert_eq!(tree.bounds(), Some(Rect::new(40.0, 10.0, 40.0, 130.0)));
//! ```
//!
//! # Modules
//!
//! - [`error`]: Error codes, warnings, and validation errors
//! - [`geometry`]: Points, rectangles, transforms, and the image/rig flip
//! - [`layer`]: Layer tree model
//! - [`skeleton`]: Bone arena, IK constraints, skin attachments
//! - [`intent`]: Animation intent and effect table
//! - [`timeline`]: Keyframe tracks and effect events
//! - [`assets`]: Asset manifest
//! - [`config`]: Engine configuration
//! - [`hash`]: Canonical content hashing

pub mod assets;
pub mod config;
pub mod error;
pub mod geometry;
pub mod hash;
pub mod intent;
pub mod layer;
pub mod skeleton;
pub mod timeline;

pub use assets::{attachment_path, AssetManifest};
pub use config::{EngineConfig, ExportConfig, InferenceConfig, IntentConfig, SynthesisConfig};
pub use error::{
    EngineWarning, ErrorCode, LayerTreeError, ModelError, Outcome, SkeletonError, TimelineError,
    WarningCode,
};
pub use geometry::{image_to_rig, normalize_degrees, round_to, Point, Rect, Transform2D};
pub use hash::{content_hash, short_hash};
pub use intent::{AnimationIntent, BaseMotion, EffectAnchor, EffectSpec, EffectTag, Emotion};
pub use layer::{LayerNode, LayerTree, LayerVisit};
pub use skeleton::{
    BendDirection, BodyRegion, Bone, BoneId, BoneRole, BoneSpec, ExpressionSet, IkConstraint,
    Limb, PartKind, Side, Skeleton, SkeletonBuilder, SkinAttachment,
};
pub use timeline::{AttachmentKey, EffectEvent, Interpolation, Keyframe, Timeline};
