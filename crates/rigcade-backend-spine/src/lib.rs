//! Rigcade Spine Backend - Skeleton Animation Project Export
//!
//! This crate turns an inferred [`Skeleton`](rigcade_model::Skeleton) and
//! its synthesized [`Timeline`](rigcade_model::Timeline)s into a Spine 4.1
//! JSON project document, and reads such documents back for verification.
//!
//! # Ordering
//!
//! Spine resolves bone parents in declaration order and draws slots in
//! declaration order, so bones are emitted in skeleton arena order (parents
//! first) and slots in attachment creation order. Everything keyed by name
//! is a `BTreeMap`, so identical inputs give byte-identical output.
//!
//! # Example
//!
//! ```
//! use rigcade_backend_spine::serialize;
//! use rigcade_engine::infer;
//! use rigcade_model::{AssetManifest, EngineConfig, LayerNode, LayerTree, Rect};
//!
//! let tree = LayerTree::new(LayerNode::group(
//!     "doc",
//!     "Character",
//!     0,
//!     vec![
//!         LayerNode::new("torso", "Body", Rect::new(40.0, 60.0, 40.0, 80.0), 1),
//!         LayerNode::new("head", "Head", Rect::new(40.0, 10.0, 40.0, 45.0), 2),
//!     ],
//! ));
//! let config = EngineConfig::default();
//! let skeleton = infer(&tree, &config.inference).unwrap().value;
//! let assets = AssetManifest::for_layers(&tree);
//!
//! let document = serialize(&skeleton, &[], &assets, &config.export).unwrap();
//! assert_eq!(document.bones[0].name, "root");
//! assert_eq!(document.slots[0].name, "slot_torso");
//! ```
//!
//! # Modules
//!
//! - [`document`]: Serde model of the project document
//! - [`serialize`]: Conversion from Rigcade types
//! - [`error`]: Export errors

pub mod document;
pub mod error;
pub mod serialize;

pub use document::{
    AnimationData, AttachmentSwap, BoneData, BoneTimelines, EventData, EventKey, IkData,
    IkMembership, ProjectDocument, RegionAttachment, RotateKey, SkeletonHeader, SkinData,
    SlotData, SlotTimelines, TranslateKey,
};
pub use error::{ExportError, ExportResult};
pub use serialize::{event_name, serialize, slot_name, DEFAULT_SKIN};

/// Crate version for backend identification.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Backend identifier.
pub const BACKEND_ID: &str = "rigcade-backend-spine";
