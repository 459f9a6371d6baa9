//! Rigcade Engine
//!
//! The pure transformations at the heart of Rigcade:
//!
//! - **Inference**: layer tree in, rigged skeleton out
//! - **Intent parsing**: free text in, structured animation intent out
//! - **Synthesis**: skeleton plus intent in, keyframe timeline out
//!
//! None of these touch the filesystem or hold shared mutable state, so any
//! number of synthesis calls may run in parallel against one skeleton.
//! [`SkeletonCache`] is the only stateful piece and hands out immutable
//! `Arc<Skeleton>` snapshots.
//!
//! # Example
//!
//! ```
//! use rigcade_engine::{infer, parse, synthesize, TemplateTable};
//! use rigcade_model::{EngineConfig, LayerNode, LayerTree, Rect};
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
//!
//! let skeleton = infer(&tree, &config.inference).unwrap().value;
//! let intent = parse("very happy nod", &config.intent).unwrap().value;
//! let templates = TemplateTable::builtin();
//! let timeline = synthesize(&skeleton, &intent, &templates, &config.synthesis)
//!     .unwrap()
//!     .value;
//!
//! assert_eq!(timeline.name, "nod_happy");
//! assert!(timeline.validate().is_ok());
//! ```
//!
//! # Modules
//!
//! - [`error`]: Error types with stable codes
//! - [`infer`]: Skeleton inference
//! - [`intent`]: Intent parsing
//! - [`synthesis`]: Motion templates and keyframe synthesis
//! - [`cache`]: Per-character skeleton cache

pub mod cache;
pub mod error;
pub mod infer;
pub mod intent;
pub mod synthesis;

pub use cache::{CharacterId, SkeletonCache};
pub use error::{InferenceError, IntentError, SynthesisError};
pub use infer::{bend_direction, infer};
pub use intent::parse;
pub use synthesis::{
    synthesize, BoneSelector, Channel, CurveShape, EmotionProfile, MotionTemplate, Property,
    SideSelector, Synthesizer, TemplateTable,
};
