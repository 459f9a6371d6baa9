//! Rigcade End-to-End Test Infrastructure
//!
//! This crate holds integration tests that cross crate boundaries:
//!
//! - Pipeline: layer tree -> skeleton -> timelines -> project document
//! - CLI: staged commands against a one-shot `build`
//! - **Determinism**: byte-identical documents across runs
//! - Properties: structural invariants over generated layer trees
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p rigcade-tests
//! cargo test -p rigcade-tests --test proptest_rigging
//! ```

pub mod determinism;
pub mod fixtures;

pub use determinism::{compute_hash, verify_determinism, DeterminismResult, DiffInfo};
pub use fixtures::{bust, expressive_bust, full_character, ProjectFixture, MOTION_TEXTS};
