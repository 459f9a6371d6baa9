//! CLI command implementations

pub mod animate;
pub mod build;
pub mod export;
pub mod intent;
pub mod json_output;
mod reporting;
pub mod rig;
