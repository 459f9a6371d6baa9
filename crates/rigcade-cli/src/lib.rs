//! Rigcade CLI library.
//!
//! This crate provides the core functionality for the Rigcade CLI: input
//! loading and the `rig`, `intent`, `animate`, `export`, and `build`
//! commands.

pub mod commands;
pub mod input;
