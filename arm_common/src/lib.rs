//! Arm Common Library
//!
//! Shared definitions for every crate in the arm relay workspace.
//!
//! # Module Structure
//!
//! - [`consts`] - Joint count, message ids, command codes, defaults
//! - [`joint`] - The [`joint::JointVector`] type
//! - [`msg`] - Fixed-length wire layout and byte codec
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience

pub mod config;
pub mod consts;
pub mod joint;
pub mod msg;
pub mod prelude;
