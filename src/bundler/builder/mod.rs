//! Packaging orchestration and coordination.
//!
//! # Module Organization
//!
//! - [`checksum`] - SHA-256 and size of the produced artifact
//! - [`orchestrator`] - Main [`Packager`] struct
//! - [`tool_detection`] - External tool lookup

mod checksum;
mod orchestrator;
mod tool_detection;

pub use checksum::{calculate_sha256, calculate_size};
pub use orchestrator::{Packager, finish_tools};
pub use tool_detection::{find_tool, require_tools};
