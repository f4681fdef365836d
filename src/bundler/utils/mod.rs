//! Shared helpers for the platform builders.
//!
//! - `fs` - async filesystem operations with path context
//! - `process` - external tool execution
//! - `retry` - bounded retry with exponential backoff

pub mod fs;
pub mod process;
pub mod retry;
