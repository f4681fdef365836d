//! Run metadata for one packaging invocation.
//!
//! This module provides the immutable [`BuildMetadata`] resolved once at
//! process start, its builder, the platform/architecture tags that select a
//! builder, and the channel-derived naming rules.

mod arch;
mod builder;
mod bundle;
mod channel;
mod core;
mod package;

// Re-export all public types
pub use arch::{Arch, Platform, Target};
pub use builder::BuildMetadataBuilder;
pub use bundle::Branding;
pub use channel::ChannelType;
pub use core::BuildMetadata;
pub use package::{Action, Actions, BuildType};
