//! Installer packager for the viewer.
//!
//! This library assembles:
//! - Windows installers (.exe via NSIS)
//! - macOS disk images (.dmg)
//! - Linux archives (.tar.xz)
//!
//! from a staged build tree and the file-copy log that produced it. It can be
//! used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;
pub mod metadata;

// Re-export commonly used types
pub use error::{CliError, PackagerError, Result};
