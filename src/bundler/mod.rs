//! Platform installer assembly.
//!
//! Turns a staged file tree plus [`BuildMetadata`] into a single installer
//! artifact: an NSIS `.exe` on Windows, a compressed `.dmg` on macOS, or a
//! `.tar.xz` of a permission-normalized tree on Linux.
//!
//! # Pipeline
//!
//! ```text
//! file-copy log ─┬─> symlink resolver ─┐
//!                └─> script generator ─┴─> platform builder ─> signing agent ─> artifact
//! ```
//!
//! # Integration
//!
//! ```no_run
//! use viewer_packager::bundler::{
//!     Arch, BuildMetadataBuilder, Manifest, Packager, Platform,
//! };
//!
//! # async fn example() -> viewer_packager::bundler::Result<()> {
//! let metadata = BuildMetadataBuilder::new()
//!     .platform(Platform::Linux)
//!     .arch(Arch::X86_64)
//!     .channel("Singularity Release")
//!     .version("1.8.7.6861")
//!     .configuration("Release")
//!     .source_root("indra/newview")
//!     .build_root("build-linux-x86_64/newview")
//!     .dest_root("build-linux-x86_64/newview/packaged")
//!     .build()?;
//!
//! let packager = Packager::new(metadata, Manifest::new(), None)?;
//! if let Some(artifact) = packager.run().await? {
//!     println!("Created {} ({} bytes)", artifact.artifact.path.display(), artifact.size);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod builder;
pub mod error;
pub mod manifest;
pub mod platform;
mod settings;
pub mod signing;
pub mod symlink;
pub mod utils;

use std::{fmt, path::PathBuf};

// Public re-exports
pub use builder::{Packager, calculate_sha256, calculate_size, find_tool};
pub use error::{Error, Result};
pub use manifest::{DylibManifest, FileCopyRecord, Manifest, Presence};
pub use platform::{BuildState, InstallerBuilder, PlatformBuilder};
pub use settings::{
    Action, Actions, Arch, Branding, BuildMetadata, BuildMetadataBuilder, BuildType, ChannelType,
    Platform, Target,
};
pub use signing::{SignOutcome, SigningAgent, SigningIdentity};

/// Kind of installer artifact.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ArtifactKind {
    /// NSIS installer executable
    Exe,
    /// Compressed macOS disk image
    Dmg,
    /// xz-compressed tarball
    TarArchive,
}

impl ArtifactKind {
    /// File name suffix appended to the installer base name.
    pub fn suffix(&self) -> &'static str {
        match self {
            ArtifactKind::Exe => "_Setup.exe",
            ArtifactKind::Dmg => ".dmg",
            ArtifactKind::TarArchive => ".tar.xz",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Exe => write!(f, "NSIS installer"),
            ArtifactKind::Dmg => write!(f, "disk image"),
            ArtifactKind::TarArchive => write!(f, "tar.xz archive"),
        }
    }
}

/// The installer produced by a builder's finish step.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InstallerArtifact {
    /// Location of the artifact
    pub path: PathBuf,
    /// What it is
    pub kind: ArtifactKind,
}

/// An artifact together with its size and checksum.
#[derive(Clone, Debug)]
pub struct PackagedArtifact {
    /// The installer
    pub artifact: InstallerArtifact,
    /// Size in bytes
    pub size: u64,
    /// Hex-encoded SHA-256
    pub checksum: String,
}
