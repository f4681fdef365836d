//! Platform-specific installer builders.
//!
//! Every builder runs the same two-step protocol through [`InstallerBuilder`]:
//! `construct` stages the tree, and `finish` turns it into the installer.
//! [`run_builder`] drives the `Construct -> Finish -> Done` state machine;
//! `finish` only runs when the `package` action was requested.
//!
//! | Platform | Artifact | Module |
//! |----------|----------|--------|
//! | Windows | NSIS `.exe` | [`windows`] |
//! | macOS | UDZO `.dmg` | [`macos`] |
//! | Linux | `.tar.xz` | [`linux`] |
//!
//! Shared base staging (replaying the file-copy log) lives in [`Staging`]
//! and is composed into each builder.

pub mod linux;
pub mod macos;
pub mod windows;

use crate::bundler::{
    InstallerArtifact,
    error::Result,
    manifest::{Manifest, Presence},
    settings::{BuildMetadata, Platform},
    signing::SigningIdentity,
};
use std::{
    fmt,
    future::Future,
    path::{Path, PathBuf},
};

pub use linux::LinuxBuilder;
pub use macos::DarwinBuilder;
pub use windows::WindowsBuilder;

/// Builder protocol state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildState {
    /// Staging runtime files into the destination tree
    Construct,
    /// Producing the installer
    Finish,
    /// Nothing left to do
    Done,
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BuildState::Construct => "construct",
            BuildState::Finish => "finish",
            BuildState::Done => "done",
        })
    }
}

/// One platform's installer assembly.
pub trait InstallerBuilder {
    /// Run metadata.
    fn metadata(&self) -> &BuildMetadata;

    /// Stages the generic file-copy log and the platform runtime files.
    fn construct(&mut self) -> impl Future<Output = Result<()>>;

    /// Produces the installer. `None` when the platform has nothing to ship
    /// for this build type (e.g. a non-release Linux tree).
    fn finish(&mut self) -> impl Future<Output = Result<Option<InstallerArtifact>>>;
}

/// Runs `builder` through `Construct -> Finish -> Done`.
pub async fn run_builder<B: InstallerBuilder>(builder: &mut B) -> Result<Option<InstallerArtifact>> {
    let mut state = BuildState::Construct;
    let mut artifact = None;

    loop {
        log::debug!("Builder state: {}", state);
        state = match state {
            BuildState::Construct => {
                builder.construct().await?;
                if builder.metadata().actions().is_packaging() {
                    BuildState::Finish
                } else {
                    log::info!("package action not requested; skipping installer creation");
                    BuildState::Done
                }
            }
            BuildState::Finish => {
                artifact = builder.finish().await?;
                BuildState::Done
            }
            BuildState::Done => return Ok(artifact),
        };
    }
}

/// A runtime file to stage from the build output.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RuntimeFile {
    /// Absolute source path
    pub source: PathBuf,
    /// Absolute destination path
    pub destination: PathBuf,
    /// Whether absence is fatal
    pub required: bool,
}

impl RuntimeFile {
    /// A file whose absence is a [`MissingComponent`](crate::bundler::Error::MissingComponent).
    pub fn required(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            required: true,
        }
    }

    /// A file that is logged and skipped when absent.
    pub fn optional(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            required: false,
        }
    }
}

/// Shared base staging: the metadata plus the accumulated file-copy log.
#[derive(Debug, Clone)]
pub struct Staging {
    metadata: BuildMetadata,
    manifest: Manifest,
}

impl Staging {
    /// Wraps the run metadata and the generic staging output.
    pub fn new(metadata: BuildMetadata, manifest: Manifest) -> Self {
        Self { metadata, manifest }
    }

    /// Run metadata.
    pub fn metadata(&self) -> &BuildMetadata {
        &self.metadata
    }

    /// The file-copy log so far.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Replays the generic staging output into the destination root.
    pub async fn construct_base(&mut self) -> Result<()> {
        crate::bundler::utils::fs::create_dir_all(self.metadata.dest_root(), false).await?;
        self.manifest.replay(self.metadata.dest_root()).await
    }

    /// Stages each file, in order, returning whether each one was present.
    pub async fn stage_all(&mut self, files: &[RuntimeFile]) -> Result<Vec<Presence>> {
        let mut presence = Vec::with_capacity(files.len());
        for file in files {
            if file.required {
                self.stage_file(&file.source, &file.destination).await?;
                presence.push(Presence::Present);
            } else {
                presence.push(self.stage_optional(&file.source, &file.destination).await?);
            }
        }
        Ok(presence)
    }

    /// Copies a required file into the destination tree.
    pub async fn stage_file(&mut self, source: &Path, destination: &Path) -> Result<()> {
        self.manifest
            .stage_file(self.metadata.dest_root(), source, destination)
            .await
    }

    /// Copies an optional file into the destination tree.
    pub async fn stage_optional(&mut self, source: &Path, destination: &Path) -> Result<Presence> {
        self.manifest
            .stage_optional(self.metadata.dest_root(), source, destination)
            .await
    }

    /// Copies a directory tree into the destination, recording its files.
    pub async fn stage_dir(&mut self, source: &Path, destination: &Path) -> Result<()> {
        self.manifest
            .stage_dir(self.metadata.dest_root(), source, destination)
            .await
    }
}

/// The builder selected by the run's target platform.
#[derive(Debug)]
pub enum PlatformBuilder {
    /// NSIS installer
    Windows(WindowsBuilder),
    /// Disk image
    Darwin(DarwinBuilder),
    /// Archive
    Linux(LinuxBuilder),
}

impl PlatformBuilder {
    /// Selects and creates the builder for `metadata.platform()`.
    ///
    /// # Errors
    ///
    /// [`Error::ArchError`](crate::bundler::Error::ArchError) when the
    /// architecture is not valid for the platform.
    pub fn new(
        metadata: BuildMetadata,
        manifest: Manifest,
        identity: Option<SigningIdentity>,
    ) -> Result<Self> {
        let staging = Staging::new(metadata, manifest);
        Ok(match staging.metadata().platform() {
            Platform::Windows => PlatformBuilder::Windows(WindowsBuilder::new(staging, identity)?),
            Platform::Darwin => PlatformBuilder::Darwin(DarwinBuilder::new(staging, identity)),
            Platform::Linux => PlatformBuilder::Linux(LinuxBuilder::new(staging)?),
        })
    }
}

impl InstallerBuilder for PlatformBuilder {
    fn metadata(&self) -> &BuildMetadata {
        match self {
            PlatformBuilder::Windows(b) => b.metadata(),
            PlatformBuilder::Darwin(b) => b.metadata(),
            PlatformBuilder::Linux(b) => b.metadata(),
        }
    }

    async fn construct(&mut self) -> Result<()> {
        match self {
            PlatformBuilder::Windows(b) => b.construct().await,
            PlatformBuilder::Darwin(b) => b.construct().await,
            PlatformBuilder::Linux(b) => b.construct().await,
        }
    }

    async fn finish(&mut self) -> Result<Option<InstallerArtifact>> {
        match self {
            PlatformBuilder::Windows(b) => b.finish().await,
            PlatformBuilder::Darwin(b) => b.finish().await,
            PlatformBuilder::Linux(b) => b.finish().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{
        ArtifactKind,
        settings::{Action, Arch, BuildMetadataBuilder},
    };

    struct Recording {
        metadata: BuildMetadata,
        calls: Vec<&'static str>,
    }

    impl InstallerBuilder for Recording {
        fn metadata(&self) -> &BuildMetadata {
            &self.metadata
        }

        async fn construct(&mut self) -> Result<()> {
            self.calls.push("construct");
            Ok(())
        }

        async fn finish(&mut self) -> Result<Option<InstallerArtifact>> {
            self.calls.push("finish");
            Ok(Some(InstallerArtifact {
                path: PathBuf::from("/d/out.tar.xz"),
                kind: ArtifactKind::TarArchive,
            }))
        }
    }

    fn recording(actions: &[Action]) -> Recording {
        let metadata = BuildMetadataBuilder::new()
            .platform(Platform::Linux)
            .arch(Arch::X86_64)
            .channel("Singularity Release")
            .version("1.0.0.1")
            .configuration("Release")
            .actions(actions.iter().copied())
            .source_root("/s")
            .build_root("/b")
            .dest_root("/d")
            .build()
            .unwrap();
        Recording {
            metadata,
            calls: Vec::new(),
        }
    }

    #[tokio::test]
    async fn finish_runs_only_when_packaging() {
        let mut copy_only = recording(&[Action::Copy, Action::Unpacked]);
        assert_eq!(run_builder(&mut copy_only).await.unwrap(), None);
        assert_eq!(copy_only.calls, vec!["construct"]);

        let mut package = recording(&[Action::Package]);
        let artifact = run_builder(&mut package).await.unwrap().unwrap();
        assert_eq!(artifact.kind, ArtifactKind::TarArchive);
        assert_eq!(package.calls, vec!["construct", "finish"]);
    }

    #[test]
    fn selects_builder_by_platform() {
        let metadata = BuildMetadataBuilder::new()
            .platform(Platform::Darwin)
            .arch(Arch::Universal)
            .channel("Singularity Beta")
            .version("1.0.0.1")
            .configuration("Release")
            .source_root("/s")
            .build_root("/b")
            .dest_root("/d")
            .build()
            .unwrap();
        let builder = PlatformBuilder::new(metadata, Manifest::new(), None).unwrap();
        assert!(matches!(builder, PlatformBuilder::Darwin(_)));
    }
}
