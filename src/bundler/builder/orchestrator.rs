//! Main packager orchestration.
//!
//! The [`Packager`] selects the platform builder for the run's target,
//! drives it through construct and finish, and reports the size and checksum
//! of whatever installer it produced.

use super::{
    checksum::{calculate_sha256, calculate_size},
    tool_detection::require_tools,
};
use crate::bundler::{
    InstallerBuilder, PackagedArtifact, Result,
    error::Context,
    manifest::Manifest,
    platform::{PlatformBuilder, run_builder},
    settings::{BuildMetadata, Platform},
    signing::SigningIdentity,
};

/// Main packager orchestrator.
///
/// One packager handles one platform target per process; the destination
/// tree is mutated in place and must not be shared with another run.
///
/// # Examples
///
/// ```no_run
/// use viewer_packager::bundler::{BuildMetadata, Manifest, Packager};
///
/// # async fn example(metadata: BuildMetadata) -> viewer_packager::bundler::Result<()> {
/// let packager = Packager::new(metadata, Manifest::new(), None)?;
/// match packager.run().await? {
///     Some(packaged) => println!("SHA256: {}", packaged.checksum),
///     None => println!("tree staged, nothing packaged"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Packager {
    builder: PlatformBuilder,
}

impl Packager {
    /// Creates a packager for `metadata`'s target.
    ///
    /// # Arguments
    ///
    /// * `metadata` - Run configuration
    /// * `manifest` - Generic staging output to replay before platform staging
    /// * `identity` - Signing credentials; `None` disables signing
    pub fn new(
        metadata: BuildMetadata,
        manifest: Manifest,
        identity: Option<SigningIdentity>,
    ) -> Result<Self> {
        Ok(Self {
            builder: PlatformBuilder::new(metadata, manifest, identity)?,
        })
    }

    /// Run configuration.
    pub fn metadata(&self) -> &BuildMetadata {
        self.builder.metadata()
    }

    /// Runs construct and, when packaging, finish.
    ///
    /// # Returns
    ///
    /// The installer with its size and SHA-256, or `None` when nothing was
    /// packaged (no `package` action, or a non-release Linux build).
    pub async fn run(mut self) -> Result<Option<PackagedArtifact>> {
        let metadata = self.builder.metadata();
        log::info!(
            "Packaging {} {} for {}",
            metadata.app_name(),
            metadata.version_joined("."),
            metadata.target()
        );

        if metadata.actions().is_packaging() {
            require_tools(finish_tools(metadata).iter().copied())
                .context("checking packaging tools")?;
        }

        let Some(artifact) = run_builder(&mut self.builder).await? else {
            return Ok(None);
        };

        let size = calculate_size(&artifact.path).await?;
        let checksum = calculate_sha256(&artifact.path).await?;
        log::info!(
            "✓ {} {} ({} bytes, sha256 {})",
            artifact.kind,
            artifact.path.display(),
            size,
            checksum
        );

        Ok(Some(PackagedArtifact {
            artifact,
            size,
            checksum,
        }))
    }
}

/// Tools the finish step cannot work without, checked before anything is staged.
///
/// makensis is not listed; its lookup also searches the NSIS install
/// directories and happens in the Windows builder.
pub fn finish_tools(metadata: &BuildMetadata) -> Vec<&'static str> {
    match metadata.platform() {
        Platform::Windows => Vec::new(),
        Platform::Darwin => vec!["hdiutil", "SetFile", "Rez"],
        Platform::Linux if metadata.is_release() => vec!["tar", "strip"],
        Platform::Linux => Vec::new(),
    }
}
