//! Core BuildMetadata struct and path resolution.

use super::{Actions, Arch, Branding, BuildType, Platform, Target};
use std::path::{Path, PathBuf};

/// Run configuration resolved once at process start.
///
/// Central, immutable configuration for one packaging run, constructed via
/// [`BuildMetadataBuilder`](super::BuildMetadataBuilder). It is passed
/// explicitly to every builder and never mutated afterwards.
///
/// # Examples
///
/// ```no_run
/// use viewer_packager::bundler::{Arch, BuildMetadataBuilder, Platform};
///
/// # fn example() -> viewer_packager::bundler::Result<()> {
/// let metadata = BuildMetadataBuilder::new()
///     .platform(Platform::Linux)
///     .arch(Arch::X86_64)
///     .channel("Singularity Beta")
///     .version("1.8.7.6861")
///     .configuration("Release")
///     .build_type("Release")
///     .source_root("indra/newview")
///     .build_root("build-linux-x86_64/newview")
///     .dest_root("build-linux-x86_64/newview/packaged")
///     .build()?;
/// assert_eq!(metadata.installer_base_name(), "Singularity_Beta_1_8_7_6861_x86_64");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct BuildMetadata {
    /// Full channel name, e.g. "Singularity Beta"
    channel: String,

    /// Extra installer-name suffix; not part of the application name.
    channel_suffix: Option<String>,

    /// Ordered numeric version components.
    version: Vec<u32>,

    /// Platform and architecture pair.
    target: Target,

    /// Build configuration directory name (Debug, RelWithDebInfo, Release).
    configuration: String,

    /// Release or other.
    build_type: BuildType,

    /// Grid the build targets.
    grid: Option<String>,

    /// Requested actions.
    actions: Actions,

    /// Root of the viewer sources (`indra/newview`).
    source_root: PathBuf,

    /// Root of the build output.
    build_root: PathBuf,

    /// Root of the staged destination tree.
    dest_root: PathBuf,

    /// Vendor branding.
    branding: Branding,
}

impl BuildMetadata {
    /// Returns the full channel name.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Returns the channel suffix, if any.
    pub fn channel_suffix(&self) -> Option<&str> {
        self.channel_suffix.as_deref()
    }

    /// Returns the version components.
    pub fn version(&self) -> &[u32] {
        &self.version
    }

    /// Returns the platform/architecture tag.
    pub fn target(&self) -> Target {
        self.target
    }

    /// Returns the target platform.
    pub fn platform(&self) -> Platform {
        self.target.platform
    }

    /// Returns the target architecture.
    pub fn arch(&self) -> Arch {
        self.target.arch
    }

    /// Returns the build configuration name.
    pub fn configuration(&self) -> &str {
        &self.configuration
    }

    /// Whether the build configuration is a debug one.
    pub fn is_debug_configuration(&self) -> bool {
        self.configuration.eq_ignore_ascii_case("debug")
    }

    /// Returns the build type.
    pub fn build_type(&self) -> &BuildType {
        &self.build_type
    }

    /// Whether this is a release build.
    pub fn is_release(&self) -> bool {
        self.build_type.is_release()
    }

    /// Returns the grid, if given.
    pub fn grid(&self) -> Option<&str> {
        self.grid.as_deref()
    }

    /// Returns the requested actions.
    pub fn actions(&self) -> &Actions {
        &self.actions
    }

    /// Returns the vendor branding.
    pub fn branding(&self) -> &Branding {
        &self.branding
    }

    /// Returns the source root.
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Returns the build root.
    pub fn build_root(&self) -> &Path {
        &self.build_root
    }

    /// Returns the destination root.
    pub fn dest_root(&self) -> &Path {
        &self.dest_root
    }

    /// Resolves `relative` under the source root.
    pub fn src_path_of(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.source_root.join(relative)
    }

    /// Resolves `relative` under the build root.
    pub fn build_path_of(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.build_root.join(relative)
    }

    /// Resolves `relative` under the destination root.
    pub fn dst_path_of(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.dest_root.join(relative)
    }

    /// Creates a new BuildMetadata instance (used by BuildMetadataBuilder).
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        channel: String,
        channel_suffix: Option<String>,
        version: Vec<u32>,
        target: Target,
        configuration: String,
        build_type: BuildType,
        grid: Option<String>,
        actions: Actions,
        roots: (PathBuf, PathBuf, PathBuf),
        branding: Branding,
    ) -> Self {
        let (source_root, build_root, dest_root) = roots;
        Self {
            channel,
            channel_suffix,
            version,
            target,
            configuration,
            build_type,
            grid,
            actions,
            source_root,
            build_root,
            dest_root,
            branding,
        }
    }
}
