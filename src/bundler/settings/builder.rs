//! Builder for constructing BuildMetadata.

use super::{Action, Actions, Arch, Branding, BuildMetadata, BuildType, Platform, Target};
use std::path::{Path, PathBuf};

/// Builder for constructing [`BuildMetadata`].
///
/// Provides a fluent API for building run metadata with validation.
///
/// # Examples
///
/// ```no_run
/// use viewer_packager::bundler::{Action, Arch, BuildMetadataBuilder, Platform};
///
/// # fn example() -> viewer_packager::bundler::Result<()> {
/// let metadata = BuildMetadataBuilder::new()
///     .platform(Platform::Windows)
///     .arch(Arch::I686)
///     .channel("Singularity Release")
///     .version("1.8.7.6861")
///     .configuration("RelWithDebInfo")
///     .build_type("Release")
///     .actions([Action::Package])
///     .source_root("indra/newview")
///     .build_root("build-vs2010/newview")
///     .dest_root("build-vs2010/newview/packaged")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct BuildMetadataBuilder {
    platform: Option<Platform>,
    arch: Option<Arch>,
    channel: Option<String>,
    channel_suffix: Option<String>,
    version: Option<String>,
    configuration: Option<String>,
    build_type: Option<String>,
    grid: Option<String>,
    actions: Option<Actions>,
    source_root: Option<PathBuf>,
    build_root: Option<PathBuf>,
    dest_root: Option<PathBuf>,
    branding: Branding,
}

impl BuildMetadataBuilder {
    /// Creates a new metadata builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the target platform.
    ///
    /// # Required
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Sets the target architecture.
    ///
    /// # Required
    pub fn arch(mut self, arch: Arch) -> Self {
        self.arch = Some(arch);
        self
    }

    /// Sets the full channel name.
    ///
    /// # Required
    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Sets the installer-name suffix.
    ///
    /// Default: None
    pub fn channel_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.channel_suffix = Some(suffix.into());
        self
    }

    /// Sets the dotted version string, e.g. "1.8.7.6861".
    ///
    /// # Required
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the build configuration.
    ///
    /// # Required
    pub fn configuration(mut self, configuration: impl Into<String>) -> Self {
        self.configuration = Some(configuration.into());
        self
    }

    /// Sets the build type.
    ///
    /// Default: "Release"
    pub fn build_type(mut self, build_type: impl Into<String>) -> Self {
        self.build_type = Some(build_type.into());
        self
    }

    /// Sets the grid.
    ///
    /// Default: None
    pub fn grid(mut self, grid: impl Into<String>) -> Self {
        self.grid = Some(grid.into());
        self
    }

    /// Sets the requested actions.
    ///
    /// Default: copy, unpacked and package
    pub fn actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.actions = Some(Actions::new(actions));
        self
    }

    /// Sets the source root.
    ///
    /// # Required
    pub fn source_root<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.source_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the build root.
    ///
    /// # Required
    pub fn build_root<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.build_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the destination root.
    ///
    /// # Required
    pub fn dest_root<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.dest_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets vendor branding.
    ///
    /// Default: [`Branding::default`]
    pub fn branding(mut self, branding: Branding) -> Self {
        self.branding = branding;
        self
    }

    /// Builds the metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is missing, the version has an
    /// empty or non-numeric component, or the channel is blank.
    pub fn build(self) -> crate::bundler::Result<BuildMetadata> {
        use crate::bundler::error::Context;

        let version_string = self.version.context("version is required")?;
        let version = parse_version(&version_string)?;

        let channel = self.channel.context("channel is required")?;
        if channel.trim().is_empty() {
            crate::bail!("channel must not be empty");
        }

        let target = Target::new(
            self.platform.context("platform is required")?,
            self.arch.context("arch is required")?,
        );

        let actions = self
            .actions
            .unwrap_or_else(|| Actions::new([Action::Copy, Action::Unpacked, Action::Package]));

        let build_type = BuildType::from(self.build_type.as_deref().unwrap_or("Release"));

        Ok(BuildMetadata::new(
            channel,
            self.channel_suffix.filter(|s| !s.trim().is_empty()),
            version,
            target,
            self.configuration.context("configuration is required")?,
            build_type,
            self.grid,
            actions,
            (
                self.source_root.context("source_root is required")?,
                self.build_root.context("build_root is required")?,
                self.dest_root.context("dest_root is required")?,
            ),
            self.branding,
        ))
    }
}

/// Splits a dotted version into numeric components.
fn parse_version(version: &str) -> crate::bundler::Result<Vec<u32>> {
    if version.trim().is_empty() {
        crate::bail!("version must not be empty");
    }
    version
        .trim()
        .split('.')
        .map(|part| {
            part.parse::<u32>().map_err(|_| {
                crate::bundler::Error::GenericError(format!(
                    "invalid version '{}': component '{}' is not a number",
                    version, part
                ))
            })
        })
        .collect()
}
