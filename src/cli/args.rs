//! Command line argument parsing and validation.
//!
//! Every run-metadata flag can also come from a `VIEWER_*` environment
//! variable, which is how build scripts usually drive the packager.

use crate::bundler::{Actions, Arch, BuildMetadata, BuildMetadataBuilder, Platform};
use crate::error::{CliError, Result};
use clap::Parser;
use std::path::PathBuf;

/// Viewer installer packager
#[derive(Parser, Debug)]
#[command(
    name = "viewer_packager",
    version,
    disable_version_flag = true,
    args_override_self = true,
    about = "Assembles signed viewer installers (NSIS, DMG, tar.xz) from a staged build tree",
    long_about = "Replays the staged file-copy log into the destination tree, stages the \
platform runtime files, and (with the package action) produces the installer.

Usage:
  viewer_packager --platform linux --arch x86_64 --channel \"Singularity Release\" \\
      --version 1.8.7.6861 --configuration Release \\
      --source indra/newview --build build/newview --dest build/newview/packaged

Exit code 0 = the tree is staged and, when packaging, the installer exists."
)]
pub struct Args {
    /// Target platform: windows, darwin or linux
    #[arg(long, env = "VIEWER_PLATFORM", value_name = "PLATFORM")]
    pub platform: Platform,

    /// Target architecture: i686, x86_64 or universal
    #[arg(long, env = "VIEWER_ARCH", value_name = "ARCH")]
    pub arch: Arch,

    /// Full channel name, e.g. "Singularity Beta"
    #[arg(long, env = "VIEWER_CHANNEL")]
    pub channel: String,

    /// Extra suffix for the installer name
    #[arg(long, env = "VIEWER_CHANNEL_SUFFIX")]
    pub channel_suffix: Option<String>,

    /// Dotted version, e.g. 1.8.7.6861
    #[arg(long = "version", env = "VIEWER_VERSION", value_name = "VERSION")]
    pub viewer_version: String,

    /// Build configuration directory (Debug, RelWithDebInfo, Release)
    #[arg(long, env = "VIEWER_CONFIGURATION")]
    pub configuration: String,

    /// Build type; only Release builds are stripped and archived
    #[arg(long, env = "VIEWER_BUILD_TYPE", default_value = "Release")]
    pub build_type: String,

    /// Grid the build targets
    #[arg(long, env = "VIEWER_GRID")]
    pub grid: Option<String>,

    /// Comma separated actions: package, unpacked, copy
    #[arg(
        long,
        env = "VIEWER_ACTIONS",
        default_value = "copy,unpacked,package",
        value_parser = Actions::parse_list
    )]
    pub actions: Actions,

    /// Viewer source directory (indra/newview)
    #[arg(long, env = "VIEWER_SOURCE", value_name = "DIR")]
    pub source: PathBuf,

    /// Build output directory
    #[arg(long, env = "VIEWER_BUILD", value_name = "DIR")]
    pub build: PathBuf,

    /// Destination (staging) directory
    #[arg(long, env = "VIEWER_DEST", value_name = "DIR")]
    pub dest: PathBuf,

    /// JSON file-copy log produced by the staging step
    #[arg(long, env = "VIEWER_MANIFEST", value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// TOML branding file
    #[arg(long, env = "VIEWER_BRANDING", value_name = "FILE")]
    pub branding: Option<PathBuf>,

    /// Authenticode certificate subject (Windows signing)
    #[arg(long, env = "VIEWER_SIGNATURE")]
    pub signature: Option<String>,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show debug output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Checks values clap cannot: non-empty channel and action list, existing roots.
    ///
    /// The destination root is created on demand and is not checked.
    pub fn validate(&self) -> Result<()> {
        if self.channel.trim().is_empty() {
            return Err(CliError::InvalidArguments {
                reason: "--channel must not be empty".to_string(),
            }
            .into());
        }
        if self.actions.iter().next().is_none() {
            return Err(CliError::InvalidArguments {
                reason: "--actions must name at least one of package, unpacked, copy".to_string(),
            }
            .into());
        }
        for (argument, path) in [("--source", &self.source), ("--build", &self.build)] {
            if !path.is_dir() {
                return Err(CliError::MissingRoot {
                    argument,
                    path: path.clone(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Builds the run metadata.
    pub fn build_metadata(&self, branding: crate::bundler::Branding) -> Result<BuildMetadata> {
        let mut builder = BuildMetadataBuilder::new()
            .platform(self.platform)
            .arch(self.arch)
            .channel(&self.channel)
            .version(&self.viewer_version)
            .configuration(&self.configuration)
            .build_type(&self.build_type)
            .actions(self.actions.iter())
            .source_root(&self.source)
            .build_root(&self.build)
            .dest_root(&self.dest)
            .branding(branding);
        if let Some(suffix) = &self.channel_suffix {
            builder = builder.channel_suffix(suffix);
        }
        if let Some(grid) = &self.grid {
            builder = builder.grid(grid);
        }
        Ok(builder.build()?)
    }

    /// Default log filter for the requested verbosity.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::Action;

    fn parse(extra: &[&str]) -> std::result::Result<Args, clap::Error> {
        let mut argv = vec![
            "viewer_packager",
            "--platform",
            "linux",
            "--arch",
            "x86_64",
            "--channel",
            "Singularity Beta",
            "--version",
            "1.8.7.6861",
            "--configuration",
            "Release",
            "--source",
            "/s",
            "--build",
            "/b",
            "--dest",
            "/d",
        ];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv)
    }

    #[test]
    fn defaults_request_every_action() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.platform, Platform::Linux);
        assert_eq!(args.build_type, "Release");
        assert!(args.actions.contains(Action::Copy));
        assert!(args.actions.is_packaging());
        assert_eq!(args.log_filter(), "info");
    }

    #[test]
    fn parses_action_list() {
        let args = parse(&["--actions", "copy,unpacked"]).unwrap();
        assert!(!args.actions.is_packaging());
        assert!(args.actions.contains(Action::Unpacked));
        assert!(parse(&["--actions", "copy,deploy"]).is_err());
    }

    #[test]
    fn rejects_unknown_platform() {
        let err = Args::try_parse_from([
            "viewer_packager",
            "--platform",
            "beos",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("beos"));
    }

    #[test]
    fn metadata_carries_optional_fields() {
        let args = parse(&["--channel-suffix", "nightly", "--grid", "agni"]).unwrap();
        let md = args.build_metadata(Default::default()).unwrap();
        assert_eq!(md.channel_suffix(), Some("nightly"));
        assert_eq!(md.grid(), Some("agni"));
        assert_eq!(
            md.installer_base_name(),
            "Singularity_Beta_nightly_1_8_7_6861_x86_64"
        );
    }

    #[test]
    fn missing_build_root_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().to_str().unwrap();
        let args = parse(&["--source", source, "--build", "/nonexistent/build"]).unwrap();
        let err = args.validate().unwrap_err();
        assert!(err.to_string().contains("--build"));
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        assert!(parse(&["--quiet", "--verbose"]).is_err());
        assert_eq!(parse(&["-v"]).unwrap().log_filter(), "debug");
    }
}
