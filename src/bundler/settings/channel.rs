//! Channel-derived application and installer naming.

use super::BuildMetadata;
use std::fmt;

/// Release track derived from the channel name.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChannelType {
    /// Public release
    Release,
    /// Beta testing
    Beta,
    /// Alpha testing
    Alpha,
    /// Project viewer
    Project,
    /// Anything else
    Test,
}

impl ChannelType {
    /// Classifies a channel variant by its (case-insensitive) prefix.
    pub fn from_variant(variant: &str) -> Self {
        let variant = variant.trim().to_lowercase();
        if variant.starts_with("release") {
            ChannelType::Release
        } else if variant.starts_with("beta") {
            ChannelType::Beta
        } else if variant.starts_with("alpha") {
            ChannelType::Alpha
        } else if variant.starts_with("project") {
            ChannelType::Project
        } else {
            ChannelType::Test
        }
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChannelType::Release => "release",
            ChannelType::Beta => "beta",
            ChannelType::Alpha => "alpha",
            ChannelType::Project => "project",
            ChannelType::Test => "test",
        })
    }
}

fn underscored(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join("_")
}

impl BuildMetadata {
    /// Channel with the vendor base removed ("Singularity Beta" -> "Beta").
    pub fn channel_variant(&self) -> String {
        self.channel()
            .replace(self.branding().vendor.as_str(), "")
            .trim()
            .to_string()
    }

    /// Release track of this channel.
    pub fn channel_type(&self) -> ChannelType {
        ChannelType::from_variant(&self.channel_variant())
    }

    /// Underscore-joined suffix appended to the vendor name in installer names.
    ///
    /// Empty for the plain release channel; `_Beta`, `_Project_Foo` and so
    /// on otherwise, followed by `_<channel suffix>` when one was given.
    pub fn channel_variant_app_suffix(&self) -> String {
        let mut variant = self.channel_variant();
        if self.channel_type() == ChannelType::Release {
            variant = variant.replace("Release", "").trim().to_string();
        }

        let mut suffix = String::new();
        if !variant.is_empty() {
            suffix.push('_');
            suffix.push_str(&underscored(&variant));
        }
        if let Some(channel_suffix) = self.channel_suffix().filter(|s| !s.trim().is_empty()) {
            suffix.push('_');
            suffix.push_str(&underscored(channel_suffix));
        }
        suffix
    }

    /// Version components joined with `sep`.
    pub fn version_joined(&self, sep: &str) -> String {
        self.version()
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(sep)
    }

    /// All but the last version component joined with dots ("1.8.7").
    ///
    /// A single-component version has no short form and yields "".
    pub fn version_short(&self) -> String {
        let version = self.version();
        version[..version.len().saturating_sub(1)]
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Artifact base name, e.g. `Singularity_Beta_1_8_7_6861_x86_64`.
    pub fn installer_base_name(&self) -> String {
        format!(
            "{}{}_{}_{}",
            underscored(&self.branding().vendor),
            self.channel_variant_app_suffix(),
            self.version_joined("_"),
            self.arch()
        )
    }

    /// Human-facing application name ("Singularity" or "Singularity Beta").
    pub fn app_name(&self) -> String {
        let vendor = &self.branding().vendor;
        if self.channel_type() == ChannelType::Release {
            vendor.trim().to_string()
        } else {
            format!("{} {}", vendor, self.channel_variant())
                .trim()
                .to_string()
        }
    }

    /// Application name with all whitespace removed.
    pub fn app_name_oneword(&self) -> String {
        self.app_name().split_whitespace().collect()
    }

    /// Name of the primary Windows executable.
    pub fn final_exe(&self) -> String {
        format!("{}Viewer.exe", self.app_name_oneword())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::settings::{Arch, BuildMetadataBuilder, Platform};

    fn metadata(channel: &str, suffix: Option<&str>) -> BuildMetadata {
        let mut builder = BuildMetadataBuilder::new()
            .platform(Platform::Windows)
            .arch(Arch::X86_64)
            .channel(channel)
            .version("1.8.7.6861")
            .configuration("Release")
            .build_type("Release")
            .source_root("/src")
            .build_root("/build")
            .dest_root("/dst");
        if let Some(suffix) = suffix {
            builder = builder.channel_suffix(suffix);
        }
        builder.build().unwrap()
    }

    #[test]
    fn release_channel_names() {
        let m = metadata("Singularity Release", None);
        assert_eq!(m.channel_type(), ChannelType::Release);
        assert_eq!(m.app_name(), "Singularity");
        assert_eq!(m.channel_variant_app_suffix(), "");
        assert_eq!(m.installer_base_name(), "Singularity_1_8_7_6861_x86_64");
        assert_eq!(m.final_exe(), "SingularityViewer.exe");
    }

    #[test]
    fn beta_channel_names() {
        let m = metadata("Singularity Beta", None);
        assert_eq!(m.channel_type(), ChannelType::Beta);
        assert_eq!(m.app_name(), "Singularity Beta");
        assert_eq!(m.app_name_oneword(), "SingularityBeta");
        assert_eq!(m.installer_base_name(), "Singularity_Beta_1_8_7_6861_x86_64");
    }

    #[test]
    fn channel_suffix_only_affects_installer_name() {
        let m = metadata("Singularity Project Foo Bar", Some("extra pkg"));
        assert_eq!(m.channel_type(), ChannelType::Project);
        assert_eq!(m.channel_variant_app_suffix(), "_Project_Foo_Bar_extra_pkg");
        assert_eq!(m.app_name(), "Singularity Project Foo Bar");
    }

    #[test]
    fn unknown_variant_is_test() {
        assert_eq!(ChannelType::from_variant("Nightly"), ChannelType::Test);
        assert_eq!(ChannelType::from_variant(" ALPHA 2"), ChannelType::Alpha);
    }

    #[test]
    fn version_forms() {
        let m = metadata("Singularity Release", None);
        assert_eq!(m.version_short(), "1.8.7");
        assert_eq!(m.version_joined("."), "1.8.7.6861");
        assert_eq!(m.version_joined("-"), "1-8-7-6861");
    }

    #[test]
    fn single_component_version_has_empty_short_form() {
        let m = BuildMetadataBuilder::new()
            .platform(Platform::Linux)
            .arch(Arch::X86_64)
            .channel("Singularity Release")
            .version("7")
            .configuration("Release")
            .source_root("/src")
            .build_root("/build")
            .dest_root("/dst")
            .build()
            .unwrap();
        assert_eq!(m.version_short(), "");
        assert_eq!(m.version_joined("."), "7");
    }
}
