//! DMG template directory lookup.
//!
//! Each channel may ship its own Finder layout under
//! `installers/darwin/<channel>-dmg`; everything else falls back to the
//! release layout.

use crate::bundler::{
    error::{Error, Result},
    settings::BuildMetadata,
};
use std::path::{Path, PathBuf};

/// Template directory used when the channel has none of its own.
pub const FALLBACK_TEMPLATE: &str = "installers/darwin/release-dmg";

/// Resource file compiled by `Rez` into the `Applications` alias.
pub const APPLICATIONS_ALIAS: &str = "installers/darwin/release-dmg/Applications-alias.r";

/// Template file name and the name it takes on the volume.
const ASSETS: [(&str, &str); 3] = [
    ("_VolumeIcon.icns", ".VolumeIcon.icns"),
    ("background.jpg", "background.jpg"),
    ("_DS_Store", ".DS_Store"),
];

/// A validated template directory.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DmgTemplate {
    dir: PathBuf,
}

impl DmgTemplate {
    /// Template directory for `metadata`'s channel, relative to the source root.
    pub fn channel_dir(metadata: &BuildMetadata) -> PathBuf {
        let slug: String = metadata
            .channel()
            .split_whitespace()
            .collect::<String>()
            .to_lowercase();
        Path::new("installers/darwin").join(format!("{}-dmg", slug))
    }

    /// Finds the channel template (or the fallback) and checks its assets.
    ///
    /// # Errors
    ///
    /// [`Error::TemplateMissing`] naming the first absent directory or asset.
    pub fn resolve(metadata: &BuildMetadata) -> Result<Self> {
        let channel_dir = metadata.src_path_of(Self::channel_dir(metadata));
        let dir = if channel_dir.is_dir() {
            channel_dir
        } else {
            log::debug!(
                "No DMG template at {}; using {}",
                channel_dir.display(),
                FALLBACK_TEMPLATE
            );
            metadata.src_path_of(FALLBACK_TEMPLATE)
        };
        Self::from_dir(dir)
    }

    /// Validates an explicit template directory.
    pub fn from_dir(dir: PathBuf) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::TemplateMissing(dir));
        }
        for (name, _) in ASSETS {
            let asset = dir.join(name);
            if !asset.is_file() {
                return Err(Error::TemplateMissing(asset));
            }
        }
        Ok(Self { dir })
    }

    /// Template directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `(source, name on volume)` for each decorative asset.
    pub fn assets(&self) -> impl Iterator<Item = (PathBuf, &'static str)> + '_ {
        ASSETS
            .iter()
            .map(|(name, volume_name)| (self.dir.join(name), *volume_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::settings::{Arch, BuildMetadataBuilder, Platform};

    fn metadata(source: &Path, channel: &str) -> BuildMetadata {
        BuildMetadataBuilder::new()
            .platform(Platform::Darwin)
            .arch(Arch::Universal)
            .channel(channel)
            .version("1.8.7.6861")
            .configuration("Release")
            .source_root(source)
            .build_root("/b")
            .dest_root("/d")
            .build()
            .unwrap()
    }

    fn write_template(dir: &Path) {
        std::fs::create_dir_all(dir).unwrap();
        for (name, _) in ASSETS {
            std::fs::write(dir.join(name), b"x").unwrap();
        }
    }

    #[test]
    fn channel_slug_drops_whitespace() {
        let md = metadata(Path::new("/s"), "Singularity Beta");
        assert_eq!(
            DmgTemplate::channel_dir(&md),
            Path::new("installers/darwin/singularitybeta-dmg")
        );
    }

    #[test]
    fn prefers_channel_template() {
        let src = tempfile::tempdir().unwrap();
        write_template(&src.path().join("installers/darwin/singularitybeta-dmg"));
        write_template(&src.path().join(FALLBACK_TEMPLATE));

        let template = DmgTemplate::resolve(&metadata(src.path(), "Singularity Beta")).unwrap();
        assert!(template.dir().ends_with("singularitybeta-dmg"));
        let names: Vec<_> = template.assets().map(|(_, n)| n).collect();
        assert_eq!(names, vec![".VolumeIcon.icns", "background.jpg", ".DS_Store"]);
    }

    #[test]
    fn falls_back_to_release_layout() {
        let src = tempfile::tempdir().unwrap();
        write_template(&src.path().join(FALLBACK_TEMPLATE));

        let template = DmgTemplate::resolve(&metadata(src.path(), "Singularity Alpha")).unwrap();
        assert!(template.dir().ends_with("release-dmg"));
    }

    #[test]
    fn missing_asset_is_reported() {
        let src = tempfile::tempdir().unwrap();
        let dir = src.path().join(FALLBACK_TEMPLATE);
        write_template(&dir);
        std::fs::remove_file(dir.join("background.jpg")).unwrap();

        let err = DmgTemplate::resolve(&metadata(src.path(), "Singularity Release")).unwrap_err();
        match err {
            Error::TemplateMissing(path) => assert!(path.ends_with("background.jpg")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_directory_is_reported() {
        let src = tempfile::tempdir().unwrap();
        let err = DmgTemplate::resolve(&metadata(src.path(), "Singularity Release")).unwrap_err();
        assert!(matches!(err, Error::TemplateMissing(_)));
    }
}
