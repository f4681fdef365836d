//! macOS disk image creator.
//!
//! Builds the drag-to-install image with the native hdiutil tool: a sparse
//! HFS+ image is mounted, filled with the app bundle and the channel's
//! Finder layout, then converted to a compressed read-only image.
//!
//! # Architecture
//!
//! - `template` - channel template lookup and validation
//! - `creation` - sparse image creation and attachment
//! - `customization` - volume population, Finder attributes, detach
//! - `conversion` - sparse to UDZO conversion

mod conversion;
mod creation;
mod customization;
pub mod template;

use crate::bundler::{
    error::{Error, Result},
    settings::BuildMetadata,
};
use std::path::{Path, PathBuf};

pub use creation::{MountedVolume, parse_attach_output};
pub use template::DmgTemplate;

/// Volume name shown in the Finder sidebar.
pub fn volume_name(metadata: &BuildMetadata) -> String {
    format!("{} Installer", metadata.app_name())
}

/// `(sparse image, final image)` paths in the build root.
pub fn image_paths(metadata: &BuildMetadata) -> (PathBuf, PathBuf) {
    let base = metadata.installer_base_name();
    (
        metadata.build_path_of(format!("{}.sparseimage", base)),
        metadata.build_path_of(format!("{}.dmg", base)),
    )
}

/// Packages `app_bundle` into a compressed disk image.
///
/// # Process
///
/// 1. Resolve the DMG template (missing is fatal)
/// 2. Create and privately attach a 700 MB sparse image
/// 3. Copy the bundle and template assets, set Finder attributes
/// 4. Detach, convert to UDZO, remove the sparse image
///
/// A failure between attach and detach leaves the sparse image (and
/// possibly the mount) in place for inspection.
///
/// # Returns
///
/// Path to `<installer base name>.dmg` in the build root.
pub async fn bundle_project(metadata: &BuildMetadata, app_bundle: &Path) -> Result<PathBuf> {
    log::info!("Creating disk image for {}", metadata.app_name());

    let template = DmgTemplate::resolve(metadata)?;
    let alias_source = metadata.src_path_of(template::APPLICATIONS_ALIAS);
    if !alias_source.is_file() {
        return Err(Error::TemplateMissing(alias_source));
    }

    let (sparse, dmg) = image_paths(metadata);
    creation::create_sparse_image(&sparse, &volume_name(metadata)).await?;

    let volume = creation::attach(&sparse).await?;
    customization::populate_volume(&volume, app_bundle, &metadata.app_name(), &template).await?;
    customization::apply_finder_attributes(&volume, &template, &alias_source).await?;
    customization::detach(&volume).await?;

    conversion::convert_to_compressed(&sparse, &dmg).await?;
    Ok(dmg)
}
