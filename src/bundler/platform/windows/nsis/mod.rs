//! Windows NSIS installer creation.
//!
//! Turns the file-copy log into install/uninstall command blocks, renders
//! them with the version and branding defines into the source tree's NSIS
//! template, and compiles the result with makensis.
//!
//! # Module Organization
//!
//! - `file_commands` - `SetOutPath`/`File` and `Delete`/`RMDir` blocks
//! - `script` - Template placeholder substitution
//! - `toolset` - makensis location
//! - `build` - makensis execution
//! - `utils` - Windows path formatting and BOM output

mod build;
pub mod file_commands;
pub mod script;
mod toolset;
pub mod utils;

pub use file_commands::FileCommands;
pub use script::installer_file_name;

use crate::bundler::{
    error::{Context, Error, Result},
    manifest::Manifest,
    settings::BuildMetadata,
};
use std::path::PathBuf;

/// Builds the NSIS installer for the staged tree.
///
/// # Process
///
/// 1. Locate makensis (missing is fatal)
/// 2. Generate file commands from the manifest
/// 3. Render the installer template next to the staged files
/// 4. Compile with makensis
///
/// # Returns
///
/// Path to `<installer base name>_Setup.exe` in the destination root.
pub async fn bundle_project(metadata: &BuildMetadata, manifest: &Manifest) -> Result<PathBuf> {
    log::info!("Building NSIS installer for {}", metadata.app_name());

    let makensis = toolset::find_makensis()?;

    let commands = FileCommands::from_manifest(manifest, metadata.dest_root())
        .context("generating NSIS file commands")?;

    let nsi_path = script::generate_nsi_script(metadata, &commands, metadata.dest_root()).await?;

    build::run_makensis(&makensis, &nsi_path)
        .await
        .context("compiling NSIS installer")?;

    let installer_path = metadata.dst_path_of(installer_file_name(metadata));
    if !installer_path.is_file() {
        return Err(Error::GenericError(format!(
            "makensis succeeded but {} was not created",
            installer_path.display()
        )));
    }

    log::info!("✓ Created NSIS installer: {}", installer_path.display());
    Ok(installer_path)
}
