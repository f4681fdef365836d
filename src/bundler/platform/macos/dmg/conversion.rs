//! Sparse image to compressed image conversion.
//!
//! The sparse image stays writable so it can be populated while mounted;
//! the distributed image is the read-only UDZO conversion of it.

use crate::bundler::{
    error::Result,
    utils::{fs, process},
};
use std::path::Path;
use tokio::process::Command;

/// Converts `sparse` to a zlib level 9 UDZO image at `dmg`, then removes `sparse`.
///
/// A stale `dmg` is removed first since hdiutil refuses to overwrite it.
pub async fn convert_to_compressed(sparse: &Path, dmg: &Path) -> Result<()> {
    log::info!("Converting {} to {}", sparse.display(), dmg.display());
    fs::remove_file(dmg).await?;

    let mut command = Command::new("hdiutil");
    command
        .arg("convert")
        .arg(sparse)
        .args(["-format", "UDZO", "-imagekey", "zlib-level=9", "-o"])
        .arg(dmg);
    process::run_command("hdiutil", &mut command).await?;

    fs::remove_file(sparse).await?;
    log::info!("✓ Created compressed disk image: {}", dmg.display());
    Ok(())
}
