//! Sparse image creation and mounting using hdiutil.

use crate::bundler::{
    error::{Error, Result},
    utils::{fs, process},
};
use regex::Regex;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Maximum size of the sparse image in megabytes.
pub const SPARSE_IMAGE_MEGABYTES: u32 = 700;

/// A privately attached image.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MountedVolume {
    /// Device node, e.g. `/dev/disk3`
    pub device: String,
    /// Mount point, e.g. `/Volumes/Singularity Installer`
    pub mount_point: PathBuf,
}

/// Creates an empty growable HFS+ image at `sparse`, replacing a stale one.
pub async fn create_sparse_image(sparse: &Path, volume_name: &str) -> Result<()> {
    fs::remove_file(sparse).await?;

    log::info!("Creating sparse image {}", sparse.display());
    let mut command = Command::new("hdiutil");
    command
        .arg("create")
        .arg(sparse)
        .args(["-volname", volume_name, "-fs", "HFS+", "-type", "SPARSE"])
        .args(["-megabytes", SPARSE_IMAGE_MEGABYTES.to_string().as_str()])
        .args(["-layout", "SPUD"]);
    process::run_command("hdiutil", &mut command).await?;
    Ok(())
}

/// Attaches `sparse` without showing it in the Finder.
pub async fn attach(sparse: &Path) -> Result<MountedVolume> {
    let mut command = Command::new("hdiutil");
    command.args(["attach", "-private"]).arg(sparse);
    let output = process::run_command("hdiutil", &mut command).await?;

    let volume = parse_attach_output(&output.stdout)?;
    log::info!(
        "Attached {} at {}",
        volume.device,
        volume.mount_point.display()
    );
    Ok(volume)
}

/// Extracts the whole-disk device node and the HFS mount point.
///
/// Partition nodes (`/dev/disk3s1`) are skipped for the device.
pub fn parse_attach_output(output: &str) -> Result<MountedVolume> {
    let device_re = Regex::new(r"/dev/disk([0-9]+)[^s]")?;
    let mount_re = Regex::new(r"HFS\s+(.+)")?;

    let device = device_re
        .find(output)
        .map(|m| m.as_str().trim().to_string())
        .ok_or_else(|| {
            Error::GenericError(format!("no device node in hdiutil output:\n{}", output))
        })?;
    let mount_point = mount_re
        .captures(output)
        .and_then(|c| c.get(1))
        .map(|m| PathBuf::from(m.as_str().trim()))
        .ok_or_else(|| {
            Error::GenericError(format!("no HFS mount point in hdiutil output:\n{}", output))
        })?;

    Ok(MountedVolume {
        device,
        mount_point,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATTACH_OUTPUT: &str = "/dev/disk3          \tGUID_partition_scheme          \t\n\
/dev/disk3s1        \tApple_HFS                      \t/Volumes/Singularity Installer\n";

    const HFS_OUTPUT: &str = "/dev/disk4\tApple_partition_scheme\t\n\
/dev/disk4s1\tApple_partition_map\t\n\
/dev/disk4s2\tApple_HFS\t/Volumes/Singularity Beta Installer\n";

    #[test]
    fn parses_device_and_mount_point() {
        let volume = parse_attach_output(ATTACH_OUTPUT).unwrap();
        assert_eq!(volume.device, "/dev/disk3");
        assert_eq!(
            volume.mount_point,
            PathBuf::from("/Volumes/Singularity Installer")
        );
    }

    #[test]
    fn skips_partition_nodes() {
        let volume = parse_attach_output(HFS_OUTPUT).unwrap();
        assert_eq!(volume.device, "/dev/disk4");
        assert_eq!(
            volume.mount_point,
            PathBuf::from("/Volumes/Singularity Beta Installer")
        );
    }

    #[test]
    fn missing_mount_point_is_an_error() {
        let err = parse_attach_output("/dev/disk2 \tGUID_partition_scheme\n").unwrap_err();
        assert!(err.to_string().contains("no HFS mount point"));
    }
}
