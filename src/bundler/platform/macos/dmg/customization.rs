//! Volume population and Finder attributes.
//!
//! Fills a mounted image with the app bundle and the template assets, then
//! sets the Finder flags that make the window look right:
//! - hidden bit (`V`) on the decorative assets
//! - alias and custom-icon bits (`AC`) on the `Applications` alias
//! - custom-icon bit (`C`) on the volume root

use super::{creation::MountedVolume, template::DmgTemplate};
use crate::bundler::{
    error::{Context, Result},
    utils::{fs, process},
};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Copies the app bundle and decorative assets onto the volume.
pub async fn populate_volume(
    volume: &MountedVolume,
    app_bundle: &Path,
    app_name: &str,
    template: &DmgTemplate,
) -> Result<()> {
    let staged_app = volume.mount_point.join(format!("{}.app", app_name));
    log::info!("Copying {} to {}", app_bundle.display(), staged_app.display());
    fs::copy_dir(app_bundle, &staged_app)
        .await
        .with_context(|| format!("copying app bundle into {}", volume.mount_point.display()))?;

    for (source, name) in template.assets() {
        let dest = volume.mount_point.join(name);
        log::debug!("Copying {} to {}", source.display(), dest.display());
        fs::copy_file(&source, &dest).await?;
    }
    Ok(())
}

/// Hides the assets, creates the `Applications` alias, and flags the volume icon.
pub async fn apply_finder_attributes(
    volume: &MountedVolume,
    template: &DmgTemplate,
    alias_source: &Path,
) -> Result<()> {
    for (_, name) in template.assets() {
        set_file_attributes("V", &volume.mount_point.join(name)).await?;
    }

    let alias = applications_alias(volume);
    let mut rez = Command::new("Rez");
    rez.arg(alias_source).arg("-o").arg(&alias);
    process::run_command("Rez", &mut rez)
        .await
        .context("creating Applications alias")?;

    set_file_attributes("AC", &alias).await?;
    set_file_attributes("C", &volume.mount_point).await?;
    Ok(())
}

/// Force-detaches the volume by device node.
pub async fn detach(volume: &MountedVolume) -> Result<()> {
    log::info!("Detaching {}", volume.device);
    process::run("hdiutil", ["detach", "-force", volume.device.as_str()]).await?;
    Ok(())
}

fn applications_alias(volume: &MountedVolume) -> PathBuf {
    volume.mount_point.join("Applications")
}

async fn set_file_attributes(attributes: &str, path: &Path) -> Result<()> {
    let mut command = Command::new("SetFile");
    command.args(["-a", attributes]).arg(path);
    process::run_command("SetFile", &mut command).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[tokio::test]
    async fn copies_bundle_and_assets() {
        let dir = tempfile::tempdir().unwrap();
        let template_dir = dir.path().join("release-dmg");
        std::fs::create_dir_all(&template_dir).unwrap();
        for name in ["_VolumeIcon.icns", "background.jpg", "_DS_Store"] {
            std::fs::write(template_dir.join(name), name).unwrap();
        }
        let template = DmgTemplate::from_dir(template_dir).unwrap();

        let bundle = dir.path().join("packaged");
        std::fs::create_dir_all(bundle.join("Contents/MacOS")).unwrap();
        std::fs::write(bundle.join("Contents/MacOS/Singularity"), b"bin").unwrap();

        let volume = MountedVolume {
            device: "/dev/disk9".into(),
            mount_point: dir.path().join("volume"),
        };
        std::fs::create_dir_all(&volume.mount_point).unwrap();

        populate_volume(&volume, &bundle, "Singularity", &template)
            .await
            .unwrap();

        let mount = &volume.mount_point;
        assert!(mount.join("Singularity.app/Contents/MacOS/Singularity").is_file());
        assert_eq!(
            std::fs::read_to_string(mount.join(".VolumeIcon.icns")).unwrap(),
            "_VolumeIcon.icns"
        );
        assert!(mount.join("background.jpg").is_file());
        assert!(mount.join(".DS_Store").is_file());
        assert_eq!(applications_alias(&volume), mount.join("Applications"));
    }
}
