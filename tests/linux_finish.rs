//! Linux finishing steps against a real directory tree.
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use viewer_packager::bundler::Error;
use viewer_packager::bundler::platform::linux::archive::with_renamed;
use viewer_packager::bundler::platform::linux::permissions::{normalize_mode, normalize_tree};

fn mode_of(path: &Path) -> u32 {
    std::fs::metadata(path).unwrap().permissions().mode() & 0o7777
}

fn set_mode(path: &Path, mode: u32) {
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).unwrap();
}

#[tokio::test]
async fn archive_step_sees_the_installer_name() {
    let dir = tempfile::tempdir().unwrap();
    let staged = dir.path().join("packaged");
    let renamed = dir.path().join("Singularity_Release_1_8_7_6861_x86_64");
    std::fs::create_dir_all(staged.join("bin")).unwrap();

    let seen = with_renamed(&staged, &renamed, |path| async move {
        assert!(path.join("bin").is_dir());
        Ok(path.file_name().unwrap().to_string_lossy().into_owned())
    })
    .await
    .unwrap();

    assert_eq!(seen, "Singularity_Release_1_8_7_6861_x86_64");
    assert!(staged.join("bin").is_dir());
    assert!(!renamed.exists());
}

#[tokio::test]
async fn failed_archive_still_restores_the_tree() {
    let dir = tempfile::tempdir().unwrap();
    let staged = dir.path().join("packaged");
    let renamed = dir.path().join("Singularity_Release_1_8_7_6861_x86_64");
    std::fs::create_dir_all(&staged).unwrap();
    std::fs::write(staged.join("README.txt"), b"readme").unwrap();

    let err = with_renamed(&staged, &renamed, |_| async {
        Err::<(), _>(Error::GenericError("tar exited with status 2".into()))
    })
    .await
    .unwrap_err();

    assert!(err.to_string().contains("tar exited"));
    assert!(staged.join("README.txt").is_file());
    assert!(!renamed.exists());
}

#[tokio::test]
async fn tree_already_named_for_the_archive_is_kept() {
    let dir = tempfile::tempdir().unwrap();
    let staged = dir.path().join("Singularity_Release_1_8_7_6861_x86_64");
    std::fs::create_dir_all(staged.join("bin")).unwrap();
    std::fs::write(staged.join("bin/SLPlugin"), b"elf").unwrap();

    with_renamed(&staged, &staged, |path| async move {
        assert!(path.join("bin/SLPlugin").is_file());
        Ok(())
    })
    .await
    .unwrap();

    assert!(staged.join("bin/SLPlugin").is_file());
}

#[tokio::test]
async fn staged_tree_becomes_world_readable() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("packaged");
    let bin = root.join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    let exe = bin.join("SLPlugin");
    let data = root.join("featuretable.txt");
    let shared = root.join("lib.so");
    std::fs::write(&exe, b"elf").unwrap();
    std::fs::write(&data, b"table").unwrap();
    std::fs::write(&shared, b"elf").unwrap();
    set_mode(&exe, 0o700);
    set_mode(&data, 0o600);
    set_mode(&shared, 0o640);
    set_mode(&bin, 0o700);

    normalize_tree(&root).await.unwrap();

    assert_eq!(mode_of(&bin), 0o755);
    assert_eq!(mode_of(&exe), 0o755);
    assert_eq!(mode_of(&data), 0o644);
    assert_eq!(mode_of(&shared), 0o640);
    assert_eq!(normalize_tree(&root).await.unwrap(), 0);
}

#[test]
fn unlisted_modes_are_preserved() {
    for mode in [0o644, 0o755, 0o750, 0o4755] {
        assert_eq!(normalize_mode(mode), mode);
    }
}
