//! Tarball creation under the installer base name.
//!
//! tar records paths as given, so the staged directory is renamed to the
//! installer base name for the duration of the archive step and renamed back
//! afterwards.

use crate::bundler::{
    error::{Error, ErrorExt, Result},
    utils::{fs, process},
};
use std::{
    future::Future,
    path::{Path, PathBuf},
};
use tokio::process::Command;

/// How `from` and `to` relate before the archive rename.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum RenamePlan {
    /// Both name the same directory; archive in place
    InPlace,
    /// Distinct and unrelated; rename there and back
    Rename,
}

fn plan_rename(from: &Path, to: &Path) -> Result<RenamePlan> {
    let from_normalized = fs::normalize_lexically(from).fs_context("resolving path", from)?;
    let to_normalized = fs::normalize_lexically(to).fs_context("resolving path", to)?;

    let same = from_normalized == to_normalized
        || match (std::fs::canonicalize(from), std::fs::canonicalize(to)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        };
    if same {
        return Ok(RenamePlan::InPlace);
    }

    if from_normalized.starts_with(&to_normalized) || to_normalized.starts_with(&from_normalized) {
        return Err(Error::GenericError(format!(
            "cannot rename {} to {}: one directory contains the other",
            from.display(),
            to.display()
        )));
    }
    Ok(RenamePlan::Rename)
}

/// Renames `from` to `to`, runs `f` on the new path, and renames it back.
///
/// When `from` already is `to`, `f` runs on it directly. A `to` that
/// contains or sits inside `from` is refused before anything is touched;
/// any other existing `to` is a leftover from an earlier run and is
/// removed. The rename back happens whether or not `f` succeeds. If both
/// `f` and the rename back fail, the error from `f` is returned and the
/// rename failure is logged.
pub async fn with_renamed<F, Fut, T>(from: &Path, to: &Path, f: F) -> Result<T>
where
    F: FnOnce(PathBuf) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    if plan_rename(from, to)? == RenamePlan::InPlace {
        log::debug!("{} already carries the archive name", from.display());
        return f(from.to_path_buf()).await;
    }

    fs::remove_dir_all(to).await?;
    fs::rename(from, to).await?;

    let result = f(to.to_path_buf()).await;
    let restored = fs::rename(to, from).await;

    match (result, restored) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(rename_error)) => {
            log::error!(
                "Could not move {} back to {}: {}",
                to.display(),
                from.display(),
                rename_error
            );
            Err(e)
        }
    }
}

/// Creates `<parent>/<name>.tar.xz` from the directory `dir`.
///
/// `--numeric-owner` keeps the builder's user name out of the archive.
pub async fn create_tarball(dir: &Path) -> Result<PathBuf> {
    let (parent, name) = match (dir.parent(), dir.file_name()) {
        (Some(parent), Some(name)) => (parent, name),
        _ => {
            return Err(Error::GenericError(format!(
                "cannot archive {}: no parent directory",
                dir.display()
            )));
        }
    };
    let mut archive_name = name.to_os_string();
    archive_name.push(".tar.xz");
    let archive = parent.join(archive_name);

    log::info!("Creating {}", archive.display());
    let mut command = Command::new("tar");
    command
        .arg("-C")
        .arg(parent)
        .args(["--numeric-owner", "-cJf"])
        .arg(&archive)
        .arg(name);
    process::run_command("tar", &mut command).await?;
    Ok(archive)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn renames_back_after_success() {
        let dir = tempfile::tempdir().unwrap();
        let staged = dir.path().join("packaged");
        std::fs::create_dir_all(&staged).unwrap();
        std::fs::write(staged.join("a.txt"), b"a").unwrap();
        let renamed = dir.path().join("Singularity_1_0_0_1_x86_64");

        let seen = with_renamed(&staged, &renamed, |path| async move {
            Ok(path.join("a.txt").is_file())
        })
        .await
        .unwrap();

        assert!(seen);
        assert!(staged.join("a.txt").is_file());
        assert!(!renamed.exists());
    }

    #[tokio::test]
    async fn renames_back_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let staged = dir.path().join("packaged");
        std::fs::create_dir_all(&staged).unwrap();
        let renamed = dir.path().join("base");

        let err = with_renamed(&staged, &renamed, |_| async {
            Err::<(), _>(Error::GenericError("tar exploded".into()))
        })
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "tar exploded");
        assert!(staged.is_dir());
        assert!(!renamed.exists());
    }

    #[tokio::test]
    async fn same_directory_is_archived_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let staged = dir.path().join("Singularity_1_0_0_1_x86_64");
        std::fs::create_dir_all(&staged).unwrap();
        std::fs::write(staged.join("a.txt"), b"a").unwrap();
        let alias = dir.path().join("x/../Singularity_1_0_0_1_x86_64");

        let seen = with_renamed(&staged, &alias, |path| async move { Ok(path) })
            .await
            .unwrap();

        assert_eq!(seen, staged);
        assert!(staged.join("a.txt").is_file());
    }

    #[tokio::test]
    async fn nested_target_is_refused_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let staged = dir.path().join("packaged");
        std::fs::create_dir_all(staged.join("bin")).unwrap();
        std::fs::write(staged.join("bin/SLPlugin"), b"x").unwrap();

        for target in [staged.join("bin"), dir.path().to_path_buf()] {
            let err = with_renamed(&staged, &target, |_| async { Ok(()) })
                .await
                .unwrap_err();
            assert!(err.to_string().contains("contains the other"));
            assert!(staged.join("bin/SLPlugin").is_file());
        }
    }

    #[tokio::test]
    async fn stale_target_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let staged = dir.path().join("packaged");
        std::fs::create_dir_all(&staged).unwrap();
        std::fs::write(staged.join("new.txt"), b"n").unwrap();
        let renamed = dir.path().join("base");
        std::fs::create_dir_all(&renamed).unwrap();
        std::fs::write(renamed.join("old.txt"), b"o").unwrap();

        let names = with_renamed(&staged, &renamed, |path| async move {
            Ok((path.join("new.txt").is_file(), path.join("old.txt").exists()))
        })
        .await
        .unwrap();

        assert_eq!(names, (true, false));
        assert!(staged.join("new.txt").is_file());
        assert!(!renamed.exists());
    }

    #[tokio::test]
    async fn archive_path_sits_next_to_directory() {
        let err = create_tarball(Path::new("/")).await.unwrap_err();
        assert!(err.to_string().contains("no parent directory"));
    }
}
