//! Debug symbol stripping for release archives.

use crate::bundler::{error::Result, utils::process};
use std::path::{Path, PathBuf};

/// Library directories whose regular files are all stripped.
const LIBRARY_DIRS: &[&str] = &["lib", "lib32", "lib64"];

/// Files `strip -S` should process under `root`.
///
/// Every regular file under the library directories and every executable
/// regular file under `bin`, except files named `skip` (the update helper,
/// which is a script).
pub fn strip_candidates(root: &Path, skip: &str) -> Result<Vec<PathBuf>> {
    let mut candidates = Vec::new();
    for dir in LIBRARY_DIRS {
        collect(&root.join(dir), skip, false, &mut candidates)?;
    }
    collect(&root.join("bin"), skip, true, &mut candidates)?;
    Ok(candidates)
}

fn collect(dir: &Path, skip: &str, executable_only: bool, out: &mut Vec<PathBuf>) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    for entry in walkdir::WalkDir::new(dir).follow_links(false).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || entry.file_name() == skip {
            continue;
        }
        if executable_only && !is_executable(&entry.metadata()?) {
            continue;
        }
        out.push(entry.into_path());
    }
    Ok(())
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &std::fs::Metadata) -> bool {
    true
}

/// Strips every candidate under `root`, returning how many were processed.
pub async fn strip_tree(root: &Path, skip: &str) -> Result<usize> {
    let candidates = strip_candidates(root, skip)?;
    log::info!(
        "Stripping {} binaries under {}",
        candidates.len(),
        root.display()
    );
    for binary in &candidates {
        process::strip_debug_symbols(binary).await?;
    }
    Ok(candidates.len())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn file(path: &Path, mode: u32) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"x").unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).unwrap();
    }

    #[test]
    fn selects_libraries_and_executables() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        file(&root.join("lib/libllcommon.so"), 0o644);
        file(&root.join("lib64/libfmod.so"), 0o755);
        file(&root.join("lib/update_install"), 0o755);
        file(&root.join("bin/SLPlugin"), 0o755);
        file(&root.join("bin/update_install"), 0o755);
        file(&root.join("bin/launcher.cfg"), 0o644);
        file(&root.join("app_settings/settings.xml"), 0o755);
        std::os::unix::fs::symlink("libllcommon.so", root.join("lib/libllcommon.so.1")).unwrap();

        let candidates = strip_candidates(root, "update_install").unwrap();
        let relative: Vec<_> = candidates
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            relative,
            vec![
                PathBuf::from("lib/libllcommon.so"),
                PathBuf::from("lib64/libfmod.so"),
                PathBuf::from("bin/SLPlugin"),
            ]
        );
    }

    #[test]
    fn missing_directories_are_fine() {
        let dir = tempfile::tempdir().unwrap();
        assert!(strip_candidates(dir.path(), "update_install").unwrap().is_empty());
    }
}
