//! Permission normalization for the staged tree.
//!
//! Build outputs often carry owner-only modes; the archive must be usable by
//! whoever unpacks it. Directories become 755 and owner-only files gain
//! group/other read (and execute where the owner had it). Any other mode is
//! left alone.

use crate::bundler::error::Result;
use std::path::Path;

/// Mode every directory is set to.
pub const DIRECTORY_MODE: u32 = 0o755;

/// Normalized permission bits for a regular file with permission bits `mode`.
pub fn normalize_mode(mode: u32) -> u32 {
    match mode & 0o7777 {
        0o700 => 0o755,
        0o500 => 0o555,
        0o600 => 0o644,
        0o400 => 0o444,
        other => other,
    }
}

/// Applies the directory and file rules below `root`, returning how many
/// entries changed. Symlinks are not followed or modified.
#[cfg(unix)]
pub async fn normalize_tree(root: &Path) -> Result<usize> {
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || normalize_tree_blocking(&root))
        .await
        .map_err(|e| crate::bundler::Error::GenericError(format!("permission task failed: {}", e)))?
}

#[cfg(not(unix))]
pub async fn normalize_tree(_root: &Path) -> Result<usize> {
    Ok(0)
}

#[cfg(unix)]
fn normalize_tree_blocking(root: &Path) -> Result<usize> {
    use crate::bundler::error::ErrorExt;
    use std::os::unix::fs::PermissionsExt;

    let mut changed = 0;
    for entry in walkdir::WalkDir::new(root).follow_links(false) {
        let entry = entry?;
        let file_type = entry.file_type();
        if file_type.is_symlink() {
            continue;
        }

        let metadata = entry.metadata()?;
        let current = metadata.permissions().mode() & 0o7777;
        let wanted = if file_type.is_dir() {
            DIRECTORY_MODE
        } else if file_type.is_file() {
            normalize_mode(current)
        } else {
            continue;
        };

        if wanted != current {
            std::fs::set_permissions(entry.path(), std::fs::Permissions::from_mode(wanted))
                .fs_context("setting permissions", entry.path())?;
            changed += 1;
        }
    }
    log::info!("Normalized permissions of {} entries under {}", changed, root.display());
    Ok(changed)
}
