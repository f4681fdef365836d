//! Relative symlinks from private bundle resources to shared libraries.
//!
//! Shared libraries are copied once into a common directory; each helper
//! bundle that needs them gets a relative link per library, so the whole
//! tree can be moved without breaking them.

use crate::bundler::{
    error::{Error, ErrorExt, Result},
    utils::fs::symlink_file,
};
use std::{
    io,
    path::{Component, Path, PathBuf},
};

/// Computes the path of `to` relative to the directory `from`.
///
/// Both paths are compared lexically component by component; they must be
/// expressed against the same base (both absolute, or both relative to the
/// same directory).
///
/// ```
/// use std::path::Path;
/// use viewer_packager::bundler::symlink::relative_path;
///
/// let rel = relative_path(
///     Path::new("/pkg/Contents/Resources/SLPlugin.app/Contents/Resources"),
///     Path::new("/pkg/Contents/Resources/libortp.dylib"),
/// );
/// assert_eq!(rel, Path::new("../../../libortp.dylib"));
/// ```
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from: Vec<Component<'_>> = from
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    let to: Vec<Component<'_>> = to
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..from.len() {
        rel.push("..");
    }
    for component in &to[common..] {
        rel.push(component.as_os_str());
    }
    rel
}

/// What [`link_shared_files`] did for one name.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LinkAction {
    /// A new link was created
    Created,
    /// A stale link was replaced
    Replaced,
    /// The correct link was already in place
    Unchanged,
}

/// Creates `target_dir/<name>` -> relative path to `shared_dir/<name>` for each name.
///
/// Idempotent: a link that already points at the right relative target is
/// left alone, and a symlink pointing anywhere else is replaced. Anything
/// else occupying the path is a [`Error::SymlinkConflict`].
pub async fn link_shared_files<S: AsRef<str>>(
    target_dir: &Path,
    shared_dir: &Path,
    names: &[S],
) -> Result<Vec<LinkAction>> {
    tokio::fs::create_dir_all(target_dir)
        .await
        .fs_context("creating link directory", target_dir)?;

    let mut actions = Vec::with_capacity(names.len());
    for name in names {
        let name = name.as_ref();
        let link = target_dir.join(name);
        let wanted = relative_path(target_dir, &shared_dir.join(name));
        let action = place_link(&link, &wanted).await?;
        log::debug!("{:?} {} -> {}", action, link.display(), wanted.display());
        actions.push(action);
    }
    Ok(actions)
}

async fn place_link(link: &Path, wanted: &Path) -> Result<LinkAction> {
    let conflict = |reason: String| Error::SymlinkConflict {
        link: link.to_path_buf(),
        reason,
    };

    let action = match tokio::fs::symlink_metadata(link).await {
        Err(e) if e.kind() == io::ErrorKind::NotFound => LinkAction::Created,
        Err(e) => return Err(conflict(e.to_string())),
        Ok(meta) if meta.file_type().is_symlink() => {
            let current = tokio::fs::read_link(link)
                .await
                .map_err(|e| conflict(e.to_string()))?;
            if current.as_path() == wanted {
                return Ok(LinkAction::Unchanged);
            }
            tokio::fs::remove_file(link)
                .await
                .map_err(|e| conflict(format!("cannot remove stale link: {}", e)))?;
            LinkAction::Replaced
        }
        Ok(meta) if meta.is_dir() => return Err(conflict("a directory is in the way".into())),
        Ok(_) => return Err(conflict("a regular file is in the way".into())),
    };

    symlink_file(wanted, link).map_err(|e| conflict(e.to_string()))?;
    Ok(action)
}
