//! Install and uninstall command blocks from the file-copy log.
//!
//! Staged files are turned into `/`-separated paths relative to the
//! destination root, ordered deepest directory first (ties broken by
//! ascending path) and de-duplicated, so the output is identical for any
//! ordering of the log.
//!
//! - Install: `SetOutPath` whenever the parent directory changes, then one
//!   `File` per staged file.
//! - Uninstall: one `Delete` per file, then one `RMDir` per directory in the
//!   ancestor closure of every parent, deepest first. `RMDir` without `/r`
//!   leaves non-empty directories (user data) in place.

use super::utils::{instdir_path, windows_path};
use crate::bundler::{
    error::{Error, Result},
    manifest::Manifest,
};
use std::{
    cmp::Ordering,
    fmt::Write as _,
    path::{Component, Path},
};

/// Rendered `%%INSTALL_FILES%%` and `%%DELETE_FILES%%` blocks.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct FileCommands {
    /// `SetOutPath` / `File` lines
    pub install: String,
    /// `Delete` / `RMDir` lines
    pub uninstall: String,
}

impl FileCommands {
    /// Builds both blocks from the included, regular-file entries of `manifest`.
    pub fn from_manifest(manifest: &Manifest, dest_root: &Path) -> Result<Self> {
        let staged = manifest
            .records()
            .iter()
            .filter(|r| r.included && r.destination.is_file())
            .map(|r| r.destination.as_path());
        Self::from_destinations(dest_root, staged)
    }

    /// Builds both blocks from absolute destination paths under `dest_root`.
    pub fn from_destinations<'a, I>(dest_root: &Path, destinations: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Path>,
    {
        let files = sorted_unique(relative_destinations(dest_root, destinations)?);
        Ok(Self {
            install: install_commands(dest_root, &files),
            uninstall: uninstall_commands(&files),
        })
    }
}

/// Converts destinations to `/`-joined paths relative to `dest_root`.
///
/// # Errors
///
/// [`Error::PathEscape`] for a destination outside `dest_root`.
pub fn relative_destinations<'a, I>(dest_root: &Path, destinations: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = &'a Path>,
{
    destinations
        .into_iter()
        .map(|destination| {
            let escape = || Error::PathEscape {
                path: destination.to_path_buf(),
                root: dest_root.to_path_buf(),
            };
            let relative = destination.strip_prefix(dest_root).map_err(|_| escape())?;

            let mut parts = Vec::new();
            for component in relative.components() {
                match component {
                    Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
                    Component::CurDir => {}
                    _ => return Err(escape()),
                }
            }
            if parts.is_empty() {
                return Err(escape());
            }
            Ok(parts.join("/"))
        })
        .collect()
}

/// Number of path components; the root itself has depth 0.
fn depth(relative: &str) -> usize {
    if relative.is_empty() {
        0
    } else {
        relative.matches('/').count() + 1
    }
}

/// Deepest first, then ascending path.
fn deepest_first(a: &String, b: &String) -> Ordering {
    depth(b).cmp(&depth(a)).then_with(|| a.cmp(b))
}

/// Sorts deepest first (ties ascending) and removes duplicates.
pub fn sorted_unique(mut paths: Vec<String>) -> Vec<String> {
    paths.sort_by(deepest_first);
    paths.dedup();
    paths
}

fn parent_of(relative: &str) -> &str {
    relative.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
}

/// The directory and each of its ancestors, excluding the root unless the
/// directory is the root itself.
fn ancestors(dir: &str) -> Vec<String> {
    if dir.is_empty() {
        return vec![String::new()];
    }
    let mut result = Vec::new();
    let mut current = dir;
    loop {
        result.push(current.to_string());
        match current.rsplit_once('/') {
            Some((parent, _)) => current = parent,
            None => break,
        }
    }
    result
}

/// `SetOutPath` / `File` block for files already in [`sorted_unique`] order.
pub fn install_commands(dest_root: &Path, files: &[String]) -> String {
    let root = windows_path(&dest_root.display().to_string());
    let mut out = String::new();
    let mut out_path: Option<&str> = None;

    for file in files {
        let parent = parent_of(file);
        if out_path != Some(parent) {
            let _ = writeln!(out, "SetOutPath \"{}\"", instdir_path(parent));
            out_path = Some(parent);
        }
        let _ = writeln!(out, "File \"{}\\{}\"", root, windows_path(file));
    }
    out
}

/// `Delete` / `RMDir` block for files already in [`sorted_unique`] order.
pub fn uninstall_commands(files: &[String]) -> String {
    let mut out = String::new();
    for file in files {
        let _ = writeln!(out, "Delete \"{}\"", instdir_path(file));
    }

    let dirs = sorted_unique(
        files
            .iter()
            .flat_map(|file| ancestors(parent_of(file)))
            .collect(),
    );
    for dir in &dirs {
        let _ = writeln!(out, "RMDir \"{}\"", instdir_path(dir));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn sorts_deepest_first_then_ascending() {
        let sorted = sorted_unique(rel(&["z.txt", "a/d.txt", "a/b/c.txt", "a/e/f.txt", "a/d.txt"]));
        assert_eq!(sorted, rel(&["a/b/c.txt", "a/e/f.txt", "a/d.txt", "z.txt"]));
    }

    #[test]
    fn groups_files_under_distinct_out_paths() {
        let files = sorted_unique(rel(&["a/b/c.txt", "a/d.txt", "a/e/f.txt"]));
        let install = install_commands(Path::new("/stage"), &files);
        assert_eq!(
            install,
            "SetOutPath \"$INSTDIR\\a\\b\"\n\
             File \"\\stage\\a\\b\\c.txt\"\n\
             SetOutPath \"$INSTDIR\\a\\e\"\n\
             File \"\\stage\\a\\e\\f.txt\"\n\
             SetOutPath \"$INSTDIR\\a\"\n\
             File \"\\stage\\a\\d.txt\"\n"
        );
    }

    #[test]
    fn removes_child_directories_before_parents() {
        let files = sorted_unique(rel(&["a/b/c.txt", "a/d.txt", "a/e/f.txt"]));
        let uninstall = uninstall_commands(&files);
        let rmdirs: Vec<_> = uninstall.lines().filter(|l| l.starts_with("RMDir")).collect();
        assert_eq!(
            rmdirs,
            vec![
                "RMDir \"$INSTDIR\\a\\b\"",
                "RMDir \"$INSTDIR\\a\\e\"",
                "RMDir \"$INSTDIR\\a\"",
            ]
        );
        assert_eq!(uninstall.lines().filter(|l| l.starts_with("Delete")).count(), 3);
    }

    #[test]
    fn root_level_file_removes_install_dir_last() {
        let files = sorted_unique(rel(&["viewer.exe", "a/x.dll"]));
        let uninstall = uninstall_commands(&files);
        assert_eq!(uninstall.lines().last(), Some("RMDir \"$INSTDIR\""));
    }

    #[test]
    fn intermediate_directories_without_files_are_removed() {
        let uninstall = uninstall_commands(&rel(&["a/b/c/d.txt"]));
        let rmdirs: Vec<_> = uninstall.lines().filter(|l| l.starts_with("RMDir")).collect();
        assert_eq!(rmdirs.len(), 3);
        assert_eq!(rmdirs[2], "RMDir \"$INSTDIR\\a\"");
    }

    #[test]
    fn destination_outside_root_is_rejected() {
        let err = relative_destinations(Path::new("/stage"), [Path::new("/elsewhere/x.dll")])
            .unwrap_err();
        assert!(matches!(err, Error::PathEscape { .. }));

        let err = relative_destinations(Path::new("/stage"), [Path::new("/stage/../x.dll")])
            .unwrap_err();
        assert!(matches!(err, Error::PathEscape { .. }));
    }
}
