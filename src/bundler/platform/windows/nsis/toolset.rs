//! NSIS toolset location.
//!
//! Locates the Unicode build of makensis: `PATH` first, then the standard
//! NSIS install directories under `%ProgramFiles%` and `%ProgramFiles(X86)%`.

use crate::bundler::{builder::find_tool, error::Result};
use std::path::PathBuf;

/// Well-known makensis locations, given an environment lookup.
pub fn makensis_candidates<F>(var: F) -> Vec<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let mut candidates = Vec::new();
    for (root_var, subdir) in [
        ("ProgramFiles", "NSIS\\Unicode"),
        ("ProgramFiles(X86)", "NSIS\\Unicode"),
        ("ProgramFiles", "NSIS"),
        ("ProgramFiles(X86)", "NSIS"),
    ] {
        if let Some(root) = var(root_var).filter(|r| !r.is_empty()) {
            candidates.push(PathBuf::from(format!("{}\\{}\\makensis.exe", root, subdir)));
        }
    }
    candidates
}

/// Locates makensis.
///
/// # Errors
///
/// [`Error::ToolNotFound`](crate::bundler::Error::ToolNotFound) when no
/// candidate exists.
pub fn find_makensis() -> Result<PathBuf> {
    let path = find_tool(
        "makensis",
        &makensis_candidates(|name| std::env::var(name).ok()),
    )?;
    log::info!("Using makensis at {}", path.display());
    Ok(path)
}
