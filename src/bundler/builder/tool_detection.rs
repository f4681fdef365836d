//! External tool detection.
//!
//! Tools are looked up on `PATH` first, then in any well-known install
//! locations the caller supplies. A tool the builder cannot work without
//! surfaces as [`Error::ToolNotFound`] listing every location checked.

use crate::bundler::error::{Error, Result};
use std::path::PathBuf;

/// Locates `tool` on `PATH` or at one of `fallbacks`.
pub fn find_tool(tool: &str, fallbacks: &[PathBuf]) -> Result<PathBuf> {
    match which::which(tool) {
        Ok(path) => {
            log::debug!("Found {} at: {}", tool, path.display());
            return Ok(path);
        }
        Err(e) => log::debug!("{} not found in PATH: {}", tool, e),
    }

    if let Some(path) = fallbacks.iter().find(|p| p.is_file()) {
        log::debug!("Found {} at: {}", tool, path.display());
        return Ok(path.clone());
    }

    let mut searched = vec![PathBuf::from("PATH")];
    searched.extend(fallbacks.iter().cloned());
    Err(Error::ToolNotFound {
        tool: tool.to_string(),
        searched,
    })
}

/// Locates every tool in `tools` on `PATH`, failing on the first missing one.
pub fn require_tools<'a>(tools: impl IntoIterator<Item = &'a str>) -> Result<Vec<PathBuf>> {
    tools.into_iter().map(|tool| find_tool(tool, &[])).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tool_lists_fallbacks() {
        let fallback = PathBuf::from("/nonexistent/NSIS/makensis.exe");
        let err = find_tool("definitely-not-installed-tool", std::slice::from_ref(&fallback))
            .unwrap_err();
        match err {
            Error::ToolNotFound { tool, searched } => {
                assert_eq!(tool, "definitely-not-installed-tool");
                assert_eq!(searched, vec![PathBuf::from("PATH"), fallback]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn fallback_location_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("makensis.exe");
        std::fs::write(&tool, b"").unwrap();
        let found = find_tool("definitely-not-installed-tool", &[dir.path().join("nope"), tool.clone()])
            .unwrap();
        assert_eq!(found, tool);
    }
}
