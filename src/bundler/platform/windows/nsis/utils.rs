//! NSIS utility functions.
//!
//! Helper functions for Windows path formatting, version defines and
//! BOM-prefixed script output.

use crate::bundler::{
    error::{ErrorExt, Result},
    settings::Arch,
};
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Converts `/` separators to `\` and drops a trailing separator.
pub fn windows_path(path: &str) -> String {
    let path = path.strip_suffix(['/', '\\']).unwrap_or(path);
    path.replace('/', "\\")
}

/// `$INSTDIR`-rooted Windows path for a `/`-separated relative path.
///
/// The empty path is `$INSTDIR` itself.
pub fn instdir_path(relative: &str) -> String {
    if relative.is_empty() {
        "$INSTDIR".to_string()
    } else {
        format!("$INSTDIR\\{}", windows_path(relative))
    }
}

/// `%%WIN64_BIN_BUILD%%` replacement for `arch`.
pub fn win64_define(arch: Arch) -> &'static str {
    if arch.is_64bit() {
        "!define WIN64_BIN_BUILD 1"
    } else {
        ""
    }
}

/// Write file with UTF-8 BOM (required by NSIS).
///
/// NSIS requires installer scripts to be encoded with UTF-8 BOM (byte order mark).
/// This function writes the BOM (EF BB BF) followed by the content.
pub async fn write_utf8_bom(path: &Path, content: &str) -> Result<()> {
    let mut file = tokio::fs::File::create(path)
        .await
        .fs_context("creating NSI script file", path)?;

    // Write UTF-8 BOM: EF BB BF
    file.write_all(&[0xEF, 0xBB, 0xBF])
        .await
        .fs_context("writing UTF-8 BOM", path)?;
    file.write_all(content.as_bytes())
        .await
        .fs_context("writing NSI content", path)?;
    file.flush().await.fs_context("flushing NSI file", path)?;

    Ok(())
}
