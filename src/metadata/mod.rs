//! Branding configuration loaded from TOML.
//!
//! ```toml
//! [branding]
//! vendor = "Singularity"
//! vendor_string = "Singularity Viewer Project"
//! url_name = "secondlife"
//! update_helper = "update_install"
//! ```
//!
//! Every key is optional; missing keys keep the built-in defaults. A file
//! without a `[branding]` table is read as the table itself.

use crate::bundler::Branding;
use crate::error::{CliError, PackagerError, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
struct BrandingFile {
    branding: Option<Branding>,
}

/// Loads branding from `path`.
pub fn load_branding(path: &Path) -> Result<Branding> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        PackagerError::Cli(CliError::InvalidArguments {
            reason: format!("cannot read branding file {}: {}", path.display(), e),
        })
    })?;
    parse_branding(&contents)
}

/// Parses branding from TOML text.
pub fn parse_branding(contents: &str) -> Result<Branding> {
    let file: BrandingFile = toml::from_str(contents)?;
    match file.branding {
        Some(branding) => Ok(branding),
        None => Ok(toml::from_str(contents)?),
    }
}
