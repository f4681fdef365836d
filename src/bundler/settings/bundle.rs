//! Branding configuration.

/// Vendor branding used in application names, installer names and NSIS defines.
///
/// # Configuration
///
/// Optionally loaded from a TOML file passed with `--branding`:
///
/// ```toml
/// [branding]
/// vendor = "Singularity"
/// vendor_string = "Singularity Viewer Project"
/// url_name = "secondlife"
/// update_helper = "update_install"
/// ```
#[derive(Debug, Clone, Eq, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct Branding {
    /// Vendor base name. Channel names start with it (`"Singularity Beta"`).
    ///
    /// Default: "Singularity"
    pub vendor: String,

    /// Publisher string shown by the Windows installer.
    ///
    /// Default: "Singularity Viewer Project"
    pub vendor_string: String,

    /// URL protocol name registered by the Windows installer.
    ///
    /// Default: "secondlife"
    pub url_name: String,

    /// Binary never stripped on Linux (it is replaced in place by the updater).
    ///
    /// Default: "update_install"
    pub update_helper: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            vendor: "Singularity".to_string(),
            vendor_string: "Singularity Viewer Project".to_string(),
            url_name: "secondlife".to_string(),
            update_helper: "update_install".to_string(),
        }
    }
}
