//! Target platform and CPU architecture tags.

use std::fmt;
use std::str::FromStr;

/// CPU architecture of the packaged build.
///
/// The string forms match the architecture names used in installer file names
/// (`Singularity_1_8_7_6861_x86_64_Setup.exe`).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arch {
    /// 32-bit Intel
    I686,
    /// 64-bit Intel / AMD64
    X86_64,
    /// macOS universal binary
    Universal,
}

impl Arch {
    /// Name used in artifact file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::I686 => "i686",
            Arch::X86_64 => "x86_64",
            Arch::Universal => "universal",
        }
    }

    /// Whether this is a 64-bit target.
    pub fn is_64bit(&self) -> bool {
        matches!(self, Arch::X86_64)
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "i686" | "i386" | "x86" => Ok(Arch::I686),
            "x86_64" | "x64" | "amd64" => Ok(Arch::X86_64),
            "universal" => Ok(Arch::Universal),
            other => Err(format!(
                "unknown architecture '{}' (expected i686, x86_64 or universal)",
                other
            )),
        }
    }
}

/// Operating system the installer is assembled for.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Platform {
    /// NSIS `.exe` installer
    Windows,
    /// Compressed `.dmg` disk image
    Darwin,
    /// `.tar.xz` archive of a permission-normalized tree
    Linux,
}

impl Platform {
    /// Short lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Darwin => "darwin",
            Platform::Linux => "linux",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "windows" | "win32" | "win" => Ok(Platform::Windows),
            "darwin" | "macos" | "mac" => Ok(Platform::Darwin),
            "linux" => Ok(Platform::Linux),
            other => Err(format!(
                "unknown platform '{}' (expected windows, darwin or linux)",
                other
            )),
        }
    }
}

/// The `{platform, architecture}` pair that selects builder behavior.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Target {
    /// Operating system
    pub platform: Platform,
    /// CPU architecture
    pub arch: Arch,
}

impl Target {
    /// Creates a new target tag.
    pub fn new(platform: Platform, arch: Arch) -> Self {
        Self { platform, arch }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.platform, self.arch)
    }
}
