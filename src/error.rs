//! Top-level error types for the packager binary.
//!
//! The CLI and configuration layer report through [`PackagerError`]; failures
//! inside installer assembly arrive wrapped as [`PackagerError::Bundler`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, PackagerError>;

/// Main error type for a packaging run
#[derive(Error, Debug)]
pub enum PackagerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors (file-copy log)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors (branding file)
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Installer assembly errors
    #[error("{0}")]
    Bundler(#[from] crate::bundler::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// A root directory given on the command line does not exist
    #[error("{argument} directory does not exist: {}", path.display())]
    MissingRoot {
        /// Flag name, e.g. "--build"
        argument: &'static str,
        /// Path given
        path: PathBuf,
    },

    /// A packaging step failed
    #[error("{step} failed: {reason}")]
    StepFailed {
        /// Step that failed, e.g. "construct"
        step: String,
        /// Reason for the error
        reason: String,
    },
}

impl PackagerError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            PackagerError::Cli(CliError::InvalidArguments { .. })
            | PackagerError::Cli(CliError::MissingRoot { .. }) => 2,
            _ => 1,
        }
    }
}
