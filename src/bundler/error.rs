//! Error types for installer assembly.
//!
//! Provides contextual error chaining, filesystem-specific errors carrying the
//! offending path, and the packaging-specific failure classes:
//!
//! - **Missing required tool** ([`Error::ToolNotFound`]) aborts the builder.
//! - **Filesystem conflict** ([`Error::SymlinkConflict`], [`Error::PathEscape`])
//!   aborts the builder.
//! - **Template malformation** ([`Error::TemplateMissing`]) aborts the builder.
//! - **Signing failure** ([`Error::Sign`]) is only ever reported through
//!   [`SignOutcome`](crate::bundler::signing::SignOutcome), never raised past
//!   the signing agent.
//!
//! Missing *optional* components are not errors at all; they surface as
//! [`Presence::Absent`](crate::bundler::manifest::Presence).

use std::{
    fmt::Display,
    io,
    path::{self, PathBuf},
    process::ExitStatus,
};
use thiserror::Error as DeriveError;

/// Errors returned by the installer builders.
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum Error {
    /// Error with context. Created by the [`Context`] trait.
    #[error("{0}: {1}")]
    Context(String, Box<Self>),

    /// File system error with path context.
    ///
    /// Created by the [`ErrorExt`] trait's `fs_context` method.
    #[error("{context} {path}: {error}")]
    Fs {
        /// Context describing the operation (e.g., "copying shared library")
        context: &'static str,
        /// Path that was being accessed
        path: PathBuf,
        /// The underlying I/O error
        error: io::Error,
    },

    /// Child process could not be spawned.
    #[error("failed to run command {command}: {error}")]
    CommandFailed {
        /// Command that failed to execute
        command: String,
        /// The underlying error
        error: io::Error,
    },

    /// Child process ran but exited unsuccessfully.
    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        /// Tool name (e.g., "hdiutil")
        tool: String,
        /// Exit status reported by the OS
        status: ExitStatus,
        /// Captured standard error, trimmed
        stderr: String,
    },

    /// A tool the current builder cannot work without is not installed.
    #[error("required tool {tool} not found (searched: {})", display_paths(.searched))]
    ToolNotFound {
        /// Tool name
        tool: String,
        /// Locations that were checked, in order
        searched: Vec<PathBuf>,
    },

    /// A symlink could not be placed because something else occupies the path.
    #[error("cannot create symlink {link}: {reason}")]
    SymlinkConflict {
        /// Path where the link was to be created
        link: PathBuf,
        /// What was found in the way
        reason: String,
    },

    /// A manifest destination lies outside the destination root.
    #[error("{path} is not under the destination root {root}")]
    PathEscape {
        /// Offending destination path
        path: PathBuf,
        /// Root it was expected under
        root: PathBuf,
    },

    /// A packaging template directory or file is missing.
    #[error("packaging template missing: {0}")]
    TemplateMissing(PathBuf),

    /// A required (non-optional) runtime component is absent from the build output.
    #[error("required component missing from build output: {0}")]
    MissingComponent(PathBuf),

    /// Generic I/O error.
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// Error walking the staged tree.
    #[error("{0}")]
    WalkdirError(#[from] walkdir::Error),

    /// Path prefix stripping error.
    #[error("{0}")]
    StripError(#[from] path::StripPrefixError),

    /// Handlebars template rendering error.
    #[error("{0}")]
    HandleBarsError(#[from] handlebars::RenderError),

    /// Handlebars template parsing error.
    #[error("{0}")]
    Template(#[from] handlebars::TemplateError),

    /// JSON serialization/deserialization error.
    #[error("{0}")]
    JsonError(#[from] serde_json::error::Error),

    /// Regular expression error.
    #[error("{0}")]
    RegexError(#[from] regex::Error),

    /// Unsupported CPU architecture for the requested package.
    #[error("unsupported architecture: {0}")]
    ArchError(String),

    /// Code signing failed.
    #[error("failed to sign {0}")]
    Sign(String),

    /// Generic error with custom message.
    #[error("{0}")]
    GenericError(String),
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "PATH".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convenient type alias for Result.
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for adding context to errors.
///
/// Similar to `anyhow::Context` but integrated with the bundler's Error type.
/// Works with both `Result<T, E>` and `Option<T>`.
pub trait Context<T> {
    /// Add context to an error.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Add context to an error using a closure (lazy evaluation).
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context(f().to_string(), Box::new(e)))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Extension trait for filesystem operations with automatic path context.
pub trait ErrorExt<T> {
    /// Add filesystem context to an I/O error.
    ///
    /// The `context` should be a present-tense verb phrase describing the operation,
    /// e.g., "reading file", "creating directory", "copying binary".
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Macro for early return with error.
///
/// Converts the message into a [`Error::GenericError`] and returns immediately.
///
/// ```ignore
/// bail!("operation failed");
/// bail!("invalid value: {}", value);
/// ```
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::bundler::error::Error::GenericError($msg.into()))
    };
    ($err:expr $(,)?) => {
        return Err($crate::bundler::error::Error::GenericError($err.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::bundler::error::Error::GenericError(format!($fmt, $($arg)*)))
    };
}
