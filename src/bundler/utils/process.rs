//! External tool execution.
//!
//! Every external packaging tool (hdiutil, codesign, makensis, tar, strip...)
//! is awaited to completion and its exit status inspected here.

use crate::bundler::error::{Error, Result};
use std::ffi::OsStr;
use tokio::process::Command;

/// Captured output of a successful tool run.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// Standard output, lossily decoded
    pub stdout: String,
    /// Standard error, lossily decoded
    pub stderr: String,
}

/// Runs `command`, waiting for it to exit.
///
/// # Errors
///
/// - [`Error::CommandFailed`] if the process cannot be spawned
/// - [`Error::ToolFailed`] if it exits with a non-zero status
pub async fn run_command(tool: &str, command: &mut Command) -> Result<ToolOutput> {
    log::debug!("Running {:?}", command.as_std());

    let output = command.output().await.map_err(|error| Error::CommandFailed {
        command: tool.to_string(),
        error,
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        return Err(Error::ToolFailed {
            tool: tool.to_string(),
            status: output.status,
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(ToolOutput { stdout, stderr })
}

/// Runs `program` with `args`, naming errors after the program's file name.
pub async fn run<P, I, S>(program: P, args: I) -> Result<ToolOutput>
where
    P: AsRef<OsStr>,
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let program = program.as_ref();
    let tool = std::path::Path::new(program)
        .file_name()
        .unwrap_or(program)
        .to_string_lossy()
        .into_owned();
    let mut command = Command::new(program);
    command.args(args);
    run_command(&tool, &mut command).await
}

/// Runs `strip -S` on `binary`, keeping enough symbols for annotated backtraces.
pub async fn strip_debug_symbols(binary: &std::path::Path) -> Result<()> {
    log::debug!("Stripping {}", binary.display());
    let mut command = Command::new("strip");
    command.arg("-S").arg(binary);
    run_command("strip", &mut command).await?;
    Ok(())
}
