//! NSIS installer build execution.
//!
//! Compiles NSI scripts into Windows installer executables using makensis.

use crate::bundler::{error::Result, utils::process};
use std::path::Path;
use tokio::process::Command;

/// Run makensis to compile the NSI script into the installer executable.
///
/// The installer name comes from the script's `INSTOUTFILE` define, and
/// relative output paths resolve against the script's directory.
pub async fn run_makensis(makensis: &Path, nsi_path: &Path) -> Result<()> {
    log::info!("Running makensis on {}", nsi_path.display());

    let mut command = Command::new(makensis);
    command.args(["-V3", "-INPUTCHARSET", "UTF8"]).arg(nsi_path);
    if let Some(dir) = nsi_path.parent() {
        command.current_dir(dir);
    }

    let output = process::run_command("makensis", &mut command).await?;
    log::debug!("makensis output:\n{}", output.stdout.trim_end());
    Ok(())
}
