//! Command line interface for the viewer packager.
//!
//! Parses the run metadata, loads the optional branding file and file-copy
//! log, looks up the signing identity, and drives the [`Packager`].

mod args;
mod output;

pub use args::Args;
pub use output::{OutputManager, format_size};

use crate::bundler::{Branding, Manifest, Packager, SigningIdentity};
use crate::error::{CliError, PackagerError, Result};
use anyhow::Context as _;

/// Main CLI entry point; returns the process exit code.
pub async fn run(args: Args) -> Result<i32> {
    let output = OutputManager::new(args.verbose, args.quiet);

    match execute(&args, &output).await {
        Ok(()) => Ok(0),
        Err(e) => {
            output.error(&e.to_string());
            Ok(e.exit_code())
        }
    }
}

async fn execute(args: &Args, output: &OutputManager) -> Result<()> {
    args.validate()?;

    let branding = match &args.branding {
        Some(path) => crate::metadata::load_branding(path)?,
        None => Branding::default(),
    };
    let metadata = args.build_metadata(branding)?;

    let manifest = match &args.manifest {
        Some(path) => Manifest::load(path)
            .await
            .with_context(|| format!("loading file-copy log {}", path.display()))?,
        None => Manifest::new(),
    };

    let identity = SigningIdentity::from_env(metadata.platform(), args.signature.as_deref());
    if identity.is_none() && metadata.actions().is_packaging() {
        output.warn("No signing credentials in the environment; artifacts will be unsigned")?;
    }

    output.section(&format!(
        "Packaging {} for {}",
        metadata.app_name(),
        metadata.target()
    ))?;
    output.verbose(&format!(
        "{} file-copy record(s); actions: {}",
        manifest.len(),
        metadata.actions()
    ))?;

    let packager = Packager::new(metadata, manifest, identity)?;
    let packaged = packager.run().await.map_err(|e| {
        PackagerError::Cli(CliError::StepFailed {
            step: "packaging".to_string(),
            reason: e.to_string(),
        })
    })?;

    match packaged {
        Some(packaged) => output.artifact(&packaged)?,
        None => output.success("Destination tree staged; no installer produced")?,
    }
    Ok(())
}
