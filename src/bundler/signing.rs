//! Code signing with bounded retry.
//!
//! The [`SigningAgent`] wraps one [`SignTool`] invocation per artifact with
//! the [`Backoff::SIGNING`] policy (3 attempts, 15s then 30s). It never
//! returns an error: a final failure comes back as [`SignOutcome::Failed`],
//! which callers log as a warning before continuing with the unsigned file.
//!
//! Identities come from the environment:
//!
//! - Windows: `VIEWER_SIGNING_PWD` plus the `--signature` key reference
//! - macOS: `VIEWER_SIGNING_PASSWORD`, `VIEWER_SIGNING_KEY` and `HOME`
//!   (keychain `~/Library/Keychains/viewer.keychain`)
//!
//! A missing password disables signing without error.

use crate::bundler::{
    error::{Error, Result},
    settings::Platform,
    utils::{
        process,
        retry::{Backoff, retry_with_backoff},
    },
};
use std::future::Future;
use std::path::{Path, PathBuf};

/// Default Authenticode timestamp server.
pub const DEFAULT_TIMESTAMP_URL: &str = "http://timestamp.comodoca.com/authenticode";

/// Credentials for one signing run. Absent identity means signing is disabled.
#[derive(Clone)]
pub struct SigningIdentity {
    /// Certificate subject name (Windows) or codesign identity (macOS)
    pub key_reference: String,
    /// Certificate or keychain password
    pub password: String,
    /// Authenticode timestamp server
    pub timestamp_url: Option<String>,
    /// Keychain holding the macOS identity
    pub keychain: Option<PathBuf>,
}

impl std::fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("key_reference", &self.key_reference)
            .field("password", &"<redacted>")
            .field("timestamp_url", &self.timestamp_url)
            .field("keychain", &self.keychain)
            .finish()
    }
}

impl SigningIdentity {
    /// Looks up the identity for `platform` in the process environment.
    pub fn from_env(platform: Platform, signature: Option<&str>) -> Option<Self> {
        Self::from_vars(platform, signature, |name| std::env::var(name).ok())
    }

    /// Looks up the identity using `var` as the environment.
    pub fn from_vars<F>(platform: Platform, signature: Option<&str>, var: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        match platform {
            Platform::Windows => {
                let Some(key_reference) = signature.filter(|s| !s.trim().is_empty()) else {
                    log::info!("No --signature given; skipping code signing");
                    return None;
                };
                let Some(password) = non_empty("VIEWER_SIGNING_PWD") else {
                    log::info!("VIEWER_SIGNING_PWD not set; skipping code signing");
                    return None;
                };
                Some(Self {
                    key_reference: key_reference.to_string(),
                    password,
                    timestamp_url: Some(
                        non_empty("VIEWER_SIGNING_TIMESTAMP_URL")
                            .unwrap_or_else(|| DEFAULT_TIMESTAMP_URL.to_string()),
                    ),
                    keychain: None,
                })
            }
            Platform::Darwin => {
                let Some(password) = non_empty("VIEWER_SIGNING_PASSWORD") else {
                    log::info!("VIEWER_SIGNING_PASSWORD not set; skipping code signing");
                    return None;
                };
                let Some(key_reference) = non_empty("VIEWER_SIGNING_KEY") else {
                    log::warn!("VIEWER_SIGNING_KEY not set; skipping code signing");
                    return None;
                };
                let home = non_empty("HOME")
                    .map(PathBuf::from)
                    .or_else(dirs::home_dir)?;
                Some(Self {
                    key_reference,
                    password,
                    timestamp_url: None,
                    keychain: Some(home.join("Library/Keychains/viewer.keychain")),
                })
            }
            Platform::Linux => None,
        }
    }
}

/// One signing attempt against an external tool.
pub trait SignTool {
    /// Signs `artifact` once.
    fn sign_once(&self, artifact: &Path) -> impl Future<Output = Result<()>>;
}

/// Result of a signing request.
#[derive(Debug)]
pub enum SignOutcome {
    /// Signed successfully
    Signed,
    /// Signing is disabled for this run
    Skipped,
    /// Every attempt failed; the artifact is left unsigned
    Failed(Error),
}

impl SignOutcome {
    /// Whether the artifact ended up signed.
    pub fn is_signed(&self) -> bool {
        matches!(self, SignOutcome::Signed)
    }

    /// Logs a failed outcome as a warning.
    pub fn warn_if_failed(&self) {
        if let SignOutcome::Failed(e) = self {
            log::warn!("{}; continuing unsigned", e);
        }
    }
}

/// Retrying front end for a [`SignTool`].
#[derive(Debug)]
pub struct SigningAgent<S> {
    signer: Option<S>,
    backoff: Backoff,
}

impl<S: SignTool> SigningAgent<S> {
    /// Creates an agent; `None` disables signing.
    pub fn new(signer: Option<S>) -> Self {
        Self {
            signer,
            backoff: Backoff::SIGNING,
        }
    }

    /// Agent that skips every request.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    /// Overrides the retry policy.
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Whether a signer is configured.
    pub fn is_enabled(&self) -> bool {
        self.signer.is_some()
    }

    /// Signs `artifact`, retrying per the backoff policy. Never fails.
    pub async fn sign(&self, artifact: &Path) -> SignOutcome {
        let Some(signer) = &self.signer else {
            log::debug!("Signing disabled; not signing {}", artifact.display());
            return SignOutcome::Skipped;
        };

        log::info!("Signing {}", artifact.display());
        let name = format!("signing {}", artifact.display());
        match retry_with_backoff(&self.backoff, &name, |_| signer.sign_once(artifact)).await {
            Ok(()) => SignOutcome::Signed,
            Err(e) => SignOutcome::Failed(Error::Context(
                Error::Sign(artifact.display().to_string()).to_string(),
                Box::new(e),
            )),
        }
    }
}

/// Windows Authenticode signing through `signtool`.
#[derive(Debug, Clone)]
pub struct AuthenticodeSigner {
    signtool: PathBuf,
    identity: SigningIdentity,
    description: String,
}

impl AuthenticodeSigner {
    /// Creates a signer; `description` is shown by Windows (the channel name).
    pub fn new(signtool: PathBuf, identity: SigningIdentity, description: impl Into<String>) -> Self {
        Self {
            signtool,
            identity,
            description: description.into(),
        }
    }

    /// Finds `signtool` on PATH; `None` (with a warning) when it is missing.
    pub fn locate(identity: SigningIdentity, description: impl Into<String>) -> Option<Self> {
        match which::which("signtool") {
            Ok(path) => Some(Self::new(path, identity, description)),
            Err(e) => {
                log::warn!("signtool not found ({}); binaries will not be signed", e);
                None
            }
        }
    }

    /// Arguments passed to signtool for `artifact`.
    pub fn arguments(&self, artifact: &Path) -> Vec<String> {
        let mut args = vec![
            "sign".to_string(),
            "/v".to_string(),
            "/n".to_string(),
            self.identity.key_reference.clone(),
            "/p".to_string(),
            self.identity.password.clone(),
            "/d".to_string(),
            self.description.clone(),
        ];
        if let Some(url) = &self.identity.timestamp_url {
            args.push("/t".to_string());
            args.push(url.clone());
        }
        args.push(artifact.display().to_string());
        args
    }
}

impl SignTool for AuthenticodeSigner {
    async fn sign_once(&self, artifact: &Path) -> Result<()> {
        process::run(&self.signtool, self.arguments(artifact)).await?;
        Ok(())
    }
}

/// macOS signing: unlock the keychain, then `codesign` the bundle.
///
/// Both steps form one attempt, so an unlock failure is retried too.
#[derive(Debug, Clone)]
pub struct CodesignSigner {
    identity: SigningIdentity,
}

impl CodesignSigner {
    /// Creates a signer for `identity`.
    pub fn new(identity: SigningIdentity) -> Self {
        Self { identity }
    }

    fn keychain(&self) -> Result<&Path> {
        self.identity
            .keychain
            .as_deref()
            .ok_or_else(|| Error::Sign("no keychain configured".into()))
    }

    /// Arguments for `security unlock-keychain`.
    pub fn unlock_arguments(&self) -> Result<Vec<String>> {
        Ok(vec![
            "unlock-keychain".to_string(),
            "-p".to_string(),
            self.identity.password.clone(),
            self.keychain()?.display().to_string(),
        ])
    }

    /// Arguments for `codesign` on `bundle`.
    pub fn codesign_arguments(&self, bundle: &Path) -> Result<Vec<String>> {
        Ok(vec![
            "--verbose".to_string(),
            "--force".to_string(),
            "--timestamp".to_string(),
            "--keychain".to_string(),
            self.keychain()?.display().to_string(),
            "-s".to_string(),
            self.identity.key_reference.clone(),
            "-f".to_string(),
            bundle.display().to_string(),
        ])
    }
}

impl SignTool for CodesignSigner {
    async fn sign_once(&self, artifact: &Path) -> Result<()> {
        process::run("security", self.unlock_arguments()?).await?;
        process::run("codesign", self.codesign_arguments(artifact)?).await?;
        Ok(())
    }
}
