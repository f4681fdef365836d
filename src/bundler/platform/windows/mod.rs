//! Windows installer builder.
//!
//! `construct` stages the viewer executable under its branded name together
//! with the plugin host and the runtime DLLs from `../sharedlibs/<cfg>`.
//! `finish` signs the executables, compiles the NSIS script, and signs the
//! resulting installer.

pub mod nsis;

use super::{InstallerBuilder, RuntimeFile, Staging};
use crate::bundler::{
    ArtifactKind, InstallerArtifact,
    error::{Error, Result},
    settings::{Arch, BuildMetadata},
    signing::{AuthenticodeSigner, SigningAgent, SigningIdentity},
};
use std::path::PathBuf;

/// Voice, security and spelling runtimes shipped next to the viewer.
const REQUIRED_SHARED_LIBS: &[&str] = &[
    "SLVoice.exe",
    "vivoxsdk.dll",
    "ortp.dll",
    "libsndfile-1.dll",
    "zlib1.dll",
    "vivoxplatform.dll",
    "vivoxoal.dll",
    "ca-bundle.crt",
    "ssleay32.dll",
    "libeay32.dll",
    "libhunspell.dll",
];

/// Core library group and mesh LOD library; absent in static builds.
const OPTIONAL_SHARED_LIBS: &[&str] = &[
    "llcommon.dll",
    "libapr-1.dll",
    "libaprutil-1.dll",
    "libapriconv-1.dll",
    "glod.dll",
];

/// NSIS builder for Windows targets.
#[derive(Debug)]
pub struct WindowsBuilder {
    staging: Staging,
    signer: SigningAgent<AuthenticodeSigner>,
}

impl WindowsBuilder {
    /// Creates the builder; `identity` of `None` leaves every binary unsigned.
    ///
    /// # Errors
    ///
    /// [`Error::ArchError`] for universal targets.
    pub fn new(staging: Staging, identity: Option<SigningIdentity>) -> Result<Self> {
        if staging.metadata().arch() == Arch::Universal {
            return Err(Error::ArchError(
                "universal builds are only supported on darwin".into(),
            ));
        }
        let description = staging.metadata().channel().to_string();
        let signer = SigningAgent::new(
            identity.and_then(|identity| AuthenticodeSigner::locate(identity, description)),
        );
        Ok(Self { staging, signer })
    }

    /// Runtime files staged by `construct`, in staging order.
    pub fn runtime_files(metadata: &BuildMetadata) -> Vec<RuntimeFile> {
        let cfg = metadata.configuration();
        let debug = metadata.is_debug_configuration();
        let mut files = Vec::new();

        if metadata.actions().is_packaging() {
            files.push(RuntimeFile::required(
                metadata.build_path_of(PathBuf::from(cfg).join("singularity-bin.exe")),
                metadata.dst_path_of(metadata.final_exe()),
            ));
        }

        files.push(RuntimeFile::required(
            metadata.build_path_of(
                PathBuf::from("../llplugin/slplugin")
                    .join(cfg)
                    .join("SLPlugin.exe"),
            ),
            metadata.dst_path_of("SLPlugin.exe"),
        ));

        let shared = metadata.build_path_of(PathBuf::from("../sharedlibs").join(cfg));
        let mut optional: Vec<String> = OPTIONAL_SHARED_LIBS.iter().map(|s| s.to_string()).collect();
        optional.push(if debug {
            "libtcmalloc_minimal-debug.dll".to_string()
        } else {
            "libtcmalloc_minimal.dll".to_string()
        });
        optional.push(fmod_library(metadata.arch(), debug).to_string());
        files.extend(
            optional
                .iter()
                .map(|name| RuntimeFile::optional(shared.join(name), metadata.dst_path_of(name))),
        );
        files.extend(REQUIRED_SHARED_LIBS.iter().map(|name| {
            RuntimeFile::required(shared.join(name), metadata.dst_path_of(name))
        }));

        let redist = vc_redist_name(metadata.arch());
        files.push(RuntimeFile::optional(
            metadata.build_path_of(PathBuf::from("../packages/bin").join(redist)),
            metadata.dst_path_of(PathBuf::from("redist").join(redist)),
        ));

        files
    }

    /// Executables signed before the installer is compiled.
    fn binaries_to_sign(&self) -> Vec<PathBuf> {
        let metadata = self.staging.metadata();
        vec![
            metadata.dst_path_of(metadata.final_exe()),
            metadata.dst_path_of("SLPlugin.exe"),
            metadata.dst_path_of("SLVoice.exe"),
        ]
    }
}

fn fmod_library(arch: Arch, debug: bool) -> &'static str {
    match (arch.is_64bit(), debug) {
        (true, true) => "fmodL64.dll",
        (true, false) => "fmod64.dll",
        (false, true) => "fmodL.dll",
        (false, false) => "fmod.dll",
    }
}

fn vc_redist_name(arch: Arch) -> &'static str {
    if arch.is_64bit() {
        "vc_redist.x64.exe"
    } else {
        "vc_redist.x86.exe"
    }
}

impl InstallerBuilder for WindowsBuilder {
    fn metadata(&self) -> &BuildMetadata {
        self.staging.metadata()
    }

    async fn construct(&mut self) -> Result<()> {
        self.staging.construct_base().await?;
        let files = Self::runtime_files(self.staging.metadata());
        let presence = self.staging.stage_all(&files).await?;
        let skipped = presence.iter().filter(|p| !p.is_present()).count();
        log::info!(
            "Staged {} Windows runtime file(s), {} optional skipped",
            files.len() - skipped,
            skipped
        );
        Ok(())
    }

    async fn finish(&mut self) -> Result<Option<InstallerArtifact>> {
        for binary in self.binaries_to_sign() {
            self.signer.sign(&binary).await.warn_if_failed();
        }

        let installer =
            nsis::bundle_project(self.staging.metadata(), self.staging.manifest()).await?;

        self.signer.sign(&installer).await.warn_if_failed();

        Ok(Some(InstallerArtifact {
            path: installer,
            kind: ArtifactKind::Exe,
        }))
    }
}
