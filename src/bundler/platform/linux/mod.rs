//! Linux archive builder.
//!
//! `construct` stages the viewer binary, the plugin host and the optional
//! third-party libraries. `finish` normalizes permissions, strips release
//! binaries, and packs the tree as `<installer base name>.tar.xz`.

pub mod archive;
pub mod permissions;
pub mod strip;

use super::{InstallerBuilder, RuntimeFile, Staging};
use crate::bundler::{
    ArtifactKind, InstallerArtifact,
    error::{Error, Result},
    settings::{Arch, BuildMetadata},
};
use std::path::{Path, PathBuf};

const PACKAGE_LIBDIR: &str = "../packages/lib/release";

/// Tarball builder for Linux targets.
#[derive(Debug)]
pub struct LinuxBuilder {
    staging: Staging,
}

impl LinuxBuilder {
    /// Creates the builder.
    ///
    /// # Errors
    ///
    /// [`Error::ArchError`] for universal targets.
    pub fn new(staging: Staging) -> Result<Self> {
        if staging.metadata().arch() == Arch::Universal {
            return Err(Error::ArchError(
                "universal builds are only supported on darwin".into(),
            ));
        }
        Ok(Self { staging })
    }

    /// Runtime files staged by `construct`, in staging order.
    pub fn runtime_files(metadata: &BuildMetadata) -> Vec<RuntimeFile> {
        let libdir = metadata.build_path_of(PACKAGE_LIBDIR);
        let arch_libdir = if metadata.arch().is_64bit() { "lib64" } else { "lib" };
        let tcmalloc = if metadata.arch().is_64bit() {
            "libtcmalloc_minimal.so.4"
        } else {
            "libtcmalloc_minimal.so.0"
        };

        vec![
            RuntimeFile::optional(
                metadata.build_path_of("../llcommon/libllcommon.so"),
                metadata.dst_path_of("lib/libllcommon.so"),
            ),
            RuntimeFile::optional(
                libdir.join(tcmalloc),
                metadata.dst_path_of(Path::new(arch_libdir).join(tcmalloc)),
            ),
            RuntimeFile::optional(
                libdir.join("libfmod.so"),
                metadata.dst_path_of(Path::new(arch_libdir).join("libfmod.so")),
            ),
            RuntimeFile::required(
                metadata.build_path_of("singularity-bin"),
                metadata.dst_path_of("bin/do-not-directly-run-singularity-bin"),
            ),
            RuntimeFile::required(
                metadata.build_path_of("../llplugin/slplugin/SLPlugin"),
                metadata.dst_path_of("bin/SLPlugin"),
            ),
        ]
    }

    /// Where the staged tree sits while it is archived.
    pub fn archive_root(metadata: &BuildMetadata) -> PathBuf {
        metadata.build_path_of(metadata.installer_base_name())
    }
}

impl InstallerBuilder for LinuxBuilder {
    fn metadata(&self) -> &BuildMetadata {
        self.staging.metadata()
    }

    async fn construct(&mut self) -> Result<()> {
        self.staging.construct_base().await?;
        let files = Self::runtime_files(self.staging.metadata());
        let presence = self.staging.stage_all(&files).await?;
        if !presence[0].is_present() {
            log::info!("libllcommon.so not found; assuming llcommon was linked statically");
        }
        Ok(())
    }

    async fn finish(&mut self) -> Result<Option<InstallerArtifact>> {
        let metadata = self.staging.metadata();
        let dest = metadata.dest_root();

        permissions::normalize_tree(dest).await?;

        if metadata.is_release() {
            strip::strip_tree(dest, &metadata.branding().update_helper).await?;
        }

        let release = metadata.is_release();
        let build_type = metadata.build_type().to_string();
        let archive = archive::with_renamed(dest, &Self::archive_root(metadata), |dir| async move {
            if release {
                archive::create_tarball(&dir).await.map(Some)
            } else {
                log::info!(
                    "Skipping {}.tar.xz for non-release build ({})",
                    dir.display(),
                    build_type
                );
                Ok(None)
            }
        })
        .await?;

        Ok(archive.map(|path| InstallerArtifact {
            path,
            kind: ArtifactKind::TarArchive,
        }))
    }
}
