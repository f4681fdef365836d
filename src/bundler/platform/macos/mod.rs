//! macOS disk image builder.
//!
//! The destination root is the app bundle itself. `construct` copies the
//! built bundle there, places the shared libraries once in
//! `Contents/Resources`, and links them into each helper bundle. `finish`
//! signs the helpers and then the main bundle before building the image.

pub mod dmg;

use super::{InstallerBuilder, Staging};
use crate::bundler::{
    ArtifactKind, InstallerArtifact,
    error::Result,
    manifest::DylibManifest,
    settings::{Action, BuildMetadata},
    signing::{CodesignSigner, SigningAgent, SigningIdentity},
    symlink::link_shared_files,
    utils::process,
};
use std::path::{Path, PathBuf};

/// Shared libraries linked into helper bundles when present.
const OPTIONAL_DYLIBS: &[&str] = &[
    "libapr-1.0.dylib",
    "libaprutil-1.0.dylib",
    "libcollada14dom.dylib",
    "libexpat.1.5.2.dylib",
    "libexception_handler.dylib",
    "libGLOD.dylib",
    "libhunspell-1.3.0.dylib",
    "libndofdev.dylib",
];

/// Voice runtime, loaded by the viewer only.
const VOICE_RUNTIME: &[&str] = &[
    "libortp.dylib",
    "libsndfile.dylib",
    "libvivoxoal.dylib",
    "libvivoxsdk.dylib",
    "libvivoxplatform.dylib",
    "ca-bundle.crt",
    "SLVoice",
];

const LLCOMMON: &str = "libllcommon.dylib";

/// Helper bundles built next to the viewer: (build directory, bundle name).
const HELPER_BUNDLES: &[(&str, &str)] = &[("../llplugin/slplugin", "SLPlugin.app")];

const LIBDIR: &str = "../packages/lib/release";
const ALT_LIBDIR: &str = "../packages/libraries/universal-darwin/lib/release";

/// Disk image builder for macOS targets.
#[derive(Debug)]
pub struct DarwinBuilder {
    staging: Staging,
    signer: SigningAgent<CodesignSigner>,
    dylibs: DylibManifest,
}

impl DarwinBuilder {
    /// Creates the builder; `identity` of `None` leaves the bundles unsigned.
    pub fn new(staging: Staging, identity: Option<SigningIdentity>) -> Self {
        Self {
            staging,
            signer: SigningAgent::new(identity.map(CodesignSigner::new)),
            dylibs: DylibManifest::new(),
        }
    }

    /// Shared libraries collected by the last `construct`.
    pub fn dylibs(&self) -> &DylibManifest {
        &self.dylibs
    }

    fn resources_dir(&self) -> PathBuf {
        self.staging.metadata().dst_path_of("Contents/Resources")
    }

    /// Library directory in the build tree, falling back to the universal layout.
    fn library_dir(metadata: &BuildMetadata) -> PathBuf {
        let primary = metadata.build_path_of(LIBDIR);
        if primary.is_dir() {
            primary
        } else {
            metadata.build_path_of(ALT_LIBDIR)
        }
    }

    /// Helper bundle locations inside the staged bundle.
    pub fn helper_bundles(metadata: &BuildMetadata) -> Vec<PathBuf> {
        HELPER_BUNDLES
            .iter()
            .map(|(_, name)| metadata.dst_path_of(Path::new("Contents/Resources").join(name)))
            .collect()
    }

    async fn stage_app_bundle(&mut self) -> Result<()> {
        let metadata = self.staging.metadata();
        let bundle = metadata.build_path_of(
            PathBuf::from(metadata.configuration()).join(format!("{}.app", metadata.app_name())),
        );
        let dest = metadata.dest_root().to_path_buf();
        self.staging.stage_dir(&bundle, &dest).await
    }

    async fn stage_libraries(&mut self) -> Result<()> {
        let metadata = self.staging.metadata().clone();
        let libdir = Self::library_dir(&metadata);
        let resources = self.resources_dir();

        let llcommon_build = metadata.build_path_of(
            Path::new("../llcommon")
                .join(metadata.configuration())
                .join(LLCOMMON),
        );
        let llcommon = if llcommon_build.is_file() {
            llcommon_build
        } else {
            libdir.join(LLCOMMON)
        };
        if self
            .staging
            .stage_optional(&llcommon, &resources.join(LLCOMMON))
            .await?
            .is_present()
        {
            self.dylibs.push(LLCOMMON);
        }

        for name in OPTIONAL_DYLIBS {
            if self
                .staging
                .stage_optional(&libdir.join(name), &resources.join(name))
                .await?
                .is_present()
            {
                self.dylibs.push(*name);
            }
        }

        for name in VOICE_RUNTIME {
            self.staging
                .stage_file(&libdir.join(name), &resources.join(name))
                .await?;
        }
        Ok(())
    }

    async fn stage_helper_bundles(&mut self) -> Result<()> {
        let metadata = self.staging.metadata().clone();
        let resources = self.resources_dir();

        for (build_dir, name) in HELPER_BUNDLES {
            let source = metadata.build_path_of(
                Path::new(build_dir)
                    .join(metadata.configuration())
                    .join(name),
            );
            let bundle = resources.join(name);
            self.staging.stage_dir(&source, &bundle).await?;

            let links = link_shared_files(
                &bundle.join("Contents/Resources"),
                &resources,
                self.dylibs.names(),
            )
            .await?;
            log::info!("Linked {} shared libraries into {}", links.len(), name);
        }
        Ok(())
    }

    async fn strip_viewer(&self) -> Result<()> {
        let metadata = self.staging.metadata();
        let actions = metadata.actions();
        if !metadata.is_release()
            || !(actions.contains(Action::Package) || actions.contains(Action::Unpacked))
        {
            return Ok(());
        }
        let binary = metadata.dst_path_of(Path::new("Contents/MacOS").join(metadata.app_name()));
        log::info!("Stripping {}", binary.display());
        process::strip_debug_symbols(&binary).await
    }
}

impl InstallerBuilder for DarwinBuilder {
    fn metadata(&self) -> &BuildMetadata {
        self.staging.metadata()
    }

    async fn construct(&mut self) -> Result<()> {
        self.staging.construct_base().await?;
        self.stage_app_bundle().await?;
        self.stage_libraries().await?;
        self.stage_helper_bundles().await?;
        self.strip_viewer().await
    }

    async fn finish(&mut self) -> Result<Option<InstallerArtifact>> {
        let metadata = self.staging.metadata();
        for helper in Self::helper_bundles(metadata) {
            self.signer.sign(&helper).await.warn_if_failed();
        }
        self.signer.sign(metadata.dest_root()).await.warn_if_failed();

        let image = dmg::bundle_project(metadata, metadata.dest_root()).await?;
        Ok(Some(InstallerArtifact {
            path: image,
            kind: ArtifactKind::Dmg,
        }))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::bundler::{
        manifest::Manifest,
        settings::{Arch, BuildMetadataBuilder, Platform},
    };
    use std::fs;

    fn metadata(root: &Path) -> BuildMetadata {
        BuildMetadataBuilder::new()
            .platform(Platform::Darwin)
            .arch(Arch::Universal)
            .channel("Singularity Release")
            .version("1.8.7.6861")
            .configuration("RelWithDebInfo")
            .actions([Action::Copy])
            .source_root(root.join("indra/newview"))
            .build_root(root.join("build/newview"))
            .dest_root(root.join("build/newview/packaged"))
            .build()
            .unwrap()
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, path.file_name().unwrap().to_string_lossy().as_bytes()).unwrap();
    }

    #[tokio::test]
    async fn construct_links_collected_libraries_into_helpers() {
        let root = tempfile::tempdir().unwrap();
        let build = root.path().join("build");
        touch(&build.join("newview/RelWithDebInfo/Singularity.app/Contents/MacOS/Singularity"));
        touch(&build.join("llplugin/slplugin/RelWithDebInfo/SLPlugin.app/Contents/MacOS/SLPlugin"));
        let libdir = build.join("packages/lib/release");
        for name in VOICE_RUNTIME {
            touch(&libdir.join(name));
        }
        touch(&libdir.join("libGLOD.dylib"));
        touch(&libdir.join("libndofdev.dylib"));
        touch(&build.join("llcommon/RelWithDebInfo/libllcommon.dylib"));

        let md = metadata(root.path());
        let mut builder = DarwinBuilder::new(Staging::new(md.clone(), Manifest::new()), None);
        builder.construct().await.unwrap();

        assert_eq!(
            builder.dylibs().names(),
            &["libllcommon.dylib", "libGLOD.dylib", "libndofdev.dylib"]
        );

        let resources = md.dst_path_of("Contents/Resources");
        assert!(md.dst_path_of("Contents/MacOS/Singularity").is_file());
        assert!(resources.join("SLVoice").is_file());

        let link = resources.join("SLPlugin.app/Contents/Resources/libGLOD.dylib");
        assert_eq!(
            fs::read_link(&link).unwrap(),
            PathBuf::from("../../../libGLOD.dylib")
        );
        assert_eq!(fs::read_to_string(&link).unwrap(), "libGLOD.dylib");
        assert!(
            fs::symlink_metadata(resources.join("SLPlugin.app/Contents/Resources/libexpat.1.5.2.dylib"))
                .is_err()
        );
    }

    #[tokio::test]
    async fn missing_voice_runtime_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        let build = root.path().join("build");
        touch(&build.join("newview/RelWithDebInfo/Singularity.app/Contents/MacOS/Singularity"));
        fs::create_dir_all(build.join("packages/lib/release")).unwrap();

        let md = metadata(root.path());
        let mut builder = DarwinBuilder::new(Staging::new(md, Manifest::new()), None);
        let err = builder.construct().await.unwrap_err();
        assert!(matches!(err, crate::bundler::Error::MissingComponent(_)));
    }
}
