//! File-copy log and runtime dependency staging.
//!
//! The generic staging pass hands over an ordered list of
//! [`FileCopyRecord`]s as JSON. Builders append their own records while
//! staging platform runtime dependencies, so the log that feeds the NSIS
//! script generator covers everything placed under the destination root.

use crate::bundler::{
    error::{Error, ErrorExt, Result},
    utils::fs,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One staging output entry.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct FileCopyRecord {
    /// Whether the file is destined for the installer
    pub included: bool,
    /// Where the file came from
    pub source: PathBuf,
    /// Absolute path under the destination root
    pub destination: PathBuf,
}

impl FileCopyRecord {
    /// Creates an included record.
    pub fn included(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            included: true,
            source: source.into(),
            destination: destination.into(),
        }
    }
}

/// Outcome of staging an optional component.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Presence {
    /// Found and staged
    Present,
    /// Not in the build output (e.g. statically linked); skipped
    Absent,
}

impl Presence {
    /// Whether the component was staged.
    pub fn is_present(self) -> bool {
        self == Presence::Present
    }
}

/// Ordered file-copy log for one run.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Manifest {
    records: Vec<FileCopyRecord>,
}

impl Manifest {
    /// Creates an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manifest from existing records, keeping their order.
    pub fn from_records(records: Vec<FileCopyRecord>) -> Self {
        Self { records }
    }

    /// Loads a JSON array of records from `path`.
    pub async fn load(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .fs_context("reading file-copy log", path)?;
        let records: Vec<FileCopyRecord> = serde_json::from_str(&contents)?;
        log::debug!("Loaded {} file-copy records from {}", records.len(), path.display());
        Ok(Self { records })
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[FileCopyRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the manifest has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends a record.
    pub fn push(&mut self, record: FileCopyRecord) {
        self.records.push(record);
    }

    /// Destinations of included records, in insertion order.
    pub fn included_destinations(&self) -> impl Iterator<Item = &Path> {
        self.records
            .iter()
            .filter(|r| r.included)
            .map(|r| r.destination.as_path())
    }

    /// Replays the generic staging output into the destination tree.
    ///
    /// Every included destination is checked against `dest_root` before
    /// anything is copied; one outside it is a [`Error::PathEscape`].
    /// Included records whose source still exists are copied; records whose
    /// source is gone but whose destination is already in place are kept
    /// as they are. A record with neither is a [`Error::MissingComponent`].
    pub async fn replay(&self, dest_root: &Path) -> Result<()> {
        for destination in self.included_destinations() {
            fs::ensure_within(dest_root, destination)?;
        }

        let mut copied = 0usize;
        for record in self.records.iter().filter(|r| r.included) {
            if record.source == record.destination {
                continue;
            }
            if record.source.is_file() {
                fs::copy_file(&record.source, &record.destination).await?;
                copied += 1;
            } else if record.source.is_dir() {
                fs::copy_dir(&record.source, &record.destination).await?;
                copied += 1;
            } else if record.destination.symlink_metadata().is_err() {
                return Err(Error::MissingComponent(record.source.clone()));
            }
        }
        log::info!("Replayed {} staged file(s)", copied);
        Ok(())
    }

    /// Copies a required file; absent source is [`Error::MissingComponent`].
    ///
    /// `dst` must lie under `dest_root` ([`Error::PathEscape`] otherwise).
    pub async fn stage_file(&mut self, dest_root: &Path, src: &Path, dst: &Path) -> Result<()> {
        fs::ensure_within(dest_root, dst)?;
        if !src.is_file() {
            return Err(Error::MissingComponent(src.to_path_buf()));
        }
        fs::copy_file(src, dst).await?;
        log::debug!("Staged {} -> {}", src.display(), dst.display());
        self.push(FileCopyRecord::included(src, dst));
        Ok(())
    }

    /// Copies an optional file, logging and skipping it when absent.
    pub async fn stage_optional(
        &mut self,
        dest_root: &Path,
        src: &Path,
        dst: &Path,
    ) -> Result<Presence> {
        fs::ensure_within(dest_root, dst)?;
        if !src.is_file() {
            log::warn!("Optional component {} not found; skipping", src.display());
            return Ok(Presence::Absent);
        }
        self.stage_file(dest_root, src, dst).await?;
        Ok(Presence::Present)
    }

    /// Copies a directory tree (e.g. an `.app` bundle), recording every file.
    pub async fn stage_dir(&mut self, dest_root: &Path, src: &Path, dst: &Path) -> Result<()> {
        fs::ensure_within(dest_root, dst)?;
        if !src.is_dir() {
            return Err(Error::MissingComponent(src.to_path_buf()));
        }
        fs::copy_dir(src, dst).await?;

        for entry in walkdir::WalkDir::new(src).follow_links(false) {
            let entry = entry?;
            if entry.file_type().is_file() {
                let rel = entry.path().strip_prefix(src)?;
                self.push(FileCopyRecord::included(entry.path(), dst.join(rel)));
            }
        }
        log::debug!("Staged directory {} -> {}", src.display(), dst.display());
        Ok(())
    }
}

/// Shared-library file names collected while staging one library directory.
///
/// Consumed by the symlink resolver, so staging must finish before any link
/// pass that uses it.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct DylibManifest {
    names: Vec<String>,
}

impl DylibManifest {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a library file name, ignoring duplicates.
    pub fn push(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.names.contains(&name) {
            self.names.push(name);
        }
    }

    /// Names in the order they were staged.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Whether nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loads_json_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("files.json");
        std::fs::write(
            &log,
            r#"[
                {"included": true, "source": "/s/a.dll", "destination": "/d/a.dll"},
                {"included": false, "source": "/s/b.pdb", "destination": "/d/b.pdb"}
            ]"#,
        )
        .unwrap();

        let manifest = Manifest::load(&log).await.unwrap();
        assert_eq!(manifest.len(), 2);
        let included: Vec<_> = manifest.included_destinations().collect();
        assert_eq!(included, vec![Path::new("/d/a.dll")]);
    }

    #[tokio::test]
    async fn malformed_log_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("files.json");
        std::fs::write(&log, "{not json").unwrap();
        assert!(matches!(Manifest::load(&log).await, Err(Error::JsonError(_))));
    }

    #[tokio::test]
    async fn optional_component_absent_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = Manifest::new();
        let presence = manifest
            .stage_optional(dir.path(), &dir.path().join("fmod.dll"), &dir.path().join("out/fmod.dll"))
            .await
            .unwrap();
        assert_eq!(presence, Presence::Absent);
        assert!(manifest.is_empty());
    }

    #[tokio::test]
    async fn required_component_absent_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = Manifest::new();
        let err = manifest
            .stage_file(dir.path(), &dir.path().join("SLVoice.exe"), &dir.path().join("out/SLVoice.exe"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingComponent(_)));
    }

    #[tokio::test]
    async fn stage_dir_records_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("Viewer.app");
        std::fs::create_dir_all(src.join("Contents/MacOS")).unwrap();
        std::fs::write(src.join("Contents/Info.plist"), b"p").unwrap();
        std::fs::write(src.join("Contents/MacOS/Viewer"), b"b").unwrap();

        let dst = dir.path().join("out/Viewer.app");
        let mut manifest = Manifest::new();
        manifest.stage_dir(&dir.path().join("out"), &src, &dst).await.unwrap();

        assert_eq!(manifest.len(), 2);
        assert!(dst.join("Contents/MacOS/Viewer").is_file());
        assert!(manifest
            .included_destinations()
            .any(|d| d == dst.join("Contents/Info.plist")));
    }

    #[tokio::test]
    async fn replay_copies_included_records_only() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("keep.txt"), b"k").unwrap();
        std::fs::write(src.join("skip.txt"), b"s").unwrap();
        let dst = dir.path().join("dst");

        let manifest = Manifest::from_records(vec![
            FileCopyRecord::included(src.join("keep.txt"), dst.join("app_settings/keep.txt")),
            FileCopyRecord {
                included: false,
                source: src.join("skip.txt"),
                destination: dst.join("skip.txt"),
            },
        ]);
        manifest.replay(&dst).await.unwrap();

        assert!(dst.join("app_settings/keep.txt").is_file());
        assert!(!dst.join("skip.txt").exists());
    }

    #[tokio::test]
    async fn replay_rejects_destination_outside_root() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("inside.txt"), b"i").unwrap();
        std::fs::write(src.join("escaped.txt"), b"e").unwrap();
        let dst = dir.path().join("stage");

        let manifest = Manifest::from_records(vec![
            FileCopyRecord::included(src.join("inside.txt"), dst.join("inside.txt")),
            FileCopyRecord::included(src.join("escaped.txt"), dst.join("../escaped.txt")),
        ]);
        let err = manifest.replay(&dst).await.unwrap_err();

        assert!(matches!(err, Error::PathEscape { .. }));
        assert!(!dir.path().join("escaped.txt").exists());
        assert!(!dst.join("inside.txt").exists());
    }

    #[tokio::test]
    async fn staging_outside_root_copies_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("libfmod.so");
        std::fs::write(&src, b"so").unwrap();
        let dst = dir.path().join("stage");
        let outside = dir.path().join("elsewhere/libfmod.so");
        let mut manifest = Manifest::new();

        let err = manifest.stage_file(&dst, &src, &outside).await.unwrap_err();
        assert!(matches!(err, Error::PathEscape { .. }));
        let err = manifest.stage_optional(&dst, &src, &outside).await.unwrap_err();
        assert!(matches!(err, Error::PathEscape { .. }));

        assert!(!outside.exists());
        assert!(manifest.is_empty());
    }

    #[test]
    fn dylib_manifest_keeps_order_without_duplicates() {
        let mut dylibs = DylibManifest::new();
        dylibs.push("libortp.dylib");
        dylibs.push("libapr-1.0.dylib");
        dylibs.push("libortp.dylib");
        assert_eq!(dylibs.names(), &["libortp.dylib", "libapr-1.0.dylib"]);
    }
}
