//! Artifact size and checksum calculation.
//!
//! SHA-256 for single files and for directory trees (an unarchived staged
//! tree or a `.app` bundle), plus total size in bytes.

use crate::{
    bail,
    bundler::{Result, error::ErrorExt},
};
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Calculates SHA256 checksum of a file or directory.
///
/// For directories, every regular file is hashed in sorted path order with
/// its relative path mixed in, so the result is deterministic.
///
/// # Returns
///
/// Hex-encoded SHA-256 hash (64 characters).
pub async fn calculate_sha256(path: &Path) -> Result<String> {
    let metadata = tokio::fs::metadata(path)
        .await
        .fs_context("reading metadata", path)?;

    if metadata.is_file() {
        let mut hasher = Sha256::new();
        hash_file(&mut hasher, path).await?;
        Ok(hex::encode(hasher.finalize()))
    } else if metadata.is_dir() {
        calculate_directory_sha256(path).await
    } else {
        bail!("Path is neither file nor directory: {}", path.display())
    }
}

/// Total size in bytes of a file, or of every regular file under a directory.
pub async fn calculate_size(path: &Path) -> Result<u64> {
    let metadata = tokio::fs::metadata(path)
        .await
        .fs_context("reading metadata", path)?;
    if metadata.is_file() {
        return Ok(metadata.len());
    }

    let root = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<u64> {
        let mut total = 0;
        for entry in walkdir::WalkDir::new(&root).follow_links(false) {
            let entry = entry?;
            if entry.file_type().is_file() {
                total += entry
                    .metadata()
                    .map_err(crate::bundler::Error::WalkdirError)?
                    .len();
            }
        }
        Ok(total)
    })
    .await
    .map_err(|e| crate::bundler::Error::GenericError(format!("size task panicked: {}", e)))?
}

async fn hash_file(hasher: &mut Sha256, file_path: &Path) -> Result<()> {
    let mut file = tokio::fs::File::open(file_path)
        .await
        .fs_context("opening file for hashing", file_path)?;
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file
            .read(&mut buffer)
            .await
            .fs_context("reading file for hash calculation", file_path)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(())
}

async fn calculate_directory_sha256(dir_path: &Path) -> Result<String> {
    let mut entries: Vec<_> = walkdir::WalkDir::new(dir_path)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .collect();

    entries.sort_by_key(|e| e.path().to_path_buf());

    let mut hasher = Sha256::new();
    for entry in entries {
        if let Ok(rel_path) = entry.path().strip_prefix(dir_path) {
            hasher.update(rel_path.to_string_lossy().as_bytes());
        }
        hash_file(&mut hasher, entry.path()).await?;
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_checksum_matches_known_digest() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a");
        std::fs::write(&file, b"abc").unwrap();

        assert_eq!(
            calculate_sha256(&file).await.unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(calculate_size(&file).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn directory_checksum_depends_on_names() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        std::fs::write(a.path().join("x"), b"1").unwrap();
        std::fs::write(b.path().join("y"), b"1").unwrap();

        let ha = calculate_sha256(a.path()).await.unwrap();
        let hb = calculate_sha256(b.path()).await.unwrap();
        assert_ne!(ha, hb);
        assert_eq!(ha.len(), 64);
        assert_eq!(calculate_size(a.path()).await.unwrap(), 1);
    }
}
