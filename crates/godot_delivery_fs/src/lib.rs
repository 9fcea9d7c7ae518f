//! # Godot Delivery FileSystem Storage
//!
//! The storage root of the delivery server.
//!
//! ```text
//! <root>/
//! ├── cache.json   persisted platform -> package list mapping
//! └── pcks/        exported packages, served by the download route
//! ```
//!
//! ## Features
//!
//! * **Atomic Writes**: Uses temporary files and rename operations so the cache file is never read half written.
//! * **Relocation**: Moves freshly exported packages into `pcks/`, replacing older builds of the same name.
//!
//! ## Usage
//!
//! ```no_run
//! use godot_delivery_fs::PackageStorage;
//!
//! # async fn run() -> Result<(), godot_delivery_core::error::StorageError> {
//! let storage = PackageStorage::new("./delivery_data");
//! storage.ensure_layout().await?;
//! # Ok(())
//! # }
//! ```

use godot_delivery_core::prelude::*;

use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Writes `data` next to `path` first and renames it into place.
pub async fn atomic_write(path: &Path, data: Bytes) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(StorageError::Io)?;
    }

    let tmp_path = path.with_extension("tmp");

    fs::write(&tmp_path, data).await.map_err(StorageError::Io)?;
    fs::rename(&tmp_path, path)
        .await
        .map_err(StorageError::Io)?;

    Ok(())
}

/// Moves `from` to `to`, replacing `to`.
///
/// Falls back to copy and remove when a plain rename is impossible, e.g. across file systems.
pub async fn relocate(from: &Path, to: &Path) -> Result<(), StorageError> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).await.map_err(StorageError::Io)?;
    }

    match fs::rename(from, to).await {
        Ok(()) => Ok(()),
        Err(err) => {
            debug!(error = %err, from = %from.display(), to = %to.display(), "rename failed, copying");
            fs::copy(from, to).await.map_err(StorageError::Io)?;
            fs::remove_file(from).await.map_err(StorageError::Io)?;
            Ok(())
        }
    }
}

#[derive(Clone, Debug)]
pub struct PackageStorage {
    root: PathBuf,
}

impl PackageStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { root: path.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the exported packages.
    pub fn pcks_dir(&self) -> PathBuf {
        self.root.join(files::PCKS_DIR)
    }

    /// Location of the persisted cache.
    pub fn cache_file(&self) -> PathBuf {
        self.root.join(files::CACHE_FILE)
    }

    pub fn package_path(&self, filename: &str) -> PathBuf {
        self.pcks_dir().join(filename)
    }

    /// Creates the storage root and the package directory if missing.
    pub async fn ensure_layout(&self) -> Result<(), StorageError> {
        fs::create_dir_all(self.pcks_dir())
            .await
            .map_err(StorageError::Io)
    }

    /// Moves an exported artifact into the package directory under `filename`, overwriting any previous build.
    pub async fn store_package(
        &self,
        artifact: &Path,
        filename: &str,
    ) -> Result<PathBuf, StorageError> {
        let target = self.package_path(filename);
        relocate(artifact, &target).await?;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn layout_lives_below_root() {
        let dir = tempfile::tempdir().unwrap();
        let storage = PackageStorage::new(dir.path());

        storage.ensure_layout().await.unwrap();

        assert!(dir.path().join("pcks").is_dir());
        assert_eq!(storage.cache_file(), dir.path().join("cache.json"));
        assert_eq!(
            storage.package_path("foo-linuxx11.pck"),
            dir.path().join("pcks").join("foo-linuxx11.pck")
        );
    }

    #[tokio::test]
    async fn store_package_overwrites_previous_build() {
        let dir = tempfile::tempdir().unwrap();
        let storage = PackageStorage::new(dir.path().join("storage"));
        let artifact = dir.path().join("export.pck");

        fs::write(&artifact, b"first").await.unwrap();
        storage.store_package(&artifact, "foo-linuxx11.pck").await.unwrap();

        fs::write(&artifact, b"second").await.unwrap();
        let target = storage.store_package(&artifact, "foo-linuxx11.pck").await.unwrap();

        assert!(!artifact.exists());
        assert_eq!(fs::read(&target).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn store_package_reports_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let storage = PackageStorage::new(dir.path());

        let result = storage
            .store_package(&dir.path().join("missing.pck"), "foo-linuxx11.pck")
            .await;

        assert!(matches!(result, Err(StorageError::Io(_))));
    }

    #[tokio::test]
    async fn atomic_write_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.json");

        atomic_write(&path, Bytes::from_static(b"{}")).await.unwrap();
        atomic_write(&path, Bytes::from_static(b"{\"a\":[]}")).await.unwrap();

        assert_eq!(fs::read(&path).await.unwrap(), b"{\"a\":[]}");
        assert!(!path.with_extension("tmp").exists());
    }
}
