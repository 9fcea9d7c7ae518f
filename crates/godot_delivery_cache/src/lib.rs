//! # Godot Delivery Cache
//!
//! In-memory mapping from [`Platform`] to the packages built for it, in build order.
//!
//! Reads (rotation lookups) share a reader/writer lock, ingestion takes it exclusively and only
//! for the in-memory replace. The mapping is persisted as pretty JSON to a single file and
//! restored from it at startup.
//!
//! ## Usage
//!
//! ```no_run
//! use godot_delivery_cache::MetadataCache;
//! use godot_delivery_core::package::Platform;
//!
//! # async fn run() {
//! let cache = MetadataCache::restore("./delivery_data/cache.json").await;
//! let next = cache.next_package(&Platform::from_label("Linux/X11"), Some("Foo")).await;
//! # }
//! ```

use godot_delivery_core::prelude::*;
use godot_delivery_fs::atomic_write;

use bytes::Bytes;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};

/// Platform -> packages in build order.
pub type CacheMap = BTreeMap<Platform, Vec<PckMetadata>>;

/// What an [`MetadataCache::ingest`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Entries dropped because they shared the ingested game name.
    pub removed: usize,
    pub added: usize,
}

#[derive(Clone)]
pub struct MetadataCache {
    inner: Arc<Inner>,
}

struct Inner {
    entries: RwLock<CacheMap>,
    file: PathBuf,
    persist_lock: Mutex<()>,
}

impl MetadataCache {
    /// An empty cache persisting to `file`.
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self::with_entries(file, CacheMap::new())
    }

    pub fn with_entries(file: impl Into<PathBuf>, entries: CacheMap) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: RwLock::new(entries),
                file: file.into(),
                persist_lock: Mutex::new(()),
            }),
        }
    }

    /// Loads the mapping from `file`.
    ///
    /// A missing, empty or unreadable file yields an empty cache.
    pub async fn restore(file: impl Into<PathBuf>) -> Self {
        let file = file.into();
        let entries = match read_entries(&file).await {
            Ok(Some(mut entries)) => {
                entries.retain(|platform, _| !platform.is_empty());
                info!(path = %file.display(), platforms = entries.len(), "restored cache from file");
                entries
            }
            Ok(None) => CacheMap::new(),
            Err(err) => {
                warn!(path = %file.display(), error = %err, "unable to restore cache, starting empty");
                CacheMap::new()
            }
        };

        Self::with_entries(file, entries)
    }

    pub fn file(&self) -> &Path {
        &self.inner.file
    }

    /// Replaces every package of the ingested game with `records`.
    ///
    /// The game name is taken from the first record. All entries with that name are removed from
    /// every platform before the new records are appended to their platform lists in order.
    pub async fn ingest(&self, records: Vec<PckMetadata>) -> IngestSummary {
        let Some(gamename) = records.first().map(|r| r.gamename.clone()) else {
            return IngestSummary::default();
        };

        let mut entries = self.inner.entries.write().await;

        let mut removed = 0;
        for packages in entries.values_mut() {
            let before = packages.len();
            packages.retain(|p| p.gamename != gamename);
            removed += before - packages.len();
        }
        entries.retain(|_, packages| !packages.is_empty());

        let added = records.len();
        for metadata in records {
            info!(platform = %metadata.platform, pck_file = %metadata.filename, "added metadata to cache");
            entries
                .entry(metadata.platform.clone())
                .or_default()
                .push(metadata);
        }

        IngestSummary { removed, added }
    }

    /// Writes the whole mapping to the cache file, replacing its previous contents.
    pub async fn save(&self) -> Result<(), StorageError> {
        let _guard = self.inner.persist_lock.lock().await;

        let data = {
            let entries = self.inner.entries.read().await;
            serde_json::to_vec_pretty(&*entries)?
        };

        atomic_write(&self.inner.file, Bytes::from(data)).await
    }

    /// [`save`](Self::save), logging instead of returning failures.
    pub async fn persist(&self) {
        match self.save().await {
            Ok(()) => info!(path = %self.inner.file.display(), "wrote cache to file"),
            Err(err) => error!(path = %self.inner.file.display(), error = %err, "unable to write cache to file"),
        }
    }

    /// The package following `last_game` on `platform`, see [`next_index`].
    pub async fn next_package(
        &self,
        platform: &Platform,
        last_game: Option<&str>,
    ) -> Option<PckMetadata> {
        let entries = self.inner.entries.read().await;
        let packages = entries.get(platform)?;
        godot_delivery_core::rotation::next_package(packages, last_game).cloned()
    }

    pub async fn packages(&self, platform: &Platform) -> Vec<PckMetadata> {
        let entries = self.inner.entries.read().await;
        entries.get(platform).cloned().unwrap_or_default()
    }

    pub async fn snapshot(&self) -> CacheMap {
        self.inner.entries.read().await.clone()
    }

    /// Number of packages across all platforms.
    pub async fn len(&self) -> usize {
        self.inner.entries.read().await.values().map(Vec::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

async fn read_entries(file: &Path) -> Result<Option<CacheMap>, StorageError> {
    let data = match tokio::fs::read(file).await {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(StorageError::Io(err)),
    };

    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    Ok(Some(serde_json::from_slice(&data)?))
}
