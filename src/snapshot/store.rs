//! Durable key→snapshot store backing competitor change detection.
//!
//! A flat directory of `<key>.json` files, one per target URL, keyed by the
//! digest from [`super::url_key`]. No schema versioning: a record that no
//! longer deserializes against the current [`PageSnapshot`] shape is treated
//! as a cache miss.

use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use super::PageSnapshot;
use crate::error::{CrawlError, CrawlResult};

/// Flat-file snapshot store
#[derive(Debug)]
pub struct SnapshotStore {
    dir: PathBuf,
    // Serializes read-then-write sequences so two workers visiting the same
    // URL in one run cannot lose an update. Distinct targets almost never
    // share a key, and competitor concurrency is low, so one lock suffices.
    update_lock: Mutex<()>,
}

impl SnapshotStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub async fn open(dir: impl Into<PathBuf>) -> CrawlResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| CrawlError::Snapshot(format!("failed to create {}: {e}", dir.display())))?;
        Ok(Self {
            dir,
            update_lock: Mutex::new(()),
        })
    }

    /// Acquire the store's update lock for a read-then-write sequence
    pub async fn lock_for_update(&self) -> MutexGuard<'_, ()> {
        self.update_lock.lock().await
    }

    /// Fetch the stored snapshot for `key`, if any.
    ///
    /// Absent files and unreadable/old-shaped records are both misses.
    pub async fn get(&self, key: &str) -> Option<PageSnapshot> {
        let path = self.entry_path(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read snapshot {}: {e}", path.display());
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                debug!(
                    "Snapshot {} does not match current schema, treating as miss: {e}",
                    path.display()
                );
                None
            }
        }
    }

    /// Write `snapshot` as the new record for `key`
    pub async fn put(&self, key: &str, snapshot: &PageSnapshot) -> CrawlResult<()> {
        let path = self.entry_path(key);
        let json = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| CrawlError::Snapshot(format!("failed to serialize snapshot: {e}")))?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| CrawlError::Snapshot(format!("failed to write {}: {e}", path.display())))?;
        debug!("Stored snapshot for {} at {}", snapshot.url, path.display());
        Ok(())
    }

    /// Directory backing this store
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}
