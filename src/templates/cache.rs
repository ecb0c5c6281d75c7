//! Durable cache of fetched template bundles
//!
//! One directory per identity under the user cache dir, holding the
//! packed bundle plus a sidecar with the identity string and fetch
//! timestamp. Entries are fully independent: writing one identity never
//! touches another, and invalidation removes each entry by its own
//! path. Writes go through a temp file and rename, so a reader never
//! observes a half-written entry; concurrent writers for the same
//! identity are last-writer-wins. Same-identity concurrent misses may
//! both fetch and both write, which is safe but redundant, and
//! acceptable for a one-task-per-process tool.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::templates::bundle::BundlePayload;

const BUNDLE_FILE: &str = "bundle.yaml";
const META_FILE: &str = "meta.yaml";

/// Errors surfaced by cache writes. Reads never error: a corrupt or
/// partially-written entry is treated as a miss and re-fetched.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache directory unavailable: {0}")]
    Unavailable(String),

    #[error("failed to write cache entry for {identity}: {message}")]
    Write { identity: String, message: String },

    #[error("failed to clear cache: {0}")]
    Clear(String),
}

/// Freshness sidecar stored next to each bundle.
#[derive(Debug, Serialize, Deserialize)]
struct EntryMeta {
    identity: String,
    fetched_at: DateTime<Utc>,
}

/// Summary of one cached entry, for status output.
#[derive(Debug)]
pub struct CacheEntryInfo {
    pub identity: String,
    pub fetched_at: DateTime<Utc>,
    pub size_bytes: u64,
}

/// Content-addressed store of template bundles on the local filesystem.
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Open the user-level cache (`<cache_dir>/strata/templates`).
    pub fn open_default() -> Result<Self, CacheError> {
        let dirs = directories::ProjectDirs::from("", "", "strata")
            .ok_or_else(|| CacheError::Unavailable("no home directory".to_string()))?;
        Ok(Self::open(dirs.cache_dir().join("templates")))
    }

    /// Open a cache rooted at an explicit directory.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return the cached bundle for `identity` if present and no older
    /// than `max_age`. Any read or parse failure is a miss.
    pub fn lookup(&self, identity: &str, max_age: Duration) -> Option<BTreeMap<String, String>> {
        let dir = self.entry_dir(identity);

        let meta: EntryMeta = std::fs::read_to_string(dir.join(META_FILE))
            .ok()
            .and_then(|content| serde_yml::from_str(&content).ok())?;

        if meta.identity != identity {
            // Hash collision or stale layout; re-fetch.
            return None;
        }

        let age = Utc::now().signed_duration_since(meta.fetched_at);
        let max_age = chrono::Duration::from_std(max_age).ok()?;
        if age > max_age {
            return None;
        }

        std::fs::read(dir.join(BUNDLE_FILE))
            .ok()
            .and_then(|bytes| BundlePayload::parse(&bytes).ok())
    }

    /// Atomically persist `files` under `identity`, replacing any prior
    /// entry and stamping it with the current time. The sidecar is
    /// written last, so a crash mid-store leaves an entry that reads as
    /// a miss.
    pub fn store(
        &self,
        identity: &str,
        files: &BTreeMap<String, String>,
    ) -> Result<(), CacheError> {
        let dir = self.entry_dir(identity);
        let write_err = |e: std::io::Error| CacheError::Write {
            identity: identity.to_string(),
            message: e.to_string(),
        };

        std::fs::create_dir_all(&dir).map_err(write_err)?;

        let payload = BundlePayload::render(files).map_err(|e| CacheError::Write {
            identity: identity.to_string(),
            message: e.to_string(),
        })?;
        atomic_write(&dir.join(BUNDLE_FILE), &payload).map_err(write_err)?;

        let meta = serde_yml::to_string(&EntryMeta {
            identity: identity.to_string(),
            fetched_at: Utc::now(),
        })
        .map_err(|e| CacheError::Write {
            identity: identity.to_string(),
            message: e.to_string(),
        })?;
        atomic_write(&dir.join(META_FILE), &meta).map_err(write_err)
    }

    /// Remove every entry. Each entry is removed by its own directory,
    /// so an in-flight store for another identity is not corrupted.
    /// Returns the number of entries removed.
    pub fn invalidate_all(&self) -> Result<usize, CacheError> {
        if !self.root.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        let entries =
            std::fs::read_dir(&self.root).map_err(|e| CacheError::Clear(e.to_string()))?;
        for entry in entries {
            let entry = entry.map_err(|e| CacheError::Clear(e.to_string()))?;
            if entry.path().is_dir() {
                std::fs::remove_dir_all(entry.path())
                    .map_err(|e| CacheError::Clear(e.to_string()))?;
                removed += 1;
            }
        }

        Ok(removed)
    }

    /// Readable entries with their identity, fetch time and on-disk
    /// size. Unreadable entries are skipped.
    pub fn entries(&self) -> Vec<CacheEntryInfo> {
        let Ok(dir_entries) = std::fs::read_dir(&self.root) else {
            return Vec::new();
        };

        let mut infos = Vec::new();
        for entry in dir_entries.flatten() {
            let dir = entry.path();
            let Ok(content) = std::fs::read_to_string(dir.join(META_FILE)) else {
                continue;
            };
            let Ok(meta) = serde_yml::from_str::<EntryMeta>(&content) else {
                continue;
            };

            infos.push(CacheEntryInfo {
                identity: meta.identity,
                fetched_at: meta.fetched_at,
                size_bytes: dir_size(&dir),
            });
        }

        infos.sort_by(|a, b| a.identity.cmp(&b.identity));
        infos
    }

    /// Total size of all cached content in bytes.
    pub fn size_bytes(&self) -> u64 {
        dir_size(&self.root)
    }

    fn entry_dir(&self, identity: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(identity.as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        self.root.join(&digest[..16])
    }
}

fn atomic_write(path: &Path, content: &str) -> std::io::Result<()> {
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path)
}

fn dir_size(dir: &Path) -> u64 {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}
