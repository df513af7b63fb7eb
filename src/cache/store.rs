// src/cache/store.rs
// =============================================================================
// Stores fetched pages on disk, keyed by URL.
//
// Layout: <cache_dir>/<sha256 of the URL, hex>.json
//
// Entries never expire here; clearing the cache is an explicit operation
// (see admin.rs).
// =============================================================================

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::crawl::PageResult;
use crate::error::CacheError;

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    // Seconds since the epoch, for humans poking around the directory
    cached_at: u64,
    page: PageResult,
}

/// A cache rooted at one directory.
#[derive(Debug, Clone)]
pub struct PageCache {
    dir: PathBuf,
}

impl PageCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn entry_path(&self, url: &str) -> PathBuf {
        let digest = Sha256::digest(url.as_bytes());
        self.dir.join(format!("{}.json", hex::encode(digest)))
    }

    /// Looks up a page. A missing entry is `Ok(None)`.
    pub async fn get(&self, url: &str) -> Result<Option<PageResult>, CacheError> {
        let path = self.entry_path(url);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::io(path, e)),
        };

        let entry: CacheEntry = serde_json::from_slice(&bytes)?;
        Ok(Some(entry.page))
    }

    /// Writes a page, creating the cache directory when needed.
    pub async fn put(&self, page: &PageResult) -> Result<(), CacheError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| CacheError::io(&self.dir, e))?;

        let entry = CacheEntry {
            cached_at: unix_now(),
            page: page.clone(),
        };
        let json = serde_json::to_vec_pretty(&entry)?;

        let path = self.entry_path(&page.url);
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| CacheError::io(path, e))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
