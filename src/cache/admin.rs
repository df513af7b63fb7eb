// src/cache/admin.rs
// =============================================================================
// Operational helpers for the cache directory: how big is it, and wipe it.
//
// Both are safe to call when the directory doesn't exist yet.
// =============================================================================

use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::error::CacheError;

// How many metadata() calls run at once while sizing the cache
const STAT_CONCURRENCY: usize = 32;

/// Size summary of the cache directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub cache_size: u64,
    pub cache_files: usize,
    pub cache_size_formatted: String,
}

impl CacheStatus {
    fn new(cache_size: u64, cache_files: usize) -> Self {
        Self {
            cache_size,
            cache_files,
            cache_size_formatted: format!("{:.2} MB", cache_size as f64 / 1024.0 / 1024.0),
        }
    }
}

/// Counts files and bytes under `dir`, recursively.
///
/// A missing directory is an empty cache, not an error.
pub async fn status(dir: &Path) -> Result<CacheStatus, CacheError> {
    let files = list_files(dir).await?;

    // Files can vanish between listing and stat-ing; those count as zero bytes
    let sizes: Vec<u64> = stream::iter(files.iter())
        .map(|path| async move {
            tokio::fs::metadata(path)
                .await
                .map(|meta| meta.len())
                .unwrap_or(0)
        })
        .buffer_unordered(STAT_CONCURRENCY)
        .collect()
        .await;

    Ok(CacheStatus::new(sizes.iter().sum(), files.len()))
}

/// Removes the cache directory and everything in it.
pub async fn clear(dir: &Path) -> Result<(), CacheError> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {
            tracing::info!(dir = %dir.display(), "Cache cleared");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CacheError::io(dir, e)),
    }
}

// Every regular file below `root`, depth first
async fn list_files(root: &Path) -> Result<Vec<PathBuf>, CacheError> {
    let mut pending = vec![root.to_path_buf()];
    let mut files = Vec::new();

    while let Some(dir) = pending.pop() {
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(CacheError::io(dir, e)),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CacheError::io(&dir, e))?
        {
            let path = entry.path();
            match entry.file_type().await {
                Ok(kind) if kind.is_dir() => pending.push(path),
                Ok(kind) if kind.is_file() => files.push(path),
                _ => {}
            }
        }
    }

    Ok(files)
}
