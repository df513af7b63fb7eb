// src/error.rs
// =============================================================================
// Typed errors for the parts of the program that callers may want to match on.
//
// - RequestError: a crawl request could not be built (bad seed URL, budget 0)
// - CacheError: the on-disk page cache could not be read or written
//
// Everything else (HTTP plumbing, CLI glue) uses anyhow, the same way the
// rest of the codebase does.
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Reasons a `CrawlRequest` is rejected before any page is fetched.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid seed URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported URL scheme '{scheme}' in '{url}' (expected http or https)")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("page budget must be at least 1")]
    ZeroPageBudget,
}

/// Failures while touching the cache directory.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache entry is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl CacheError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CacheError::Io {
            path: path.into(),
            source,
        }
    }
}
