// src/cache/mod.rs
// =============================================================================
// The on-disk page cache.
//
// - store: one JSON file per URL, read and written by the HTTP fetcher
// - admin: size/count inspection and wiping, for the CLI
//
// The crawler itself never touches the cache; it only passes the directory
// through to the fetcher.
// =============================================================================

mod admin;
mod store;

pub use admin::{clear, status, CacheStatus};
pub use store::PageCache;
