// src/links/mod.rs
// =============================================================================
// This module finds links in Markdown text and decides which of them stay on
// the same site.
//
// Submodules:
// - markdown: Extracts absolute URLs from Markdown (inline links + bare URLs)
// - origin: Keeps only the links that share an origin with a base URL
//
// Both are pure functions with no I/O, so the crawler and the tests can call
// them directly.
// =============================================================================

mod markdown;
mod origin;

pub use markdown::extract_links;
pub use origin::filter_same_origin;
