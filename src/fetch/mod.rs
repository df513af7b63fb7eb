// src/fetch/mod.rs
// =============================================================================
// This module turns one URL into one PageResult.
//
// The crawler only knows about the PageFetcher trait, so tests can swap in a
// scripted fake and never touch the network.
//
// Submodules:
// - http: HttpPageFetcher, the reqwest-backed implementation
// - html: HTML -> Markdown conversion, title and link extraction
// - robots: robots.txt fetching and matching
// - cookies: Netscape cookie file support
// =============================================================================

mod cookies;
mod html;
mod http;
mod robots;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::FetchOptions;
use crate::crawl::PageResult;

pub use http::HttpPageFetcher;

/// Fetches a single page.
///
/// Per-page problems (404, timeout, blocked by robots.txt, ...) are reported
/// inside the returned `PageResult`. `Err` is reserved for failures that make
/// the whole run pointless, such as an unreadable cookie file.
///
/// Implementations may return several results, but callers only look at the
/// first one.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str, options: &FetchOptions) -> Result<Vec<PageResult>>;
}

// Lets an orchestrator borrow a fetcher instead of owning it
#[async_trait]
impl<'a, T: PageFetcher + ?Sized> PageFetcher for &'a T {
    async fn fetch_page(&self, url: &str, options: &FetchOptions) -> Result<Vec<PageResult>> {
        (**self).fetch_page(url, options).await
    }
}
