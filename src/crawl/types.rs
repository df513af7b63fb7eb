// src/crawl/types.rs
// =============================================================================
// Data passed into and out of a crawl.
//
// - CrawlRequest: what to crawl (validated seed URL + options)
// - PageResult:   one page as returned by the fetcher
// - CrawlResult:  the combined outcome handed back to the caller
// =============================================================================

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::CrawlOptions;
use crate::error::RequestError;

/// A validated crawl request. Built once, never mutated during a run.
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    seed_url: String,
    options: CrawlOptions,
}

impl CrawlRequest {
    /// Validates the seed and the page budget.
    ///
    /// The seed is stored in its normalized form (`https://Example.com` becomes
    /// `https://example.com/`) so it compares equal to the same URL when a
    /// page links back to it.
    pub fn new(seed_url: &str, options: CrawlOptions) -> Result<Self, RequestError> {
        let parsed = Url::parse(seed_url).map_err(|source| RequestError::InvalidUrl {
            url: seed_url.to_string(),
            source,
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RequestError::UnsupportedScheme {
                url: seed_url.to_string(),
                scheme: parsed.scheme().to_string(),
            });
        }

        if options.page_budget == 0 {
            return Err(RequestError::ZeroPageBudget);
        }

        Ok(Self {
            seed_url: parsed.to_string(),
            options,
        })
    }

    pub fn seed_url(&self) -> &str {
        &self.seed_url
    }

    pub fn options(&self) -> &CrawlOptions {
        &self.options
    }
}

/// One fetched page.
///
/// A failed fetch is still a `PageResult`: the `error` field carries the reason
/// and `markdown` is usually empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    pub url: String,
    #[serde(default)]
    pub markdown: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Links the fetcher itself reported for this page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageResult {
    /// A page that could not be fetched.
    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// The outcome of one crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlResult {
    /// Every visited page, in visitation order, behind provenance markers
    pub markdown: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub links: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CrawlResult {
    /// Nothing usable was produced; `error` says why.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }
}
