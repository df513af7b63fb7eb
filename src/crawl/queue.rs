// src/crawl/queue.rs
// =============================================================================
// This module implements the bounded breadth-first crawl.
//
// How it works:
// 1. Start with the seed URL in a queue
// 2. Ask the fetcher for the page at the front of the queue
// 3. Keep the result, even if it is an error page
// 4. If the page has Markdown and the budget has room, pull links out of it
//    and add the unseen ones to the back of the queue
// 5. Repeat until the budget is spent or the queue is empty
// 6. Glue everything together into one CrawlResult
//
// The budget counts fetch attempts, not successes, so a site full of broken
// links can't keep us busy forever.
// =============================================================================

use std::collections::{HashSet, VecDeque};

use tracing::{debug, info, warn};

use crate::crawl::combine::combine_pages;
use crate::crawl::types::{CrawlRequest, CrawlResult, PageResult};
use crate::fetch::PageFetcher;
use crate::links::{extract_links, filter_same_origin};

/// Drives a crawl using whichever fetcher it was built with.
///
/// The orchestrator holds no per-run state, so one instance can serve many
/// concurrent `crawl` calls.
pub struct Orchestrator<F> {
    fetcher: F,
}

// Working set for a single crawl() call
//
// `queued` mirrors the contents of `queue` so the "already queued?" check
// doesn't have to scan the deque.
struct VisitState {
    visited: HashSet<String>,
    queue: VecDeque<String>,
    queued: HashSet<String>,
    results: Vec<PageResult>,
}

impl VisitState {
    fn new(seed: &str) -> Self {
        let mut state = Self {
            visited: HashSet::new(),
            queue: VecDeque::new(),
            queued: HashSet::new(),
            results: Vec::new(),
        };
        state.enqueue(seed.to_string());
        state
    }

    fn next(&mut self) -> Option<String> {
        let url = self.queue.pop_front()?;
        self.queued.remove(&url);
        Some(url)
    }

    // Returns false when the URL was already visited or is waiting in the queue
    fn enqueue(&mut self, url: String) -> bool {
        if self.visited.contains(&url) || self.queued.contains(&url) {
            return false;
        }
        self.queued.insert(url.clone());
        self.queue.push_back(url);
        true
    }

    fn has_budget(&self, page_budget: usize) -> bool {
        self.results.len() < page_budget
    }

    // Pulls links out of the page we just fetched and queues the new ones
    fn enqueue_links_from_last(&mut self, page_url: &str, same_origin_only: bool) -> usize {
        let Some(markdown) = self.results.last().map(|page| page.markdown.as_str()) else {
            return 0;
        };

        let mut links = extract_links(markdown, page_url);
        if same_origin_only {
            links = filter_same_origin(&links, page_url);
        }

        links.into_iter().filter(|link| self.enqueue(link.clone())).count()
    }
}

impl<F: PageFetcher> Orchestrator<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Crawls up to `page_budget` pages starting at the request's seed.
    ///
    /// Never returns an error: failures end up in `CrawlResult::error`, with
    /// whatever Markdown was collected before things went wrong.
    pub async fn crawl(&self, request: &CrawlRequest) -> CrawlResult {
        let options = request.options();
        let page_budget = options.page_budget;

        info!(
            seed = %request.seed_url(),
            page_budget,
            same_origin_only = options.same_origin_only,
            "Starting crawl"
        );

        let mut state = VisitState::new(request.seed_url());

        while state.has_budget(page_budget) {
            let Some(url) = state.next() else {
                debug!("Queue is empty, stopping early");
                break;
            };

            // A URL can't be queued twice, but it may have been visited
            // since it was queued
            if !state.visited.insert(url.clone()) {
                debug!(%url, "Skipping already visited URL");
                continue;
            }

            debug!(%url, page = state.results.len() + 1, "Fetching page");

            let pages = match self.fetcher.fetch_page(&url, &options.fetch).await {
                Ok(pages) => pages,
                Err(e) => {
                    warn!(%url, error = %e, "Fetcher failed, aborting crawl");
                    return CrawlResult::failure(format!("{:#}", e));
                }
            };

            // We ask for one page at a time, so only the first result counts
            let Some(page) = pages.into_iter().next() else {
                debug!(%url, "Fetcher returned no pages");
                continue;
            };

            if let Some(error) = &page.error {
                warn!(%url, %error, "Page fetch failed");
            }

            let expand = page.is_ok() && !page.markdown.is_empty();
            state.results.push(page);

            if expand && state.has_budget(page_budget) {
                let added = state.enqueue_links_from_last(&url, options.same_origin_only);
                debug!(%url, added, queued = state.queue.len(), "Enqueued links");
            }
        }

        info!(pages = state.results.len(), "Crawl finished");

        combine_pages(state.results)
    }
}
