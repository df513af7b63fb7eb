// src/crawl/mod.rs
// =============================================================================
// This module handles multi-page crawling.
//
// Features:
// - Breadth-first traversal starting from a seed URL
// - A page budget is the only stopping rule (no separate depth limit)
// - Same-origin restriction by default
// - Partial failures are kept: one bad page never throws away the others
//
// Pages are fetched one at a time in queue order, so the output is the same
// for the same site every time.
// =============================================================================

mod combine;
mod queue;
mod types;

pub use queue::Orchestrator;
pub use types::{CrawlRequest, CrawlResult, PageResult};
