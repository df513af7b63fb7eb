// src/crawl/combine.rs
// =============================================================================
// Merges the pages of one crawl into a single CrawlResult.
//
// Output shape for two pages, the second of which failed:
//
//   <!-- Source: https://example.com/a -->
//   # Page A
//
//
//   ---
//
//   <!-- Error fetching https://example.com/b: Request timed out -->
// =============================================================================

use std::collections::HashSet;

use crate::crawl::types::{CrawlResult, PageResult};

const NO_RESULTS: &str = "No results returned";
const PAGE_SEPARATOR: &str = "\n\n---\n\n";

pub(super) fn combine_pages(pages: Vec<PageResult>) -> CrawlResult {
    let Some(first) = pages.first() else {
        return CrawlResult::failure(NO_RESULTS);
    };
    let title = first.title.clone();
    let links = union_of_links(&pages);

    let failed: Vec<&PageResult> = pages.iter().filter(|page| !page.is_ok()).collect();

    // Nothing usable came back: report each failure instead of a page of
    // error comments
    if failed.len() == pages.len() {
        let details = failed
            .iter()
            .map(|page| format!("Failed to fetch {}: {}", page.url, page.error.as_deref().unwrap_or_default()))
            .collect::<Vec<_>>()
            .join("; ");

        return CrawlResult {
            markdown: String::new(),
            title,
            links,
            error: Some(details),
        };
    }

    let markdown = pages
        .iter()
        .enumerate()
        .map(|(index, page)| render_page(index, page))
        .collect::<Vec<_>>()
        .join("\n");

    let error = if failed.is_empty() {
        None
    } else {
        let urls = failed.iter().map(|page| page.url.as_str()).collect::<Vec<_>>();
        Some(format!("Some pages had errors: {}", urls.join(", ")))
    };

    CrawlResult {
        markdown,
        title,
        links,
        error,
    }
}

fn render_page(index: usize, page: &PageResult) -> String {
    let mut out = String::new();

    if index > 0 {
        out.push_str(PAGE_SEPARATOR);
    }

    match &page.error {
        Some(error) => {
            out.push_str(&format!("<!-- Error fetching {}: {} -->", page.url, error));
        }
        None => {
            out.push_str(&format!("<!-- Source: {} -->\n", page.url));
            out.push_str(&page.markdown);
        }
    }

    out
}

// Links each page reported about itself, deduplicated, first-seen order
fn union_of_links(pages: &[PageResult]) -> Vec<String> {
    let mut seen = HashSet::new();

    pages
        .iter()
        .filter_map(|page| page.links.as_ref())
        .flatten()
        .filter(|link| seen.insert(link.as_str()))
        .cloned()
        .collect()
}
