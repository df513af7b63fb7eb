// src/links/markdown.rs
// =============================================================================
// This module extracts links from Markdown text.
//
// Two shapes are recognised, scanned independently and then merged:
// 1. Inline links: [label](target)
// 2. Bare URLs:    https://example.com/doc sitting in plain text
//
// Relative inline targets are resolved against the page URL. Anything that
// does not resolve is skipped quietly; a broken link on a page is not an
// error for the crawl.
//
// We deliberately use regular expressions rather than a full CommonMark
// parser: the fetcher's Markdown is machine-generated, and bare URLs in plain
// text have to be picked up too.
// =============================================================================

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static INLINE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("inline link pattern is valid"));

static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s<>)\]]+").expect("bare URL pattern is valid"));

// Extracts every absolute URL referenced by a Markdown document
//
// Parameters:
//   markdown: the Markdown text (borrowed, we only read it)
//   base_url: the URL the Markdown came from, used for relative targets
//
// Returns: absolute URLs, deduplicated, in the order they first appear
//          (inline links first, then bare URLs)
//
// Example:
//   markdown = "See [docs](/docs) or https://example.com/blog"
//   base_url = "https://example.com/"
//   result   = ["https://example.com/docs", "https://example.com/blog"]
pub fn extract_links(markdown: &str, base_url: &str) -> Vec<String> {
    // A malformed base only breaks relative targets; absolute ones still parse
    let base = Url::parse(base_url).ok();

    let inline_targets = INLINE_LINK
        .captures_iter(markdown)
        .filter_map(|caps| caps.get(2))
        .map(|m| link_destination(m.as_str()))
        .filter(|target| !target.is_empty() && !is_skipped_target(target));

    let bare_urls = BARE_URL.find_iter(markdown).map(|m| m.as_str());

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for target in inline_targets.chain(bare_urls) {
        let Some(absolute) = resolve(base.as_ref(), target) else {
            continue;
        };

        // insert() returns false for duplicates, which keeps first-seen order
        if seen.insert(absolute.clone()) {
            links.push(absolute);
        }
    }

    links
}

// Pulls the destination out of an inline link body
//
// Handles the two decorations Markdown allows around a destination:
//   [a](/path "Title")  -> /path
//   [a](</path>)        -> /path
fn link_destination(raw: &str) -> &str {
    let raw = raw.trim();

    if let Some(rest) = raw.strip_prefix('<') {
        if let Some(end) = rest.find('>') {
            return &rest[..end];
        }
    }

    raw.split_whitespace().next().unwrap_or("")
}

// Same-page anchors and non-web schemes never lead to another page
fn is_skipped_target(target: &str) -> bool {
    target.starts_with('#') || target.starts_with("mailto:") || target.starts_with("tel:")
}

// Turns a target into an absolute URL string, or None if it can't be done
fn resolve(base: Option<&Url>, target: &str) -> Option<String> {
    match Url::parse(target) {
        Ok(url) => Some(url.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            base.and_then(|base| base.join(target).ok()).map(|url| url.to_string())
        }
        Err(_) => None,
    }
}
