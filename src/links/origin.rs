// src/links/origin.rs
// =============================================================================
// Same-origin filtering.
//
// An origin is scheme + host + port, so http://example.com and
// https://example.com are different sites, and so are example.com and
// docs.example.com.
// =============================================================================

use url::Url;

// Keeps the links that live on the same origin as base_url
//
// If base_url itself can't be parsed we return nothing at all. Letting
// everything through would turn a typo in the seed URL into an unrestricted
// crawl.
pub fn filter_same_origin(links: &[String], base_url: &str) -> Vec<String> {
    let Ok(base) = Url::parse(base_url) else {
        return Vec::new();
    };
    let base_origin = base.origin();

    links
        .iter()
        .filter(|link| {
            Url::parse(link)
                .map(|url| url.origin() == base_origin)
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}
