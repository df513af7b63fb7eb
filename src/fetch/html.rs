// src/fetch/html.rs
// =============================================================================
// This module turns an HTML page into the pieces a PageResult needs:
// - a Markdown rendering of the readable content
// - the page title
// - the absolute http(s) links the page contains
//
// We use two crates:
// - `scraper` parses the HTML into a DOM and finds elements with CSS
//   selectors (title, links, the <main>/<article> content root)
// - `htmd` converts the selected HTML to Markdown
//
// Page chrome (scripts, styles, navigation, footers) is left out of the
// Markdown. Relative href/src attributes are made absolute before conversion
// so the Markdown still works once it is read away from the page.
// =============================================================================

use std::collections::HashSet;
use std::sync::LazyLock;

use htmd::HtmlToMarkdown;
use regex::{Captures, Regex};
use scraper::{Html, Selector};
use url::Url;

/// What we pulled out of one HTML document.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedPage {
    pub markdown: String,
    pub title: Option<String>,
    pub links: Vec<String>,
}

// Elements whose whole subtree is left out of the Markdown
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "svg", "nav", "footer", "header", "form", "iframe", "head",
];

// An href or src attribute inside a start tag, as scraper serializes it
// (always double quoted)
static URL_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(<[a-zA-Z][^>]*?\s(?:href|src)=")([^"]*)""#).expect("URL attribute pattern is valid")
});

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").expect("blank line pattern is valid"));

// Parses an HTML document
//
// Parameters:
//   html: the HTML content (borrowed as &str)
//   page_url: the URL the HTML was served from, for resolving relative links
//             (after redirects, so "intro" on /docs/ means /docs/intro)
pub fn parse_page(html: &str, page_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);
    let content = absolutize_urls(&content_html(&document), page_url);

    ParsedPage {
        markdown: to_markdown(&content),
        title: extract_title(&document),
        links: extract_links(&document, page_url),
    }
}

// The HTML to convert: <main> or <article> when the page has one (the rest is
// usually chrome), otherwise <body>, otherwise the whole document
fn content_html(document: &Html) -> String {
    ["main, article", "body"]
        .iter()
        .filter_map(|selector| Selector::parse(selector).ok())
        .find_map(|selector| document.select(&selector).next().map(|element| element.html()))
        .unwrap_or_else(|| document.root_element().html())
}

// Rewrites relative href/src values against the page URL
//
// Example (page = https://example.com/docs/intro):
//   <a href="setup">   -> <a href="https://example.com/docs/setup">
//   <img src="/a.png"> -> <img src="https://example.com/a.png">
//   <a href="#top">    -> unchanged
fn absolutize_urls(html: &str, page_url: &Url) -> String {
    URL_ATTRIBUTE
        .replace_all(html, |caps: &Captures| {
            let raw = caps[2].replace("&amp;", "&");
            let target = raw.trim();
            if target.is_empty() || target.starts_with('#') {
                return caps[0].to_string();
            }
            match page_url.join(target) {
                Ok(url) => format!("{}{}\"", &caps[1], url.as_str().replace('&', "&amp;")),
                Err(_) => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn to_markdown(html: &str) -> String {
    let converter = HtmlToMarkdown::builder()
        .skip_tags(SKIPPED_TAGS.to_vec())
        .build();

    match converter.convert(html) {
        Ok(markdown) => BLANK_LINES.replace_all(&markdown, "\n\n").trim().to_string(),
        Err(e) => {
            // Fallback: the visible text, without any formatting
            tracing::warn!(error = %e, "HTML to Markdown conversion failed, using plain text");
            let fragment = Html::parse_fragment(html);
            collapse_whitespace(&fragment.root_element().text().collect::<String>())
        }
    }
}

// <title>, falling back to the first <h1>
fn extract_title(document: &Html) -> Option<String> {
    ["title", "h1"].iter().find_map(|tag| {
        let selector = Selector::parse(tag).ok()?;
        let element = document.select(&selector).next()?;
        let text = collapse_whitespace(&element.text().collect::<String>());
        (!text.is_empty()).then_some(text)
    })
}

// Absolute http(s) links from every <a href>, deduplicated in document order
fn extract_links(document: &Html, page_url: &Url) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return vec![];
    };
    let mut seen = HashSet::new();

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_href(page_url, href))
        .filter(|link| seen.insert(link.clone()))
        .collect()
}

// Resolves an href against the page, keeping only web links
//
// Examples (page = https://example.com/docs/intro):
//   "/api"            -> Some("https://example.com/api")
//   "setup#install"   -> Some("https://example.com/docs/setup")
//   "#top"            -> None (same page)
//   "mailto:a@b.c"    -> None (not http)
fn resolve_href(page_url: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let mut url = page_url.join(href).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);
    Some(url.to_string())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
