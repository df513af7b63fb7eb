// src/output.rs
// =============================================================================
// Turns a CrawlResult into what the `fetch` command prints.
//
// Functions here only build strings; main.rs decides where they go and which
// exit code to use.
// =============================================================================

use anyhow::Result;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::crawl::CrawlResult;

// The JSON document printed by `json` and `both`
//
// `links` and `url` are always present; `title` and `error` only when set.
#[derive(Serialize)]
struct JsonOutput<'a> {
    markdown: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    links: &'a [String],
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

// Renders a crawl result for stdout
//
// Parameters:
//   result: what the crawl produced
//   url: the URL the user asked for, echoed in the JSON
//   format: markdown, json or both
//
// Returns None when there is nothing worth printing: a Markdown render of a
// crawl that produced no content. The caller then reports the error instead.
pub fn render(result: &CrawlResult, url: &str, format: OutputFormat) -> Result<Option<String>> {
    let rendered = match format {
        OutputFormat::Markdown => markdown(result),
        OutputFormat::Json => Some(json(result, url)?),
        // The JSON goes out even when there is no Markdown to put before it
        OutputFormat::Both => Some(match markdown(result) {
            Some(md) => format!("{}\n\n{}", md, json(result, url)?),
            None => json(result, url)?,
        }),
    };
    Ok(rendered)
}

/// Whether the crawl produced anything a reader can use.
pub fn has_content(result: &CrawlResult) -> bool {
    !result.markdown.trim().is_empty()
}

// The Markdown document, with a note at the end when some pages failed
fn markdown(result: &CrawlResult) -> Option<String> {
    if !has_content(result) {
        return None;
    }

    Some(match &result.error {
        Some(error) => format!("{}\n\n---\n*Note: {}*", result.markdown, error),
        None => result.markdown.clone(),
    })
}

fn json(result: &CrawlResult, url: &str) -> Result<String> {
    // Without content, only the error is worth reporting
    let failed = !has_content(result) && result.error.is_some();

    let output = JsonOutput {
        markdown: if failed { "" } else { result.markdown.as_str() },
        title: if failed { None } else { result.title.as_deref() },
        links: if failed { &[] } else { result.links.as_slice() },
        url,
        error: result.error.as_deref(),
    };
    Ok(serde_json::to_string_pretty(&output)?)
}
