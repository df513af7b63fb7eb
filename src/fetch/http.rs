// src/fetch/http.rs
// =============================================================================
// The real page fetcher: downloads one URL and turns it into a PageResult.
//
// Steps for each page:
// 1. Reject URLs we can't fetch (bad syntax, non-http schemes)
// 2. Serve it from the disk cache if we have it
// 3. Check robots.txt (unless told not to)
// 4. GET the page with the caller's timeout, user agent and cookies
// 5. Convert HTML to Markdown; plain-text bodies are used as they are
// 6. Store successful pages in the cache
//
// Every failure in steps 1-5 becomes an error *inside* the PageResult, so the
// crawler can carry on with the next page. Only an unreadable cookie file is
// returned as Err, because every later page would fail the same way. A cookie
// file is read once per fetcher and reused for every page after that.
// =============================================================================

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, COOKIE, USER_AGENT};
use reqwest::{Client, Response};
use tokio::sync::{Mutex, Semaphore};
use url::Url;

use crate::cache::PageCache;
use crate::config::FetchOptions;
use crate::crawl::PageResult;
use crate::fetch::cookies::CookieJar;
use crate::fetch::html::parse_page;
use crate::fetch::robots::RobotsCache;
use crate::fetch::PageFetcher;

/// User agent sent when the caller doesn't choose one.
pub const DEFAULT_USER_AGENT: &str = concat!("read-website/", env!("CARGO_PKG_VERSION"));

/// Fetches pages over HTTP with reqwest.
///
/// Cheap to share: the reqwest client pools connections, robots.txt rules
/// are remembered per origin and cookie files per path, for the fetcher's
/// lifetime.
pub struct HttpPageFetcher {
    client: Client,
    permits: Semaphore,
    robots: RobotsCache,
    cookie_jars: Mutex<HashMap<PathBuf, Arc<CookieJar>>>,
}

impl HttpPageFetcher {
    /// Builds a fetcher that keeps at most `max_concurrency` requests in flight.
    pub fn new(max_concurrency: usize) -> Result<Self> {
        let max_concurrency = max_concurrency.max(1);

        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(5))
            .pool_max_idle_per_host(max_concurrency)
            .pool_idle_timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            permits: Semaphore::new(max_concurrency),
            robots: RobotsCache::default(),
            cookie_jars: Mutex::new(HashMap::new()),
        })
    }

    // Loads a cookie file the first time it is asked for
    async fn cookie_jar(&self, path: &Path) -> Result<Arc<CookieJar>> {
        let mut jars = self.cookie_jars.lock().await;
        if let Some(jar) = jars.get(path) {
            return Ok(Arc::clone(jar));
        }

        let jar = Arc::new(CookieJar::load(path).await?);
        tracing::debug!(path = %path.display(), "Loaded cookies file");
        jars.insert(path.to_path_buf(), Arc::clone(&jar));
        Ok(jar)
    }

    async fn fetch_uncached(&self, url: &Url, options: &FetchOptions, cookies: Option<&CookieJar>) -> PageResult {
        let user_agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);

        if options.respect_robots
            && !self
                .robots
                .is_allowed(&self.client, url, user_agent, options.timeout)
                .await
        {
            tracing::info!(%url, "Blocked by robots.txt");
            return PageResult::failed(url.as_str(), "Blocked by robots.txt");
        }

        let mut request = self
            .client
            .get(url.clone())
            .timeout(options.timeout)
            .header(USER_AGENT, user_agent);

        if let Some(cookie_header) = cookies.and_then(|jar| jar.header_for(url)) {
            request = request.header(COOKIE, cookie_header);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return PageResult::failed(url.as_str(), describe_error(&e)),
        };

        let status = response.status();
        if !status.is_success() {
            return PageResult::failed(url.as_str(), format!("HTTP {}", status));
        }

        page_from_response(url, response).await
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, url: &str, options: &FetchOptions) -> Result<Vec<PageResult>> {
        let cookies = match &options.cookies_file {
            Some(path) => Some(self.cookie_jar(path).await?),
            None => None,
        };

        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => return Ok(vec![PageResult::failed(url, format!("Invalid URL: {}", e))]),
        };
        if !matches!(parsed.scheme(), "http" | "https") {
            return Ok(vec![PageResult::failed(
                url,
                format!("Unsupported URL scheme: {}", parsed.scheme()),
            )]);
        }

        let cache = PageCache::new(&options.cache_dir);
        match cache.get(url).await {
            Ok(Some(page)) => {
                tracing::debug!(%url, "Cache hit");
                return Ok(vec![page]);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(%url, error = %e, "Ignoring unreadable cache entry"),
        }

        let _permit = self.permits.acquire().await.context("HTTP fetcher is shutting down")?;
        tracing::info!(%url, "Fetching page");

        // Keep the URL we were asked for, so the crawler's visited set stays consistent
        let mut page = self.fetch_uncached(&parsed, options, cookies.as_deref()).await;
        page.url = url.to_string();

        if page.is_ok() {
            if let Err(e) = cache.put(&page).await {
                tracing::warn!(%url, cache_dir = %cache.dir().display(), error = %e, "Could not write cache entry");
            }
        }

        Ok(vec![page])
    }
}

// Builds the page from a successful response
//
// Relative links are resolved against the URL the body was actually served
// from, which differs from `url` after a redirect (/docs -> /docs/).
async fn page_from_response(url: &Url, response: Response) -> PageResult {
    let final_url = response.url().clone();
    if final_url != *url {
        tracing::debug!(%url, %final_url, "Followed redirect");
    }

    let is_html = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("html"))
        .unwrap_or(true);

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => return PageResult::failed(url.as_str(), format!("Failed to read response body: {}", e)),
    };

    if !is_html {
        return PageResult {
            url: url.to_string(),
            markdown: body.trim().to_string(),
            ..Default::default()
        };
    }

    let parsed = parse_page(&body, &final_url);
    PageResult {
        url: url.to_string(),
        markdown: parsed.markdown,
        title: parsed.title,
        links: Some(parsed.links),
        error: None,
    }
}

// Categorizes reqwest errors into short, readable messages
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure
// - SSL certificate issues
// - Too many redirects
fn describe_error(error: &reqwest::Error) -> String {
    let error_string = error.to_string();

    if error.is_timeout() {
        "Request timed out".to_string()
    } else if error.is_redirect() {
        "Too many redirects".to_string()
    } else if error.is_connect() {
        if error_string.contains("dns") {
            "Could not resolve hostname".to_string()
        } else {
            "Connection failed".to_string()
        }
    } else if error_string.contains("certificate") || error_string.contains("ssl") {
        "SSL certificate error".to_string()
    } else {
        error_string
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};
    use std::io::Write;

    fn options(cache_dir: &std::path::Path) -> FetchOptions {
        FetchOptions {
            cache_dir: cache_dir.to_path_buf(),
            timeout: Duration::from_secs(5),
            ..Default::default()
        }
    }

    async fn fetch_one(fetcher: &HttpPageFetcher, url: &str, options: &FetchOptions) -> PageResult {
        let mut pages = fetcher.fetch_page(url, options).await.unwrap();
        assert_eq!(pages.len(), 1);
        pages.remove(0)
    }

    #[tokio::test]
    async fn test_html_page_is_converted() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/docs");
                then.status(200)
                    .header("content-type", "text/html; charset=utf-8")
                    .body(r#"<html><head><title>Docs</title></head><body><h1>Hello</h1><p>See <a href="/api">API</a>.</p></body></html>"#);
            })
            .await;

        let cache = tempfile::tempdir().unwrap();
        let fetcher = HttpPageFetcher::new(2).unwrap();
        let url = server.url("/docs");
        let page = fetch_one(&fetcher, &url, &options(cache.path())).await;

        mock.assert_async().await;
        assert_eq!(page.url, url);
        assert_eq!(page.title.as_deref(), Some("Docs"));
        assert!(page.markdown.contains("Hello"));
        assert!(page.markdown.contains(&format!("[API]({})", server.url("/api"))));
        assert_eq!(page.links, Some(vec![server.url("/api")]));
        assert!(page.error.is_none());
    }

    #[tokio::test]
    async fn test_plain_text_passes_through() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/README.md");
                then.status(200)
                    .header("content-type", "text/markdown")
                    .body("# Readme\n\n[link](/x)\n");
            })
            .await;

        let cache = tempfile::tempdir().unwrap();
        let fetcher = HttpPageFetcher::new(2).unwrap();
        let page = fetch_one(&fetcher, &server.url("/README.md"), &options(cache.path())).await;

        assert_eq!(page.markdown, "# Readme\n\n[link](/x)");
        assert!(page.title.is_none());
    }

    #[tokio::test]
    async fn test_http_error_is_reported_in_page() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing");
                then.status(404);
            })
            .await;

        let cache = tempfile::tempdir().unwrap();
        let fetcher = HttpPageFetcher::new(2).unwrap();
        let page = fetch_one(&fetcher, &server.url("/missing"), &options(cache.path())).await;

        assert_eq!(page.error.as_deref(), Some("HTTP 404 Not Found"));
        assert!(page.markdown.is_empty());
    }

    #[tokio::test]
    async fn test_second_fetch_is_served_from_cache() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/cached");
                then.status(200).header("content-type", "text/html").body("<p>Once</p>");
            })
            .await;

        let cache = tempfile::tempdir().unwrap();
        let fetcher = HttpPageFetcher::new(2).unwrap();
        let opts = options(cache.path());

        let first = fetch_one(&fetcher, &server.url("/cached"), &opts).await;
        let second = fetch_one(&fetcher, &server.url("/cached"), &opts).await;

        assert_eq!(first, second);
        mock.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn test_failed_pages_are_not_cached() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/flaky");
                then.status(500);
            })
            .await;

        let cache = tempfile::tempdir().unwrap();
        let fetcher = HttpPageFetcher::new(2).unwrap();
        let opts = options(cache.path());

        fetch_one(&fetcher, &server.url("/flaky"), &opts).await;
        fetch_one(&fetcher, &server.url("/flaky"), &opts).await;

        mock.assert_hits_async(2).await;
    }

    #[tokio::test]
    async fn test_robots_txt_blocks_page() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/robots.txt");
                then.status(200).body("User-agent: *\nDisallow: /private");
            })
            .await;
        let page_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/private/page");
                then.status(200).body("<p>secret</p>");
            })
            .await;

        let cache = tempfile::tempdir().unwrap();
        let fetcher = HttpPageFetcher::new(2).unwrap();
        let url = server.url("/private/page");

        let blocked = fetch_one(&fetcher, &url, &options(cache.path())).await;
        assert_eq!(blocked.error.as_deref(), Some("Blocked by robots.txt"));
        page_mock.assert_hits_async(0).await;

        let ignoring = FetchOptions {
            respect_robots: false,
            ..options(cache.path())
        };
        let page = fetch_one(&fetcher, &url, &ignoring).await;
        assert_eq!(page.markdown, "secret");
    }

    #[tokio::test]
    async fn test_user_agent_and_cookies_are_sent() {
        let server = MockServer::start_async().await;
        let host = Url::parse(&server.base_url()).unwrap().host_str().unwrap().to_string();
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/account")
                    .header("user-agent", "test-agent/1.0")
                    .header("cookie", "session=abc");
                then.status(200).header("content-type", "text/html").body("<p>Welcome</p>");
            })
            .await;

        let mut cookies = tempfile::NamedTempFile::new().unwrap();
        writeln!(cookies, "{}\tFALSE\t/\tFALSE\t0\tsession\tabc", host).unwrap();

        let cache = tempfile::tempdir().unwrap();
        let fetcher = HttpPageFetcher::new(2).unwrap();
        let opts = FetchOptions {
            user_agent: Some("test-agent/1.0".to_string()),
            cookies_file: Some(cookies.path().to_path_buf()),
            respect_robots: false,
            ..options(cache.path())
        };

        let page = fetch_one(&fetcher, &server.url("/account"), &opts).await;
        mock.assert_async().await;
        assert_eq!(page.markdown, "Welcome");
    }

    #[tokio::test]
    async fn test_relative_links_resolve_against_redirect_target() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/docs");
                then.status(301).header("location", server.url("/docs/"));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/docs/");
                then.status(200)
                    .header("content-type", "text/html")
                    .body(r#"<p><a href="intro">Intro</a></p>"#);
            })
            .await;

        let cache = tempfile::tempdir().unwrap();
        let fetcher = HttpPageFetcher::new(2).unwrap();
        let opts = FetchOptions {
            respect_robots: false,
            ..options(cache.path())
        };
        let page = fetch_one(&fetcher, &server.url("/docs"), &opts).await;

        assert_eq!(page.url, server.url("/docs"));
        assert_eq!(page.links, Some(vec![server.url("/docs/intro")]));
        assert!(page.markdown.contains(&format!("({})", server.url("/docs/intro"))));
    }

    #[tokio::test]
    async fn test_stalled_robots_txt_does_not_hang_fetch() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/robots.txt");
                then.status(200).delay(Duration::from_secs(20));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/page");
                then.status(200).header("content-type", "text/html").body("<p>Hello</p>");
            })
            .await;

        let cache = tempfile::tempdir().unwrap();
        let fetcher = HttpPageFetcher::new(2).unwrap();
        let opts = FetchOptions {
            timeout: Duration::from_millis(300),
            ..options(cache.path())
        };

        let started = std::time::Instant::now();
        let page = fetch_one(&fetcher, &server.url("/page"), &opts).await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(page.markdown, "Hello");
    }

    #[tokio::test]
    async fn test_cookie_file_is_read_once_per_fetcher() {
        let server = MockServer::start_async().await;
        let host = Url::parse(&server.base_url()).unwrap().host_str().unwrap().to_string();
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).header("cookie", "session=abc");
                then.status(200).header("content-type", "text/html").body("<p>Member</p>");
            })
            .await;

        let mut cookies = tempfile::NamedTempFile::new().unwrap();
        writeln!(cookies, "{}\tFALSE\t/\tFALSE\t0\tsession\tabc", host).unwrap();

        let cache = tempfile::tempdir().unwrap();
        let fetcher = HttpPageFetcher::new(2).unwrap();
        let opts = FetchOptions {
            cookies_file: Some(cookies.path().to_path_buf()),
            respect_robots: false,
            ..options(cache.path())
        };

        fetch_one(&fetcher, &server.url("/one"), &opts).await;

        // Gone from disk, but the fetcher already holds the cookies
        let path = cookies.into_temp_path();
        path.close().unwrap();
        let page = fetch_one(&fetcher, &server.url("/two"), &opts).await;

        assert_eq!(page.markdown, "Member");
        mock.assert_hits_async(2).await;
    }

    #[tokio::test]
    async fn test_missing_cookie_file_is_a_run_error() {
        let cache = tempfile::tempdir().unwrap();
        let fetcher = HttpPageFetcher::new(1).unwrap();
        let opts = FetchOptions {
            cookies_file: Some(cache.path().join("missing.txt")),
            ..options(cache.path())
        };

        let result = fetcher.fetch_page("https://example.com/", &opts).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unfetchable_urls_become_page_errors() {
        let cache = tempfile::tempdir().unwrap();
        let fetcher = HttpPageFetcher::new(1).unwrap();
        let opts = options(cache.path());

        let page = fetch_one(&fetcher, "javascript:void(0)", &opts).await;
        assert_eq!(page.error.as_deref(), Some("Unsupported URL scheme: javascript"));

        let page = fetch_one(&fetcher, "not a url", &opts).await;
        assert!(page.error.unwrap().starts_with("Invalid URL"));
    }
}
