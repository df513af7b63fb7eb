// src/fetch/robots.rs
// =============================================================================
// robots.txt support for the page fetcher.
//
// Rules are fetched once per origin and kept for the lifetime of the fetcher.
// A missing or unreachable robots.txt means "everything is allowed", which is
// what browsers and most crawlers assume.
// =============================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use robots_txt::matcher::SimpleMatcher;
use robots_txt::Robots;
use tokio::sync::Mutex;
use url::Url;

/// The robots.txt body for one origin, parsed on demand.
#[derive(Debug)]
pub struct RobotsTxt {
    text: Option<String>,
}

impl RobotsTxt {
    /// Rules that allow every path.
    pub fn allow_all() -> Self {
        Self { text: None }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    /// Fetches `<origin>/robots.txt` for the given page.
    ///
    /// Never fails: non-2xx responses, network errors and timeouts all fall
    /// back to allow-all, with a log line so the decision is visible.
    pub async fn fetch(client: &Client, page_url: &Url, user_agent: &str, timeout: Duration) -> Self {
        let Ok(robots_url) = page_url.join("/robots.txt") else {
            return Self::allow_all();
        };

        tracing::debug!(%robots_url, "Fetching robots.txt");

        let response = match client
            .get(robots_url.clone())
            .timeout(timeout)
            .header(reqwest::header::USER_AGENT, user_agent)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(%robots_url, error = %e, "Could not fetch robots.txt, allowing all");
                return Self::allow_all();
            }
        };

        if !response.status().is_success() {
            tracing::debug!(%robots_url, status = %response.status(), "No robots.txt, allowing all");
            return Self::allow_all();
        }

        match response.text().await {
            Ok(text) => Self::from_text(text),
            Err(e) => {
                tracing::warn!(%robots_url, error = %e, "Could not read robots.txt, allowing all");
                Self::allow_all()
            }
        }
    }

    /// Checks a URL's path against the section that applies to `user_agent`.
    pub fn is_allowed(&self, url: &Url, user_agent: &str) -> bool {
        let Some(text) = &self.text else {
            return true;
        };

        let robots = Robots::from_str_lossy(text);
        let section = robots.choose_section(user_agent);
        let matcher = SimpleMatcher::new(&section.rules);

        matcher.check_path(url.path())
    }
}

/// Per-origin robots.txt rules shared across fetches.
#[derive(Default)]
pub struct RobotsCache {
    by_origin: Mutex<HashMap<String, Arc<RobotsTxt>>>,
}

impl RobotsCache {
    pub async fn is_allowed(&self, client: &Client, url: &Url, user_agent: &str, timeout: Duration) -> bool {
        let origin = url.origin().ascii_serialization();

        // Held across the fetch so each origin is downloaded once; the fetch
        // itself is bounded by `timeout`
        let mut by_origin = self.by_origin.lock().await;
        let robots = match by_origin.get(&origin) {
            Some(robots) => Arc::clone(robots),
            None => {
                let robots = Arc::new(RobotsTxt::fetch(client, url, user_agent, timeout).await);
                by_origin.insert(origin, Arc::clone(&robots));
                robots
            }
        };
        drop(by_origin);

        robots.is_allowed(url, user_agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_allow_all_when_missing() {
        let robots = RobotsTxt::allow_all();
        let url = Url::parse("https://example.com/private/page").unwrap();
        assert!(robots.is_allowed(&url, "read-website"));
    }

    #[test]
    fn test_disallowed_path() {
        let robots = RobotsTxt::from_text("User-agent: *\nDisallow: /private/");
        let blocked = Url::parse("https://example.com/private/page").unwrap();
        let open = Url::parse("https://example.com/public/page").unwrap();
        assert!(!robots.is_allowed(&blocked, "read-website"));
        assert!(robots.is_allowed(&open, "read-website"));
    }

    #[tokio::test]
    async fn test_fetch_successful() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/robots.txt");
                then.status(200).body("User-agent: *\nDisallow: /secret");
            })
            .await;

        let client = Client::new();
        let page = Url::parse(&server.url("/docs")).unwrap();
        let robots = RobotsTxt::fetch(&client, &page, "read-website", TIMEOUT).await;

        assert_eq!(robots.text.as_deref(), Some("User-agent: *\nDisallow: /secret"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_not_found_allows_all() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/robots.txt");
                then.status(404);
            })
            .await;

        let client = Client::new();
        let page = Url::parse(&server.url("/docs")).unwrap();
        let robots = RobotsTxt::fetch(&client, &page, "read-website", TIMEOUT).await;

        assert!(robots.text.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_cache_fetches_once_per_origin() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/robots.txt");
                then.status(200).body("User-agent: *\nDisallow: /secret");
            })
            .await;

        let client = Client::new();
        let cache = RobotsCache::default();
        let open = Url::parse(&server.url("/docs")).unwrap();
        let blocked = Url::parse(&server.url("/secret/page")).unwrap();

        assert!(cache.is_allowed(&client, &open, "read-website", TIMEOUT).await);
        assert!(!cache.is_allowed(&client, &blocked, "read-website", TIMEOUT).await);
        mock.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn test_stalled_robots_txt_times_out_to_allow_all() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/robots.txt");
                then.status(200)
                    .body("User-agent: *\nDisallow: /")
                    .delay(Duration::from_secs(20));
            })
            .await;

        let client = Client::new();
        let cache = RobotsCache::default();
        let page = Url::parse(&server.url("/docs")).unwrap();

        let started = std::time::Instant::now();
        let allowed = cache
            .is_allowed(&client, &page, "read-website", Duration::from_millis(300))
            .await;

        assert!(allowed);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
