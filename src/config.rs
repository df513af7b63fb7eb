// src/config.rs
// =============================================================================
// Explicit configuration for a crawl run.
//
// Nothing below main() reads environment variables or global state: main
// resolves CLI flags (and their env fallbacks) into these structs and hands
// them to the orchestrator, the fetcher and the logger.
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

/// Cache location used when none is given.
pub const DEFAULT_CACHE_DIR: &str = ".cache";

/// Options forwarded verbatim to the page fetcher on every call.
///
/// The orchestrator never interprets these; they only matter to whichever
/// `PageFetcher` is plugged in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Upper bound on requests the fetcher keeps in flight
    pub max_concurrency: usize,
    /// Whether robots.txt rules are honoured
    pub respect_robots: bool,
    /// Mirrors `CrawlOptions::same_origin_only` for fetchers that discover links themselves
    pub same_origin_only: bool,
    pub user_agent: Option<String>,
    pub cache_dir: PathBuf,
    pub timeout: Duration,
    /// Netscape-format cookie file for authenticated pages
    pub cookies_file: Option<PathBuf>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_concurrency: 3,
            respect_robots: true,
            same_origin_only: true,
            user_agent: None,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            timeout: Duration::from_millis(30_000),
            cookies_file: None,
        }
    }
}

/// Options that shape the traversal itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Maximum number of pages fetched in one run
    pub page_budget: usize,
    /// Only enqueue links that share the current page's origin
    pub same_origin_only: bool,
    pub fetch: FetchOptions,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            page_budget: 1,
            same_origin_only: true,
            fetch: FetchOptions::default(),
        }
    }
}

/// Log verbosity, chosen on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let options = CrawlOptions::default();
        assert_eq!(options.page_budget, 1);
        assert!(options.same_origin_only);
        assert_eq!(options.fetch.max_concurrency, 3);
        assert!(options.fetch.respect_robots);
        assert_eq!(options.fetch.cache_dir, PathBuf::from(".cache"));
        assert_eq!(options.fetch.timeout, Duration::from_secs(30));
        assert!(options.fetch.cookies_file.is_none());
    }

    #[test]
    fn test_log_level_directive() {
        assert_eq!(LogLevel::default().as_directive(), "warn");
        assert_eq!(LogLevel::Debug.as_directive(), "debug");
    }
}
