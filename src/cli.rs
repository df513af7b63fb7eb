// src/cli.rs
// =============================================================================
// Command-line interface, defined with clap's derive API.
//
// Three subcommands:
// - fetch:        crawl a site starting at a URL and print it as Markdown
// - cache-status: report how much the page cache holds
// - clear-cache:  delete the page cache
//
// Every option has a default, and a couple can come from the environment
// (LOG_LEVEL, READ_WEBSITE_CACHE_DIR). main.rs turns the parsed values into
// the option structs in config.rs.
// =============================================================================

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{LogLevel, DEFAULT_CACHE_DIR};

#[derive(Parser, Debug)]
#[command(
    name = "read-website",
    version,
    about = "Fetch a website and turn it into clean Markdown",
    long_about = "read-website crawls a site breadth-first from a starting URL, converts each page \
                  to Markdown and prints them as one document. Pages are cached on disk so \
                  repeated runs are fast."
)]
pub struct Cli {
    /// Log verbosity (logs go to stderr)
    #[arg(long, global = true, value_enum, env = "LOG_LEVEL", default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a page (and optionally the pages it links to) as Markdown
    ///
    /// Example: read-website fetch https://docs.rs/tokio --pages 5
    Fetch {
        /// URL to start from (http or https)
        url: String,

        /// How many pages to fetch, at most (1-100)
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..=100))]
        pages: u16,

        /// How many requests may be in flight at once
        #[arg(short, long, default_value_t = 3, value_parser = clap::value_parser!(u16).range(1..))]
        concurrency: u16,

        /// Ignore robots.txt
        #[arg(long)]
        no_robots: bool,

        /// Follow links to other origins too
        #[arg(long)]
        all_origins: bool,

        /// User-Agent header to send
        #[arg(short, long)]
        user_agent: Option<String>,

        #[command(flatten)]
        cache: CacheArgs,

        /// Per-request timeout in milliseconds
        #[arg(short, long, default_value_t = 30_000)]
        timeout: u64,

        /// Netscape-format cookies file, for pages behind a login
        #[arg(long)]
        cookies_file: Option<PathBuf>,

        /// What to print
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
        output: OutputFormat,
    },

    /// Show how many pages the cache holds and how much space they use
    CacheStatus {
        #[command(flatten)]
        cache: CacheArgs,
    },

    /// Delete every cached page
    ClearCache {
        #[command(flatten)]
        cache: CacheArgs,
    },
}

#[derive(clap::Args, Debug)]
pub struct CacheArgs {
    /// Directory for cached pages
    #[arg(long, env = "READ_WEBSITE_CACHE_DIR", default_value = DEFAULT_CACHE_DIR)]
    pub cache_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The combined Markdown document
    Markdown,
    /// The whole crawl result as JSON
    Json,
    /// Markdown, then the title/links/error metadata as JSON
    Both,
}
