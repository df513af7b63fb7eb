// src/main.rs
// =============================================================================
// Entry point of the read-website CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (to stderr)
// 3. Dispatch to the subcommand handler
// 4. Exit with a proper code (0 = success, 1 = no usable content, 2 = error)
//
// The crawl itself lives in crawl/; this file only wires the real HTTP
// fetcher into the orchestrator and prints what comes back.
// =============================================================================

mod cache;  // src/cache/ - on-disk page cache
mod cli;    // src/cli.rs - command-line parsing
mod config; // src/config.rs - option structs
mod crawl;  // src/crawl/ - breadth-first crawl orchestration
mod error;  // src/error.rs - typed errors
mod fetch;  // src/fetch/ - HTTP fetching and HTML to Markdown
mod links;  // src/links/ - link extraction from Markdown
mod logging; // src/logging.rs - tracing setup
mod output; // src/output.rs - rendering results

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands, OutputFormat};
use config::{CrawlOptions, FetchOptions};
use crawl::{CrawlRequest, Orchestrator};
use fetch::HttpPageFetcher;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = something was printed
//   Ok(1) = the crawl produced no content
//   Err   = bad input or an unexpected failure (exit code 2)
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::init(cli.log_level)?;

    match cli.command {
        Commands::Fetch {
            url,
            pages,
            concurrency,
            no_robots,
            all_origins,
            user_agent,
            cache,
            timeout,
            cookies_file,
            output,
        } => {
            let same_origin_only = !all_origins;
            let options = CrawlOptions {
                page_budget: usize::from(pages),
                same_origin_only,
                fetch: FetchOptions {
                    max_concurrency: usize::from(concurrency),
                    respect_robots: !no_robots,
                    same_origin_only,
                    user_agent,
                    cache_dir: cache.cache_dir,
                    timeout: Duration::from_millis(timeout),
                    cookies_file,
                },
            };
            handle_fetch(&url, options, output).await
        }
        Commands::CacheStatus { cache } => handle_cache_status(&cache.cache_dir).await,
        Commands::ClearCache { cache } => handle_clear_cache(&cache.cache_dir).await,
    }
}

// Handles the 'fetch' subcommand
// Parameters:
//   url: the page to start from
//   options: crawl and fetch options resolved from the CLI
//   format: what to print
async fn handle_fetch(url: &str, options: CrawlOptions, format: OutputFormat) -> Result<i32> {
    let request = CrawlRequest::new(url, options)?;
    let fetcher = HttpPageFetcher::new(request.options().fetch.max_concurrency)?;

    let result = Orchestrator::new(fetcher).crawl(&request).await;

    match output::render(&result, url, format)? {
        Some(text) => println!("{}", text),
        None => {
            let reason = result.error.as_deref().unwrap_or("No content returned");
            eprintln!("Error: {}", reason);
        }
    }

    Ok(if output::has_content(&result) { 0 } else { 1 })
}

// Handles the 'cache-status' subcommand: prints the size summary as JSON
async fn handle_cache_status(cache_dir: &Path) -> Result<i32> {
    let status = cache::status(cache_dir).await?;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(0)
}

// Handles the 'clear-cache' subcommand
async fn handle_clear_cache(cache_dir: &Path) -> Result<i32> {
    cache::clear(cache_dir).await?;
    let message = serde_json::json!({
        "status": "success",
        "message": "Cache cleared successfully",
    });
    println!("{}", serde_json::to_string_pretty(&message)?);
    Ok(0)
}
