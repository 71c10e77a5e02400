//! Open Crawler main entry point
//!
//! This is the command-line interface for crawling a single page.

use anyhow::Context;
use clap::{Parser, Subcommand};
use open_crawler::config::{load_config, Config};
use open_crawler::{CrawlRequest, Crawler, OutputFormat};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Open Crawler: a polite single-page fetcher
///
/// Fetches one page while respecting robots.txt and crawl delays, and prints
/// its main content as text, Markdown, XML or JSON.
#[derive(Parser, Debug)]
#[command(name = "open-crawler")]
#[command(version = "1.0.0")]
#[command(about = "A polite single-page fetcher", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a page and print the result as JSON
    Crawl {
        /// Page to crawl; `https://` is assumed when no scheme is given
        url: String,

        /// CSS selector scoping the extracted content
        #[arg(short, long)]
        selector: Option<String>,

        /// Output format: text, markdown, xml or json
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the robots.txt decision for a URL
    CheckRobots {
        /// URL to check
        url: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<open_crawler::CrawlError>() {
                Some(crawl_error) => eprintln!("error [{:?}]: {}", crawl_error.kind(), crawl_error),
                None => eprintln!("error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    let crawler = Crawler::from_config(&config)?;

    match cli.command {
        Command::Crawl {
            url,
            selector,
            format,
        } => {
            let mut request = CrawlRequest::new(url).with_format(format);
            if let Some(selector) = selector {
                request = request.with_selector(selector);
            }

            let result = crawler.crawl(&request).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::CheckRobots { url } => {
            let decision = crawler.check_policy(&url).await;
            println!("{}", serde_json::to_string_pretty(&decision)?);
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout carries only the result.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("open_crawler=info,warn"),
            1 => EnvFilter::new("open_crawler=debug,info"),
            2 => EnvFilter::new("open_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
