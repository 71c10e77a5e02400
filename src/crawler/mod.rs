//! Crawler module for single-page crawling
//!
//! This module contains the crawl pipeline, including:
//! - HTTP fetching with a size cap
//! - Content extraction from the fetched HTML
//! - Per-host rate limiting
//! - Overall crawl coordination

mod coordinator;
mod extractor;
mod fetcher;
mod rate_limiter;

pub use coordinator::{CrawlRequest, CrawlResult, Crawler};
pub use extractor::{ContentExtractor, ExtractedContent};
pub use fetcher::{build_http_client, FetchedPage, PageFetcher};
pub(crate) use fetcher::{classify_error, read_capped_body};
pub use rate_limiter::RateLimiter;

use crate::config::Config;
use crate::CrawlError;

/// Crawls a single page with a crawler built from `config`
///
/// Convenience for one-off use; the robots.txt cache and rate state are
/// discarded afterwards. Long-lived callers should keep a [`Crawler`].
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `request` - What to crawl and how to render it
///
/// # Returns
///
/// * `Ok(CrawlResult)` - Crawl completed successfully
/// * `Err(CrawlError)` - Crawl failed
pub async fn crawl(config: &Config, request: &CrawlRequest) -> Result<CrawlResult, CrawlError> {
    Crawler::from_config(config)?.crawl(request).await
}
