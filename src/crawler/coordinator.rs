//! Crawl coordinator - single-page crawl orchestration
//!
//! A crawl runs strictly in order, and the first failing stage ends it:
//! - Normalizing the requested URL
//! - Checking robots.txt policy for the host
//! - Waiting out the host's crawl delay
//! - Fetching the page
//! - Extracting title and content
//! - Rendering the requested output format

use crate::config::{validate, Config};
use crate::crawler::extractor::ContentExtractor;
use crate::crawler::fetcher::{build_http_client, PageFetcher};
use crate::crawler::rate_limiter::RateLimiter;
use crate::output::{ContentFormatter, OutputFormat};
use crate::robots::{PolicyDecision, RobotsResolver};
use crate::url::{host_key, normalize_url};
use crate::{CrawlError, UrlError};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Parameters of a single crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlRequest {
    /// Page to crawl; a missing scheme defaults to `https://`
    pub url: String,

    /// CSS selector scoping the extracted content
    #[serde(default)]
    pub selector: Option<String>,

    #[serde(default)]
    pub format: OutputFormat,
}

impl CrawlRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            selector: None,
            format: OutputFormat::default(),
        }
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }
}

/// Outcome of a successful crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlResult {
    /// Final URL after redirects
    pub url: String,
    pub title: String,
    /// Content rendered in `format`
    pub content: String,
    pub format: OutputFormat,
    /// RFC 3339 UTC time the crawl completed
    pub timestamp: String,
}

/// Main crawler structure
///
/// Owns the robots.txt cache and the per-host rate state; both live as long
/// as the crawler and are shared by every crawl made through it, including
/// concurrent ones.
pub struct Crawler {
    robots: RobotsResolver,
    limiter: RateLimiter,
    fetcher: PageFetcher,
    extractor: ContentExtractor,
    formatter: ContentFormatter,
}

impl Crawler {
    /// Creates a crawler from already constructed components
    pub fn new(
        robots: RobotsResolver,
        limiter: RateLimiter,
        fetcher: PageFetcher,
        extractor: ContentExtractor,
        formatter: ContentFormatter,
    ) -> Self {
        Self {
            robots,
            limiter,
            fetcher,
            extractor,
            formatter,
        }
    }

    /// Creates a crawler whose components share one HTTP client
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Successfully created crawler
    /// * `Err(CrawlError)` - Invalid configuration or HTTP client failure
    pub fn from_config(config: &Config) -> Result<Self, CrawlError> {
        validate(config).map_err(|e| CrawlError::Unknown(e.to_string()))?;

        let client = build_http_client(config)
            .map_err(|e| CrawlError::Unknown(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::new(
            RobotsResolver::new(client.clone(), config),
            RateLimiter::new(),
            PageFetcher::new(client, config),
            ContentExtractor::new(),
            ContentFormatter::new(),
        ))
    }

    /// Crawls one page
    ///
    /// No stage is retried; the error of the first failing stage is returned
    /// unchanged.
    ///
    /// # Errors
    ///
    /// * `InvalidUrl` - The URL does not normalize to an http(s) URL
    /// * `RobotsDenied` - robots.txt disallows the URL for this agent
    /// * `Timeout`, `NetworkUnreachable`, `HttpStatus`, `SizeExceeded` - Fetch failures
    /// * `SelectorNotFound`, `InvalidSelector`, `ParseEmpty` - Extraction failures
    pub async fn crawl(&self, request: &CrawlRequest) -> Result<CrawlResult, CrawlError> {
        let url = normalize_url(&request.url)?;
        tracing::debug!("Crawling {}", url);

        let policy = self.robots.resolve_policy(url.as_str()).await;
        if !policy.allowed {
            tracing::info!("Blocked by robots.txt: {}", url);
            return Err(CrawlError::RobotsDenied {
                url: url.to_string(),
            });
        }

        let host = host_key(&url).ok_or(UrlError::MissingHost)?;
        self.limiter
            .wait_before_next_request(&host, policy.crawl_delay())
            .await;

        let page = self.fetcher.fetch(url.as_str()).await?;
        let extracted = self
            .extractor
            .extract(&page.body, request.selector.as_deref())?;
        let content =
            self.formatter
                .render(&extracted.fragment, request.format, Some(&extracted.title))?;

        tracing::info!(
            "Crawled {} ({} bytes, {} format)",
            page.final_url,
            page.body.len(),
            request.format
        );

        Ok(CrawlResult {
            url: page.final_url,
            title: extracted.title,
            content,
            format: request.format,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }

    /// Reports whether `url` may be crawled and the delay that applies
    ///
    /// The URL is checked as given, without normalization; a URL that does
    /// not parse is reported as disallowed.
    pub async fn check_policy(&self, url: &str) -> PolicyDecision {
        self.robots.resolve_policy(url).await
    }

    /// Forgets cached robots.txt files and per-host request times
    pub fn clear_cache(&self) {
        self.robots.clear_cache();
        self.limiter.clear_state();
    }

    pub fn robots(&self) -> &RobotsResolver {
        &self.robots
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}
