//! HTTP fetcher implementation
//!
//! This module handles the page request for a crawl:
//! - Building the HTTP client with the crawler's user agent
//! - Content negotiation headers
//! - Redirect following (the final URL is reported)
//! - Response size enforcement
//! - Error classification

use crate::config::Config;
use crate::CrawlError;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{redirect::Policy, Client, Response};
use std::time::Duration;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.5";
const MAX_REDIRECTS: usize = 10;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,
    /// Page body, decoded as UTF-8 (invalid sequences replaced)
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// The client carries the `Name/Version` user agent and the page timeout, and
/// transparently decodes gzip, deflate and brotli bodies.
///
/// # Example
///
/// ```no_run
/// use open_crawler::config::Config;
/// use open_crawler::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(config.crawler.request_timeout())
        .connect_timeout(Duration::from_secs(10).min(config.crawler.request_timeout()))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .deflate(true)
        .brotli(true)
        .build()
}

/// Performs bounded page requests
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    max_page_size: usize,
}

impl PageFetcher {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            max_page_size: config.crawler.max_page_size,
        }
    }

    pub fn max_page_size(&self) -> usize {
        self.max_page_size
    }

    /// Fetches a page
    ///
    /// # Errors
    ///
    /// | Condition | Error |
    /// |-----------|-------|
    /// | Timeout (connect or body) | `Timeout` |
    /// | Declared or streamed body over the limit | `SizeExceeded` |
    /// | Non-2xx status after redirects | `HttpStatus` |
    /// | Connection failure | `NetworkUnreachable` |
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, CrawlError> {
        let mut response = self
            .client
            .get(url)
            .header(ACCEPT, ACCEPT_HTML)
            .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_VALUE)
            .header("DNT", "1")
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        let final_url = response.url().to_string();

        if !status.is_success() {
            return Err(CrawlError::HttpStatus {
                url: final_url,
                status: status.as_u16(),
            });
        }

        let body = read_capped_body(&mut response, &final_url, self.max_page_size).await?;

        tracing::debug!(
            "Fetched {} ({} bytes, status {})",
            final_url,
            body.len(),
            status.as_u16()
        );

        Ok(FetchedPage {
            final_url,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

/// Reads a response body, failing once it exceeds `limit` bytes
///
/// A declared `Content-Length` over the limit fails before any byte is read;
/// otherwise the limit is enforced as chunks arrive.
pub(crate) async fn read_capped_body(
    response: &mut Response,
    url: &str,
    limit: usize,
) -> Result<Vec<u8>, CrawlError> {
    let size_exceeded = || CrawlError::SizeExceeded {
        url: url.to_string(),
        limit,
    };

    if let Some(length) = response.content_length() {
        if length > limit as u64 {
            return Err(size_exceeded());
        }
    }

    let mut body: Vec<u8> = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(|e| classify_error(url, e))? {
        if body.len() + chunk.len() > limit {
            return Err(size_exceeded());
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

/// Maps a transport error onto the crawl error taxonomy
pub(crate) fn classify_error(url: &str, error: reqwest::Error) -> CrawlError {
    if error.is_timeout() {
        CrawlError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() || error.is_request() {
        CrawlError::NetworkUnreachable {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else if error.is_redirect() {
        CrawlError::Unknown(format!("Too many redirects from {}", url))
    } else {
        CrawlError::Unknown(format!("Failed to fetch {}: {}", url, error))
    }
}
