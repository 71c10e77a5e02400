//! Robots.txt handling module
//!
//! This module fetches, parses and caches robots.txt files and answers the
//! two questions a crawl needs before touching a page: may this URL be
//! fetched, and how long must we wait between requests to its host.

mod cache;
mod parser;

pub use cache::RobotsCache;
pub use parser::ParsedRobots;

use crate::config::Config;
use crate::crawler::{classify_error, read_capped_body};
use crate::url::{host_key, robots_url};
use crate::CrawlError;
use dashmap::DashMap;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

/// Upper bound applied to any crawl delay, in seconds (one day)
pub const MAX_CRAWL_DELAY_SECS: f64 = 86_400.0;

/// Outcome of a robots.txt policy check
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PolicyDecision {
    /// Whether the URL may be fetched
    pub allowed: bool,

    /// Minimum spacing between requests to the host (seconds)
    #[serde(rename = "crawl_delay")]
    pub crawl_delay_seconds: f64,
}

impl PolicyDecision {
    /// Decision used when robots.txt cannot be retrieved
    pub fn permissive(crawl_delay_seconds: f64) -> Self {
        Self {
            allowed: true,
            crawl_delay_seconds,
        }
    }

    /// Decision used when the URL to check is itself malformed
    pub fn restrictive(crawl_delay_seconds: f64) -> Self {
        Self {
            allowed: false,
            crawl_delay_seconds,
        }
    }

    /// The crawl delay as a `Duration`, capped at [`MAX_CRAWL_DELAY_SECS`]
    ///
    /// A negative or NaN value yields zero.
    pub fn crawl_delay(&self) -> Duration {
        let seconds = self.crawl_delay_seconds.clamp(0.0, MAX_CRAWL_DELAY_SECS);
        Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO)
    }
}

/// Fetches robots.txt from the given location
///
/// Any transport failure, non-success status or body larger than `max_size`
/// is returned as an error; the caller decides what policy that implies.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `robots_url` - Absolute robots.txt URL
/// * `timeout` - Request timeout
/// * `max_size` - Largest accepted body, in bytes
///
/// # Returns
///
/// * `Ok(ParsedRobots)` - Successfully fetched and parsed robots.txt
/// * `Err(CrawlError)` - Failed to fetch
pub async fn fetch_robots(
    client: &Client,
    robots_url: &str,
    timeout: Duration,
    max_size: usize,
) -> Result<ParsedRobots, CrawlError> {
    let mut response = client
        .get(robots_url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| classify_error(robots_url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(CrawlError::HttpStatus {
            url: robots_url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = read_capped_body(&mut response, robots_url, max_size).await?;

    Ok(ParsedRobots::from_content(&String::from_utf8_lossy(&body)))
}

/// Resolves and caches per-host crawl policy
///
/// Never fails outward: an unreachable robots.txt yields the permissive
/// default (not cached, so the next call retries), while a URL that cannot be
/// parsed yields the restrictive default.
pub struct RobotsResolver {
    client: Client,
    cache: RobotsCache,
    /// Product token matched against `User-agent` groups
    agent: String,
    timeout: Duration,
    max_size: usize,
    minimum_delay: f64,
    /// Serializes the first fetch per host so concurrent misses fetch once
    fetch_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl RobotsResolver {
    /// Creates a resolver sharing the given HTTP client
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            cache: RobotsCache::new(),
            agent: config.user_agent.crawler_name.clone(),
            timeout: config.crawler.robots_timeout(),
            max_size: config.crawler.max_page_size,
            minimum_delay: config.crawler.minimum_crawl_delay,
            fetch_locks: DashMap::new(),
        }
    }

    /// Checks whether `url` may be crawled and with what delay
    ///
    /// # Algorithm
    ///
    /// 1. Derive the host key and `scheme://host/robots.txt`
    /// 2. Use the cached policy for the host, or fetch and cache it
    /// 3. `allowed` unless the matching group explicitly disallows the URL
    /// 4. `crawl_delay` from the matching group, defaulting to and floored at
    ///    the configured minimum
    pub async fn resolve_policy(&self, url: &str) -> PolicyDecision {
        let target = match Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => parsed,
            Ok(parsed) => {
                tracing::warn!("Unsupported scheme for robots check: {}", parsed.scheme());
                return PolicyDecision::restrictive(self.minimum_delay);
            }
            Err(e) => {
                tracing::warn!("Cannot check robots.txt for malformed URL {}: {}", url, e);
                return PolicyDecision::restrictive(self.minimum_delay);
            }
        };

        let (Some(host), Some(location)) = (host_key(&target), robots_url(&target)) else {
            tracing::warn!("Cannot check robots.txt for URL without host: {}", url);
            return PolicyDecision::restrictive(self.minimum_delay);
        };

        let Some(robots) = self.robots_for(&host, &location).await else {
            return PolicyDecision::permissive(self.minimum_delay);
        };

        Self::evaluate(&robots, target.as_str(), &self.agent, self.minimum_delay)
    }

    /// Cached robots.txt for `host`, fetching it on a miss
    ///
    /// Returns `None` when the fetch fails; failures are not cached.
    async fn robots_for(&self, host: &str, location: &str) -> Option<Arc<ParsedRobots>> {
        if let Some(robots) = self.cache.get(host) {
            tracing::debug!("robots.txt cache hit for {}", host);
            return Some(robots);
        }

        let lock = Arc::clone(&self.fetch_locks.entry(host.to_string()).or_default());
        let _guard = lock.lock().await;

        // Another task may have filled the cache while we waited
        if let Some(robots) = self.cache.get(host) {
            return Some(robots);
        }

        tracing::debug!("Fetching {}", location);
        match fetch_robots(&self.client, location, self.timeout, self.max_size).await {
            Ok(parsed) => Some(self.cache.insert(host, parsed)),
            Err(e) => {
                tracing::warn!("Failed to fetch robots.txt for {}: {}", host, e);
                None
            }
        }
    }

    fn evaluate(
        robots: &Arc<ParsedRobots>,
        url: &str,
        agent: &str,
        minimum_delay: f64,
    ) -> PolicyDecision {
        let allowed = robots.is_allowed(url, agent);
        let crawl_delay_seconds = robots
            .crawl_delay(agent)
            .filter(|delay| *delay > 0.0)
            .unwrap_or(minimum_delay)
            .max(minimum_delay)
            .min(MAX_CRAWL_DELAY_SECS);

        PolicyDecision {
            allowed,
            crawl_delay_seconds,
        }
    }

    /// Host-keyed cache of fetched robots.txt files
    pub fn cache(&self) -> &RobotsCache {
        &self.cache
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        self.fetch_locks.clear();
    }
}
