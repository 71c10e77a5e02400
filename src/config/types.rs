use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Open Crawler
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Hard timeout for the page request (milliseconds)
    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,

    /// Timeout for fetching robots.txt (milliseconds)
    #[serde(rename = "robots-timeout-ms")]
    pub robots_timeout_ms: u64,

    /// Maximum accepted response body size (bytes)
    #[serde(rename = "max-page-size")]
    pub max_page_size: usize,

    /// Crawl delay used when robots.txt gives none, and the floor for any
    /// delay it does give (seconds)
    #[serde(rename = "minimum-crawl-delay")]
    pub minimum_crawl_delay: f64,
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn robots_timeout(&self) -> Duration {
        Duration::from_millis(self.robots_timeout_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 30_000,
            robots_timeout_ms: 10_000,
            max_page_size: 10 * 1024 * 1024,
            minimum_crawl_delay: 1.0,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler, also the product token matched against robots.txt groups
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version`
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "OpenCrawler".to_string(),
            crawler_version: "1.0".to_string(),
        }
    }
}
