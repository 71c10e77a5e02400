//! Open Crawler: a polite single-page fetcher
//!
//! This crate fetches one web page on behalf of a caller, honours the host's
//! robots.txt and crawl delay, and converts the page's main content into plain
//! text, Markdown, XML or a structured JSON document.

pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod url;

use thiserror::Error;

/// Main error type for crawl operations
///
/// Each variant corresponds to exactly one [`ErrorKind`]; the kind is fixed at
/// the point of failure and never reconstructed from the message.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] UrlError),

    #[error("Crawling not allowed by robots.txt for {url}")]
    RobotsDenied { url: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Network error: unable to reach {url}: {message}")]
    NetworkUnreachable { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Page size exceeds maximum limit of {limit} bytes for {url}")]
    SizeExceeded { url: String, limit: usize },

    #[error("No elements found for selector: {selector}")]
    SelectorNotFound { selector: String },

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("No content extracted from the page")]
    ParseEmpty,

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    Unknown(String),
}

/// Coarse error classification exposed to transport adapters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidUrl,
    RobotsDenied,
    NetworkTimeout,
    NetworkUnreachable,
    HttpStatus,
    SizeExceeded,
    SelectorNotFound,
    ParseEmpty,
    UnsupportedFormat,
    Unknown,
}

impl CrawlError {
    /// Returns the taxonomy entry this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrl(_) => ErrorKind::InvalidUrl,
            Self::RobotsDenied { .. } => ErrorKind::RobotsDenied,
            Self::Timeout { .. } => ErrorKind::NetworkTimeout,
            Self::NetworkUnreachable { .. } => ErrorKind::NetworkUnreachable,
            Self::HttpStatus { .. } => ErrorKind::HttpStatus,
            Self::SizeExceeded { .. } => ErrorKind::SizeExceeded,
            Self::SelectorNotFound { .. } | Self::InvalidSelector { .. } => {
                ErrorKind::SelectorNotFound
            }
            Self::ParseEmpty => ErrorKind::ParseEmpty,
            Self::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            Self::Unknown(_) => ErrorKind::Unknown,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlRequest, CrawlResult, Crawler};
pub use output::OutputFormat;
pub use robots::PolicyDecision;
pub use url::{host_key, normalize_url, robots_url};
