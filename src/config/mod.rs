//! Configuration module for Open Crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every setting has a default, so an empty file (or no file at all) is valid.
//!
//! # Example
//!
//! ```no_run
//! use open_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Page timeout: {}ms", config.crawler.request_timeout_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
