//! URL handling module for Open Crawler
//!
//! This module provides URL normalization and the host-derived keys used by
//! the robots cache and the rate limiter.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{host_key, robots_url};
pub use normalize::normalize_url;
