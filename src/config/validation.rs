use crate::config::types::{Config, CrawlerConfig, UserAgentConfig};
use crate::robots::MAX_CRAWL_DELAY_SECS;
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.request_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_ms must be greater than 0".to_string(),
        ));
    }

    if config.robots_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "robots_timeout_ms must be greater than 0".to_string(),
        ));
    }

    if config.max_page_size == 0 {
        return Err(ConfigError::Validation(
            "max_page_size must be greater than 0".to_string(),
        ));
    }

    if !(0.0..=MAX_CRAWL_DELAY_SECS).contains(&config.minimum_crawl_delay) {
        return Err(ConfigError::Validation(format!(
            "minimum_crawl_delay must be between 0 and {} seconds, got {}",
            MAX_CRAWL_DELAY_SECS, config.minimum_crawl_delay
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    Ok(())
}
