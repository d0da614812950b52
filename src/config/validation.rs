use crate::config::types::{BrowserConfig, Config, CrawlerConfig, OutputConfig, SearchConfig};
use crate::url::{listing_url, ListingQuery};
use crate::ConfigError;

const MAX_CONSUMERS: usize = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_search_config(&config.search)?;
    validate_crawler_config(&config.crawler)?;
    validate_browser_config(&config.browser)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates search configuration
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.query.trim().is_empty() {
        return Err(ConfigError::Validation("query cannot be empty".to_string()));
    }

    if config.first_page < 1 {
        return Err(ConfigError::Validation(format!(
            "first_page must be >= 1, got {}",
            config.first_page
        )));
    }

    if config.pages < 1 {
        return Err(ConfigError::Validation(format!(
            "pages must be >= 1, got {}",
            config.pages
        )));
    }

    listing_url(
        &config.listing_url,
        &ListingQuery::new(config.query.as_str(), config.first_page, config.sort),
    )
    .map_err(|e| ConfigError::InvalidUrl(format!("Invalid listing_url: {}", e)))?;

    if config.result_selector.is_blank() || config.link_selector.is_blank() {
        return Err(ConfigError::Validation(
            "result_selector and link_selector cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.consumers < 1 || config.consumers > MAX_CONSUMERS {
        return Err(ConfigError::Validation(format!(
            "consumers must be between 1 and {}, got {}",
            MAX_CONSUMERS, config.consumers
        )));
    }

    let timeouts = [
        ("query_timeout_ms", config.query_timeout_ms),
        ("ready_timeout_ms", config.ready_timeout_ms),
        ("navigation_timeout_ms", config.navigation_timeout_ms),
        ("metrics_interval_ms", config.metrics_interval_ms),
    ];
    for (name, value) in timeouts {
        if value == 0 {
            return Err(ConfigError::Validation(format!("{} must be > 0", name)));
        }
    }

    Ok(())
}

/// Validates browser configuration
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_operations < 1 {
        return Err(ConfigError::Validation(
            "max_concurrent_operations must be >= 1".to_string(),
        ));
    }

    if config.drivers.is_empty() {
        return Err(ConfigError::Validation(
            "at least one driver must be configured".to_string(),
        ));
    }

    for entry in &config.drivers {
        if entry.driver.trim().is_empty() {
            return Err(ConfigError::Validation(
                "driver name cannot be empty".to_string(),
            ));
        }
        if entry.browsers.is_empty() {
            return Err(ConfigError::Validation(format!(
                "driver '{}' has no browsers",
                entry.driver
            )));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.results_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "results_path cannot be empty".to_string(),
        ));
    }

    if let Some(schema_path) = &config.schema_path {
        if schema_path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "schema_path cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}
