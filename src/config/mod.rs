//! Configuration module for Paper-Trawl
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and resolving the extraction schema a crawl runs with.
//!
//! # Example
//!
//! ```no_run
//! use paper_trawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Searching for: {}", config.search.query);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserConfig, Config, CrawlerConfig, DriverEntry, OutputConfig, RetryConfig, SearchConfig,
};

pub use validation::validate;

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, load_schema, resolve_schema,
};

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    use crate::browser::Selector;

    Config {
        search: SearchConfig {
            query: "linux".to_string(),
            first_page: 1,
            pages: 2,
            sort: None,
            listing_url: "https://example.com/search".to_string(),
            result_selector: Selector::css(".result"),
            link_selector: Selector::css("a.title"),
            exclude_prefixes: vec!["https://example.com/courses/".to_string()],
        },
        crawler: CrawlerConfig {
            consumers: 2,
            query_timeout_ms: 10,
            ready_timeout_ms: 10,
            navigation_timeout_ms: 1_000,
            metrics_interval_ms: 50,
        },
        retry: RetryConfig::default(),
        browser: BrowserConfig::default(),
        output: OutputConfig::default(),
    }
}
