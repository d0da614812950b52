//! Paper-Trawl: a rank-preserving listing crawler
//!
//! This crate walks the result pages of a paginated document-listing service,
//! queues every detail page it discovers in a stable (page, position) order, and
//! extracts a structured record from each detail page by interpreting a
//! declarative extraction schema against a live browser session.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod model;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for Paper-Trawl operations
#[derive(Debug, Error)]
pub enum TrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser error: {0}")]
    Browser(#[from] browser::BrowserError),

    #[error("No working driver and browser pair found (searched: {searched})")]
    NoBrowserFound { searched: String },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Listing page {page} rendered no results")]
    EmptyListing { page: u32 },

    #[error("Schema evaluation failed: {0}")]
    Schema(#[from] extract::SchemaError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to parse schema file: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(#[from] ::url::ParseError),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),
}

/// Result type alias for Paper-Trawl operations
pub type Result<T> = std::result::Result<T, TrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use extract::{ExtractionNode, Schema, Transform};
pub use model::{Rank, ResultRecord, WorkItem};
