use crate::browser::{BrowserKind, Selector};
use crate::url::SortMode;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Paper-Trawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub search: SearchConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// What to search for and how to read the listing pages
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Search term sent as `queryText`
    pub query: String,

    /// First listing page to crawl (1-based)
    #[serde(rename = "first-page", default = "default_first_page")]
    pub first_page: u32,

    /// Number of listing pages to crawl
    pub pages: u32,

    /// Optional result ordering
    #[serde(default)]
    pub sort: Option<SortMode>,

    /// Search endpoint, without a query string
    #[serde(rename = "listing-url", default = "default_listing_url")]
    pub listing_url: String,

    /// Matches every result entry of a listing page
    #[serde(rename = "result-selector", default = "default_result_selector")]
    pub result_selector: Selector,

    /// Matches the detail link inside one result entry
    #[serde(rename = "link-selector", default = "default_link_selector")]
    pub link_selector: Selector,

    /// Discovered links starting with any of these are dropped
    #[serde(rename = "exclude-prefixes", default = "default_exclude_prefixes")]
    pub exclude_prefixes: Vec<String>,
}

impl SearchConfig {
    /// Returns the listing page numbers to crawl
    pub fn page_range(&self) -> std::ops::RangeInclusive<u32> {
        let last = self
            .first_page
            .saturating_add(self.pages.saturating_sub(1));
        self.first_page..=last
    }
}

/// Crawl pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of detail-page consumers
    #[serde(default = "default_consumers")]
    pub consumers: usize,

    /// How long a document query waits for a first match (milliseconds)
    #[serde(rename = "query-timeout-ms", default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    /// How long to wait for a document to become interactive (milliseconds)
    #[serde(rename = "ready-timeout-ms", default = "default_ready_timeout_ms")]
    pub ready_timeout_ms: u64,

    /// Upper bound on a single navigation (milliseconds)
    #[serde(rename = "navigation-timeout-ms", default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,

    /// Interval between queue metric log lines (milliseconds)
    #[serde(rename = "metrics-interval-ms", default = "default_metrics_interval_ms")]
    pub metrics_interval_ms: u64,
}

impl CrawlerConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn metrics_interval(&self) -> Duration {
        Duration::from_millis(self.metrics_interval_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            consumers: default_consumers(),
            query_timeout_ms: default_query_timeout_ms(),
            ready_timeout_ms: default_ready_timeout_ms(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
            metrics_interval_ms: default_metrics_interval_ms(),
        }
    }
}

/// Retry behaviour for transient failures
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RetryConfig {
    /// Attempts per listing page or detail item; 0 retries forever
    #[serde(rename = "max-attempts", default)]
    pub max_attempts: u32,

    /// Linear backoff step (milliseconds)
    #[serde(rename = "backoff-ms", default)]
    pub backoff_ms: u64,
}

/// Browser configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Run browsers without a window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Maximum session operations in flight across all sessions
    #[serde(
        rename = "max-concurrent-operations",
        default = "default_max_concurrent_operations"
    )]
    pub max_concurrent_operations: usize,

    /// Drivers in priority order
    #[serde(default = "default_drivers")]
    pub drivers: Vec<DriverEntry>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            max_concurrent_operations: default_max_concurrent_operations(),
            drivers: default_drivers(),
        }
    }
}

/// A driver identifier and the browsers it can drive, in priority order
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DriverEntry {
    pub driver: String,
    pub browsers: Vec<BrowserKind>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the JSON results file
    #[serde(rename = "results-path", default = "default_results_path")]
    pub results_path: String,

    /// Optional JSON schema file replacing the built-in document schema
    #[serde(rename = "schema-path", default)]
    pub schema_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_path: default_results_path(),
            schema_path: None,
        }
    }
}

fn default_first_page() -> u32 {
    1
}

fn default_listing_url() -> String {
    "https://ieeexplore.ieee.org/search/searchresult.jsp".to_string()
}

fn default_result_selector() -> Selector {
    Selector::css(".List-results-items")
}

fn default_link_selector() -> Selector {
    Selector::css(
        "div:nth-child(1) > div:nth-child(1) > div:nth-child(2) > h3:nth-child(1) > a:nth-child(1)",
    )
}

fn default_exclude_prefixes() -> Vec<String> {
    vec!["https://ieeexplore.ieee.org/courses/".to_string()]
}

fn default_consumers() -> usize {
    5
}

fn default_query_timeout_ms() -> u64 {
    1_000
}

fn default_ready_timeout_ms() -> u64 {
    30_000
}

fn default_navigation_timeout_ms() -> u64 {
    60_000
}

fn default_metrics_interval_ms() -> u64 {
    1_000
}

fn default_headless() -> bool {
    true
}

fn default_max_concurrent_operations() -> usize {
    8
}

fn default_drivers() -> Vec<DriverEntry> {
    vec![DriverEntry {
        driver: "chromedriver".to_string(),
        browsers: vec![BrowserKind::Chromium, BrowserKind::Chrome],
    }]
}

fn default_results_path() -> String {
    "./results.json".to_string()
}
