//! Output module for persisting crawl results
//!
//! This module handles:
//! - Writing the rank-ordered records to a JSON file
//! - Reporting crawl statistics

mod json;
pub mod stats;
mod traits;

pub use json::JsonOutput;
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{OutputError, OutputHandler, OutputResult};
