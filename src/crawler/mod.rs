//! Crawler module for the listing/detail pipeline
//!
//! This module contains the core crawling logic, including:
//! - The work queue between producers and consumers
//! - Listing page producers and detail page consumers
//! - Retry policy for transient failures
//! - Result collection and overall pipeline coordination

mod collector;
mod consumer;
mod coordinator;
mod producer;
mod queue;
mod retry;

pub use collector::{ResultCollector, ResultSender};
pub use consumer::{ConsumerContext, ConsumerReport, DetailConsumer};
pub use coordinator::{CrawlReport, Pipeline};
pub use producer::{ListingSettings, PageProducer};
pub use queue::{QueueStats, WorkQueue};
pub use retry::RetryPolicy;

use crate::browser::SessionFactory;
use crate::config::Config;
use crate::extract::Schema;
use crate::TrawlError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open one browser session per listing page and per consumer
/// 2. Discover detail pages on every listing page
/// 3. Extract a record from every discovered detail page
/// 4. Return the records sorted by rank, with run statistics
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `factory` - Opens browser sessions
/// * `schema` - The extraction schema for detail pages
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed
/// * `Err(TrawlError)` - Crawl could not start
pub async fn crawl<F: SessionFactory>(
    config: Config,
    factory: F,
    schema: Schema,
) -> Result<CrawlReport, TrawlError> {
    Pipeline::new(config, factory, schema).run().await
}
