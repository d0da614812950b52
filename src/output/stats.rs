//! Crawl statistics
//!
//! Counters gathered by the pipeline while it runs, and a plain-text report
//! printed at the end of a crawl.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlStatistics {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration: Duration,

    /// Listing pages in the requested range
    pub pages_requested: u32,

    /// Listing pages that were given up on
    pub pages_failed: u32,

    /// Detail links pushed to the work queue
    pub items_discovered: usize,

    /// Records produced by consumers
    pub records_extracted: usize,

    /// Failed attempts that were put back on the queue
    pub requeued: usize,

    /// Items dropped after exhausting their retries
    pub abandoned: usize,

    pub consumers: usize,
}

impl CrawlStatistics {
    /// Percentage of discovered items that produced a record
    pub fn success_rate(&self) -> f64 {
        if self.items_discovered == 0 {
            return 0.0;
        }
        (self.records_extracted as f64 / self.items_discovered as f64) * 100.0
    }

    /// Records per second over the whole run
    pub fn throughput(&self) -> f64 {
        let seconds = self.duration.as_secs_f64();
        if seconds == 0.0 {
            return 0.0;
        }
        self.records_extracted as f64 / seconds
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Run:");
    println!("  Started:  {}", stats.started_at.to_rfc3339());
    println!("  Finished: {}", stats.finished_at.to_rfc3339());
    println!("  Duration: {:.2}s", stats.duration.as_secs_f64());
    println!("  Consumers: {}", stats.consumers);
    println!();

    println!("Listing pages:");
    println!("  Requested: {}", stats.pages_requested);
    println!("  Failed: {}", stats.pages_failed);
    println!();

    println!("Documents:");
    println!("  Discovered: {}", stats.items_discovered);
    println!("  Extracted: {}", stats.records_extracted);
    println!("  Requeued attempts: {}", stats.requeued);
    println!("  Abandoned: {}", stats.abandoned);
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} documents, {:.2} documents/sec)",
        stats.success_rate(),
        stats.records_extracted,
        stats.items_discovered,
        stats.throughput()
    );
}
