//! Pipeline coordinator - main crawl orchestration logic
//!
//! This module wires the pipeline together:
//! - Opening one session per producer and per consumer
//! - Running one producer per listing page and a fixed pool of consumers
//! - Waiting for every discovered item to be settled
//! - Shutting the consumers and the metrics reporter down
//! - Returning the records in rank order

use crate::browser::{BrowserSession, PooledSession, SessionFactory, WorkerPool};
use crate::config::Config;
use crate::crawler::{
    ConsumerContext, ConsumerReport, DetailConsumer, ListingSettings, PageProducer,
    ResultCollector, RetryPolicy, WorkQueue,
};
use crate::extract::{Schema, Timeouts};
use crate::model::ResultRecord;
use crate::output::CrawlStatistics;
use crate::url::ExclusionList;
use crate::TrawlError;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Outcome of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Extracted records, sorted by rank
    pub records: Vec<ResultRecord>,
    pub statistics: CrawlStatistics,
}

/// Main crawl pipeline
pub struct Pipeline<F: SessionFactory> {
    config: Arc<Config>,
    factory: F,
    schema: Arc<Schema>,
    pool: WorkerPool,
}

impl<F: SessionFactory> Pipeline<F> {
    /// Creates a new pipeline
    ///
    /// # Arguments
    ///
    /// * `config` - The validated crawl configuration
    /// * `factory` - Opens the sessions used by producers and consumers
    /// * `schema` - The schema evaluated on every detail page
    pub fn new(config: Config, factory: F, schema: Schema) -> Self {
        let pool = WorkerPool::new(config.browser.max_concurrent_operations);
        Self {
            config: Arc::new(config),
            factory,
            schema: Arc::new(schema),
            pool,
        }
    }

    /// Runs the crawl to completion
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - Records in rank order plus run statistics
    /// * `Err(TrawlError)` - Sessions could not be opened
    pub async fn run(&self) -> Result<CrawlReport, TrawlError> {
        let started_at = Utc::now();
        let start_time = Instant::now();

        let pages: Vec<u32> = self.config.search.page_range().collect();
        let consumer_count = self.config.crawler.consumers;

        tracing::info!(
            "Starting crawl of {} listing pages for '{}' with {} consumers",
            pages.len(),
            self.config.search.query,
            consumer_count
        );

        let mut producer_sessions = self.open_sessions(pages.len() + consumer_count).await?;
        let consumer_sessions = producer_sessions.split_off(pages.len());

        let queue = Arc::new(WorkQueue::new());
        let collector = ResultCollector::new();
        let cancel = CancellationToken::new();

        let timeouts = Timeouts {
            query: self.config.crawler.query_timeout(),
            ready: self.config.crawler.ready_timeout(),
        };
        let retry = RetryPolicy::from_config(&self.config.retry);

        // Producers
        let settings = Arc::new(ListingSettings {
            search: self.config.search.query.clone(),
            sort: self.config.search.sort,
            listing_url: self.config.search.listing_url.clone(),
            result_selector: self.config.search.result_selector.clone(),
            link_selector: self.config.search.link_selector.clone(),
            exclusions: ExclusionList::new(self.config.search.exclude_prefixes.iter().cloned()),
            timeouts,
            retry,
        });
        let mut producers = JoinSet::new();
        for (page, session) in pages.iter().copied().zip(producer_sessions) {
            let producer = PageProducer::new(session, page, Arc::clone(&settings), Arc::clone(&queue));
            producers.spawn(producer.run());
        }

        // Consumers
        let context = ConsumerContext {
            queue: Arc::clone(&queue),
            schema: Arc::clone(&self.schema),
            results: collector.sender(),
            retry,
            timeouts,
            cancel: cancel.clone(),
        };
        let mut consumers = JoinSet::new();
        for (id, session) in consumer_sessions.into_iter().enumerate() {
            consumers.spawn(DetailConsumer::new(id, session, context.clone()).run());
        }
        drop(context);

        let metrics = tokio::spawn(report_metrics(
            Arc::clone(&queue),
            self.config.crawler.metrics_interval(),
            cancel.clone(),
        ));

        let mut pages_failed = 0;
        while let Some(joined) = producers.join_next().await {
            match joined {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    pages_failed += 1;
                    tracing::error!("Listing page failed: {}", e);
                }
                Err(e) => {
                    pages_failed += 1;
                    tracing::error!("Producer task failed: {}", e);
                }
            }
        }
        tracing::info!("Done producing, waiting for {} pending items", queue.stats().pending);

        let drained = wait_for_drain(&queue, &mut consumers).await;
        cancel.cancel();
        if let Err(e) = drained {
            tracing::error!("Crawl aborted with {} items unsettled", queue.stats().pending);
            return Err(e);
        }

        let mut totals = ConsumerReport::default();
        while let Some(joined) = consumers.join_next().await {
            match joined {
                Ok(report) => totals += report,
                Err(e) => tracing::error!("Consumer task failed: {}", e),
            }
        }
        tracing::debug!("Consumers finished: {:?}", totals);
        if let Err(e) = metrics.await {
            tracing::warn!("Metrics task failed: {}", e);
        }

        let records = collector.into_sorted();
        let queue_stats = queue.stats();
        let statistics = CrawlStatistics {
            started_at,
            finished_at: Utc::now(),
            duration: start_time.elapsed(),
            pages_requested: pages.len() as u32,
            pages_failed,
            items_discovered: queue_stats.pushed,
            records_extracted: records.len(),
            requeued: queue_stats.requeued,
            abandoned: queue_stats.abandoned,
            consumers: consumer_count,
        };

        tracing::info!(
            "Crawl complete: {} records from {} discovered items in {:.2}s",
            statistics.records_extracted,
            statistics.items_discovered,
            statistics.duration.as_secs_f64()
        );

        Ok(CrawlReport {
            records,
            statistics,
        })
    }

    /// Opens `count` pooled sessions, or none at all
    async fn open_sessions(
        &self,
        count: usize,
    ) -> Result<Vec<PooledSession<F::Session>>, TrawlError> {
        let opened = futures::future::join_all((0..count).map(|_| self.factory.open())).await;

        let mut sessions = Vec::with_capacity(count);
        let mut failure = None;
        for result in opened {
            match result {
                Ok(session) => sessions.push(self.pool.attach(session)),
                Err(e) => {
                    failure.get_or_insert(e);
                }
            }
        }

        if let Some(e) = failure {
            tracing::error!(
                "Failed to open {} of {} sessions",
                count - sessions.len(),
                count
            );
            for mut session in sessions {
                if let Err(close_error) = session.close().await {
                    tracing::warn!("Failed to close session: {}", close_error);
                }
            }
            return Err(e.into());
        }

        tracing::debug!("Opened {} sessions", count);
        Ok(sessions)
    }
}

/// Waits until every queued item is settled, watching the consumers meanwhile
///
/// A consumer only stops on cancellation, so one that ends earlier has died.
/// Its in-flight item can never be settled; once no consumer is left the
/// wait fails instead of blocking forever.
async fn wait_for_drain(
    queue: &WorkQueue,
    consumers: &mut JoinSet<ConsumerReport>,
) -> Result<(), TrawlError> {
    let drained = queue.join();
    tokio::pin!(drained);
    let mut failure = None;

    loop {
        tokio::select! {
            _ = &mut drained => return Ok(()),
            Some(joined) = consumers.join_next() => {
                match joined {
                    Ok(report) => tracing::warn!("Consumer stopped early: {:?}", report),
                    Err(e) => {
                        tracing::error!("Consumer task failed: {}", e);
                        failure = Some(e);
                    }
                }
                if consumers.is_empty() {
                    if let Some(e) = failure.take() {
                        return Err(TrawlError::Task(e));
                    }
                }
            }
        }
    }
}

/// Logs queue metrics until cancelled
async fn report_metrics(queue: Arc<WorkQueue>, every: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(every);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let stats = queue.stats();
                tracing::info!(
                    "URLs queue size: {} (pending {}, acknowledged {}, requeued {}, abandoned {})",
                    stats.queued,
                    stats.pending,
                    stats.acknowledged,
                    stats.requeued,
                    stats.abandoned
                );
            }
        }
    }
}
