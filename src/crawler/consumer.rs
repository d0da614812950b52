//! Detail page consumer
//!
//! Consumers pop work items, load the detail page and evaluate the schema
//! against it. A record is emitted before its item is acknowledged, so the
//! queue never reports completion ahead of the results. Failed attempts go
//! back on the queue until the retry policy gives up on them. An attempt that
//! panics is abandoned at once, since retrying it would panic again.

use crate::browser::BrowserSession;
use crate::crawler::{ResultSender, RetryPolicy, WorkQueue};
use crate::extract::{Interpreter, Schema, Timeouts};
use crate::model::{ResultRecord, WorkItem};
use crate::{Result, TrawlError};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// What one consumer did over its lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerReport {
    pub extracted: usize,
    pub failed_attempts: usize,
    pub abandoned: usize,
}

impl std::ops::AddAssign for ConsumerReport {
    fn add_assign(&mut self, other: Self) {
        self.extracted += other.extracted;
        self.failed_attempts += other.failed_attempts;
        self.abandoned += other.abandoned;
    }
}

/// Everything a consumer shares with the rest of the pipeline
#[derive(Debug, Clone)]
pub struct ConsumerContext {
    pub queue: Arc<WorkQueue>,
    pub schema: Arc<Schema>,
    pub results: ResultSender,
    pub retry: RetryPolicy,
    pub timeouts: Timeouts,
    pub cancel: CancellationToken,
}

pub struct DetailConsumer<S: BrowserSession> {
    id: usize,
    session: S,
    context: ConsumerContext,
}

impl<S: BrowserSession> DetailConsumer<S> {
    pub fn new(id: usize, session: S, context: ConsumerContext) -> Self {
        Self {
            id,
            session,
            context,
        }
    }

    /// Processes items until cancelled, then closes the session
    pub async fn run(mut self) -> ConsumerReport {
        let mut report = ConsumerReport::default();
        let ConsumerContext {
            queue,
            results,
            retry,
            cancel,
            ..
        } = self.context.clone();

        loop {
            let item = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                item = queue.pop() => item,
            };

            let attempt = AssertUnwindSafe(self.process(&item)).catch_unwind().await;
            let outcome = match attempt {
                Ok(outcome) => outcome,
                Err(panic) => {
                    tracing::error!(
                        "Consumer {} panicked on {} ({}), abandoning it: {}",
                        self.id,
                        item.url,
                        item.rank,
                        panic_message(panic.as_ref())
                    );
                    report.failed_attempts += 1;
                    queue.abandon(&item);
                    report.abandoned += 1;
                    continue;
                }
            };

            match outcome {
                Ok(record) => {
                    if results.send(record).is_err() {
                        tracing::warn!("Result channel closed, dropping record {}", item.rank);
                    }
                    queue.ack(&item);
                    report.extracted += 1;
                }
                Err(e) => {
                    report.failed_attempts += 1;
                    let failures = queue.failures(item.rank) + 1;
                    if retry.should_retry(failures) {
                        tracing::warn!(
                            "Consumer {} failed on {} ({}), requeueing: {}",
                            self.id,
                            item.url,
                            item.rank,
                            e
                        );
                        retry.pause(failures).await;
                        queue.requeue(item);
                    } else {
                        tracing::error!(
                            "Abandoning {} ({}) after {} attempts: {}",
                            item.url,
                            item.rank,
                            failures,
                            e
                        );
                        queue.abandon(&item);
                        report.abandoned += 1;
                    }
                }
            }
        }

        if let Err(e) = self.session.close().await {
            tracing::warn!("Failed to close session of consumer {}: {}", self.id, e);
        }
        tracing::debug!("Consumer {} stopped: {:?}", self.id, report);

        report
    }

    async fn process(&self, item: &WorkItem) -> Result<ResultRecord> {
        tracing::debug!("Consumer {} processing {} ({})", self.id, item.url, item.rank);

        self.session
            .navigate(&item.url)
            .await
            .map_err(|e| TrawlError::Navigation {
                url: item.url.clone(),
                message: e.to_string(),
            })?;

        let fields = Interpreter::new(&self.session, self.context.timeouts)
            .extract(&self.context.schema)
            .await?;

        Ok(ResultRecord::new(item.rank, item.url.clone(), fields))
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}
