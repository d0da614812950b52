//! Listing page producer
//!
//! One producer handles one listing page. It reads every result entry,
//! keeps the detail links that are not excluded, numbers them contiguously
//! in document order and pushes them to the work queue. A page that fails to
//! load or renders no results is fetched again from scratch.

use crate::browser::{BrowserSession, Selector};
use crate::crawler::{RetryPolicy, WorkQueue};
use crate::extract::Timeouts;
use crate::model::{Rank, WorkItem};
use crate::url::{listing_url, ExclusionList, ListingQuery, SortMode};
use crate::{Result, TrawlError};
use std::sync::Arc;

/// Settings shared by every producer of a crawl
#[derive(Debug, Clone)]
pub struct ListingSettings {
    pub search: String,
    pub sort: Option<SortMode>,
    pub listing_url: String,
    pub result_selector: Selector,
    pub link_selector: Selector,
    pub exclusions: ExclusionList,
    pub timeouts: Timeouts,
    pub retry: RetryPolicy,
}

pub struct PageProducer<S: BrowserSession> {
    session: S,
    page: u32,
    settings: Arc<ListingSettings>,
    queue: Arc<WorkQueue>,
}

impl<S: BrowserSession> PageProducer<S> {
    pub fn new(session: S, page: u32, settings: Arc<ListingSettings>, queue: Arc<WorkQueue>) -> Self {
        Self {
            session,
            page,
            settings,
            queue,
        }
    }

    /// Produces the work items of this producer's page, then closes the session
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of work items pushed
    /// * `Err(TrawlError)` - The page was given up on after exhausting retries
    pub async fn run(mut self) -> Result<usize> {
        let outcome = self.produce().await;

        if let Err(e) = self.session.close().await {
            tracing::warn!("Failed to close session of listing page {}: {}", self.page, e);
        }

        outcome
    }

    async fn produce(&self) -> Result<usize> {
        let query = ListingQuery::new(self.settings.search.as_str(), self.page, self.settings.sort);
        let url = listing_url(&self.settings.listing_url, &query)?;

        let mut failures = 0;
        let links = loop {
            match self.read_listing(url.as_str()).await {
                Ok(links) => break links,
                Err(e) => {
                    failures += 1;
                    if !self.settings.retry.should_retry(failures) {
                        tracing::error!(
                            "Giving up on listing page {} after {} attempts: {}",
                            self.page,
                            failures,
                            e
                        );
                        return Err(e);
                    }
                    tracing::warn!("Listing page {} failed, retrying: {}", self.page, e);
                    self.settings.retry.pause(failures).await;
                }
            }
        };

        let count = links.len();
        for (position, link) in links.into_iter().enumerate() {
            let rank = Rank::new(self.page, position as u32);
            tracing::debug!("Discovered {} at {}", link, rank);
            self.queue.push(WorkItem::new(rank, link));
        }

        tracing::info!("Listing page {} produced {} items", self.page, count);
        Ok(count)
    }

    /// Loads the listing page once and reads its kept detail links, in order
    async fn read_listing(&self, url: &str) -> Result<Vec<String>> {
        let timeouts = self.settings.timeouts;

        self.session
            .navigate(url)
            .await
            .map_err(|e| TrawlError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        if !self.session.wait_for_ready(timeouts.ready).await? {
            tracing::debug!("Listing page {} not ready, querying anyway", self.page);
        }

        let entries = self
            .session
            .query_selector(None, &self.settings.result_selector, timeouts.query)
            .await;
        if entries.is_empty() {
            return Err(TrawlError::EmptyListing { page: self.page });
        }

        let mut links = Vec::with_capacity(entries.len());
        for entry in &entries {
            let anchors = self
                .session
                .query_selector(Some(entry), &self.settings.link_selector, timeouts.query)
                .await;
            let Some(anchor) = anchors.first() else {
                continue;
            };

            let href = match self.session.attribute(anchor, "href").await {
                Ok(Some(href)) => href,
                Ok(None) => continue,
                Err(e) => {
                    tracing::debug!("Skipping entry on listing page {}: {}", self.page, e);
                    continue;
                }
            };

            if self.settings.exclusions.is_excluded(&href) {
                tracing::debug!("Excluded {}", href);
                continue;
            }
            links.push(href);
        }

        Ok(links)
    }
}
