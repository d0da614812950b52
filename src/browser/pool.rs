//! Bounded worker pool for session operations
//!
//! Producers and consumers are cheap tasks; the browsers behind them are not.
//! Every session operation holds a permit from a shared semaphore for its
//! whole duration, so the number of browser calls in flight never exceeds the
//! pool size no matter how many producer and consumer tasks exist.

use crate::browser::{BrowserError, BrowserResult, BrowserSession, Selector};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Shared limit on concurrent session operations
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    /// Creates a pool allowing `size` concurrent operations (at least one)
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    /// Returns the configured pool size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the number of operations that could start right now
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Binds a session to this pool
    pub fn attach<S: BrowserSession>(&self, session: S) -> PooledSession<S> {
        PooledSession {
            inner: session,
            pool: self.clone(),
        }
    }

    async fn acquire(&self) -> BrowserResult<OwnedSemaphorePermit> {
        self.permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| BrowserError::Closed)
    }
}

/// A session whose operations are throttled by a `WorkerPool`
pub struct PooledSession<S> {
    inner: S,
    pool: WorkerPool,
}

#[async_trait]
impl<S: BrowserSession> BrowserSession for PooledSession<S> {
    type Element = S::Element;

    async fn navigate(&self, url: &str) -> BrowserResult<()> {
        let _permit = self.pool.acquire().await?;
        self.inner.navigate(url).await
    }

    async fn query_selector(
        &self,
        context: Option<&Self::Element>,
        selector: &Selector,
        timeout: Duration,
    ) -> Vec<Self::Element> {
        let Ok(_permit) = self.pool.acquire().await else {
            return Vec::new();
        };
        self.inner.query_selector(context, selector, timeout).await
    }

    async fn text(&self, element: &Self::Element) -> BrowserResult<String> {
        let _permit = self.pool.acquire().await?;
        self.inner.text(element).await
    }

    async fn attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> BrowserResult<Option<String>> {
        let _permit = self.pool.acquire().await?;
        self.inner.attribute(element, name).await
    }

    async fn dispatch_click(&self, element: &Self::Element) -> BrowserResult<()> {
        let _permit = self.pool.acquire().await?;
        self.inner.dispatch_click(element).await
    }

    async fn wait_for_ready(&self, timeout: Duration) -> BrowserResult<bool> {
        let _permit = self.pool.acquire().await?;
        self.inner.wait_for_ready(timeout).await
    }

    // Closing is never throttled: cleanup must not wait behind live work.
    async fn close(&mut self) -> BrowserResult<()> {
        self.inner.close().await
    }
}
