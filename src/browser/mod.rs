//! Browser automation sessions
//!
//! The crawl pipeline never parses HTML itself. It drives automation sessions
//! through the `BrowserSession` trait, which owns the live document. This
//! module contains:
//! - The session and session-factory traits
//! - Element selectors
//! - A bounded worker pool that caps concurrent session operations
//! - Driver/browser discovery on the executable search path
//! - The chromium (CDP) session implementation

mod chromium;
mod discovery;
mod error;
#[cfg(test)]
pub(crate) mod fake;
mod pool;
mod selector;

pub use chromium::{ChromiumFactory, ChromiumSession, ElementHandle, LaunchOptions};
pub use discovery::{BrowserKind, Discovery, Installation};
pub use error::{BrowserError, BrowserResult};
pub use pool::{PooledSession, WorkerPool};
pub use selector::Selector;

use async_trait::async_trait;
use std::time::Duration;

/// One automation-controlled browsing context
///
/// Every operation is a suspension point. Sessions are owned exclusively by a
/// single producer or consumer and are never shared between tasks.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Handle to an element of the current document
    type Element: Clone + Send + Sync + 'static;

    /// Navigates to a URL
    ///
    /// Fails with `BrowserError::Navigation` on timeout or network failure.
    async fn navigate(&self, url: &str) -> BrowserResult<()>;

    /// Finds the elements matching `selector`, in document order
    ///
    /// With no `context` the whole document is searched and the query may
    /// wait up to `timeout` for a match to appear. An absence, including a
    /// timeout, is reported as an empty list rather than an error.
    async fn query_selector(
        &self,
        context: Option<&Self::Element>,
        selector: &Selector,
        timeout: Duration,
    ) -> Vec<Self::Element>;

    /// Reads the rendered text of an element
    async fn text(&self, element: &Self::Element) -> BrowserResult<String>;

    /// Reads an attribute of an element
    async fn attribute(&self, element: &Self::Element, name: &str)
        -> BrowserResult<Option<String>>;

    /// Clicks an element through page script
    ///
    /// Works even when the element is obscured by another element.
    async fn dispatch_click(&self, element: &Self::Element) -> BrowserResult<()>;

    /// Waits until the document is interactive or complete
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The document reached a ready state
    /// * `Ok(false)` - The timeout elapsed first
    /// * `Err(BrowserError)` - The session could not be queried
    async fn wait_for_ready(&self, timeout: Duration) -> BrowserResult<bool>;

    /// Closes the session and releases its browser
    async fn close(&mut self) -> BrowserResult<()>;
}

/// Opens new browser sessions
///
/// A factory value is handed to the pipeline at construction time, so every
/// producer and consumer gets a fresh, exclusively owned session.
#[async_trait]
pub trait SessionFactory: Send + Sync + 'static {
    /// The session type this factory opens
    type Session: BrowserSession + 'static;

    /// Opens a new session
    async fn open(&self) -> BrowserResult<Self::Session>;
}
