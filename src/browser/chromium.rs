//! Chromium session over the DevTools protocol
//!
//! Each session launches its own browser process with a private, temporary
//! profile directory so that several sessions can run side by side.

use crate::browser::{BrowserError, BrowserResult, BrowserSession, SessionFactory, Selector};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How sessions are launched
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Browser executable found by discovery
    pub executable: PathBuf,

    /// Run without a visible window
    pub headless: bool,

    /// Upper bound on a single navigation
    pub navigation_timeout: Duration,
}

/// Handle to an element of a chromium page
#[derive(Debug, Clone)]
pub struct ElementHandle(Arc<Element>);

/// A chromium browser process driving a single page
pub struct ChromiumSession {
    browser: Mutex<Option<Browser>>,
    page: Option<Page>,
    handler: JoinHandle<()>,
    navigation_timeout: Duration,
    _profile: TempDir,
}

impl ChromiumSession {
    /// Launches a browser and opens a blank page
    pub async fn launch(options: &LaunchOptions) -> BrowserResult<Self> {
        let profile = tempfile::Builder::new()
            .prefix("paper-trawl-profile-")
            .tempdir()?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(&options.executable)
            .user_data_dir(profile.path())
            .no_sandbox();
        if !options.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(BrowserError::Chromium)?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::Chromium(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error: {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                handler.abort();
                return Err(BrowserError::Chromium(e.to_string()));
            }
        };

        tracing::debug!("Launched session with profile {}", profile.path().display());

        Ok(Self {
            browser: Mutex::new(Some(browser)),
            page: Some(page),
            handler,
            navigation_timeout: options.navigation_timeout,
            _profile: profile,
        })
    }

    fn page(&self) -> BrowserResult<&Page> {
        self.page.as_ref().ok_or(BrowserError::Closed)
    }

    async fn find_in_document(&self, page: &Page, selector: &Selector) -> Vec<Element> {
        let found = match selector.as_css() {
            Some(css) => page.find_elements(css).await,
            None => page.find_xpaths(selector.expression()).await,
        };
        found.unwrap_or_default()
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    type Element = ElementHandle;

    async fn navigate(&self, url: &str) -> BrowserResult<()> {
        let page = self.page()?;
        match tokio::time::timeout(self.navigation_timeout, page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(BrowserError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(BrowserError::Navigation {
                url: url.to_string(),
                message: format!("timed out after {:?}", self.navigation_timeout),
            }),
        }
    }

    async fn query_selector(
        &self,
        context: Option<&ElementHandle>,
        selector: &Selector,
        timeout: Duration,
    ) -> Vec<ElementHandle> {
        let Ok(page) = self.page() else {
            return Vec::new();
        };

        let found = match context {
            Some(ElementHandle(element)) => match selector.as_css() {
                Some(css) => element.find_elements(css).await.unwrap_or_default(),
                None => {
                    tracing::warn!(
                        "Element-rooted XPath is not supported, {} matches nothing",
                        selector
                    );
                    Vec::new()
                }
            },
            None => {
                let deadline = Instant::now() + timeout;
                loop {
                    let found = self.find_in_document(page, selector).await;
                    let now = Instant::now();
                    if !found.is_empty() || now >= deadline {
                        break found;
                    }
                    tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
                }
            }
        };

        found
            .into_iter()
            .map(|element| ElementHandle(Arc::new(element)))
            .collect()
    }

    async fn text(&self, element: &ElementHandle) -> BrowserResult<String> {
        let text = element
            .0
            .inner_text()
            .await
            .map_err(|e| BrowserError::Element(e.to_string()))?;
        Ok(text.unwrap_or_default())
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> BrowserResult<Option<String>> {
        // The live property resolves relative URLs; fall back to the markup.
        let property = element
            .0
            .property(name)
            .await
            .map_err(|e| BrowserError::Element(e.to_string()))?;
        if let Some(serde_json::Value::String(value)) = property {
            return Ok(Some(value));
        }

        element
            .0
            .attribute(name)
            .await
            .map_err(|e| BrowserError::Element(e.to_string()))
    }

    async fn dispatch_click(&self, element: &ElementHandle) -> BrowserResult<()> {
        element
            .0
            .call_js_fn("function() { this.click(); }", false)
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?;
        Ok(())
    }

    async fn wait_for_ready(&self, timeout: Duration) -> BrowserResult<bool> {
        let page = self.page()?;
        let deadline = Instant::now() + timeout;

        loop {
            let state: String = page
                .evaluate("document.readyState")
                .await
                .map_err(|e| BrowserError::Script(e.to_string()))?
                .into_value()
                .map_err(|e| BrowserError::Script(e.to_string()))?;

            if state == "interactive" || state == "complete" {
                return Ok(true);
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
        }
    }

    async fn close(&mut self) -> BrowserResult<()> {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                tracing::debug!("Failed to close page: {}", e);
            }
        }

        let mut result = Ok(());
        if let Some(mut browser) = self.browser.lock().await.take() {
            if let Err(e) = browser.close().await {
                result = Err(BrowserError::Chromium(e.to_string()));
            }
            if let Err(e) = browser.wait().await {
                tracing::debug!("Failed to reap browser process: {}", e);
            }
        }

        self.handler.abort();
        result
    }
}

/// Launches a new chromium session per `open`
#[derive(Debug, Clone)]
pub struct ChromiumFactory {
    options: LaunchOptions,
}

impl ChromiumFactory {
    pub fn new(options: LaunchOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl SessionFactory for ChromiumFactory {
    type Session = ChromiumSession;

    async fn open(&self) -> BrowserResult<ChromiumSession> {
        ChromiumSession::launch(&self.options).await
    }
}
