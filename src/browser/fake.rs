//! In-memory scripted browser used by the test suite
//!
//! A `FakeDocument` is a set of nodes with text and attributes. Which nodes a
//! selector returns is scripted explicitly per context, keyed by the selector
//! expression, so tests never depend on a real CSS or XPath engine.

use crate::browser::{BrowserError, BrowserResult, BrowserSession, SessionFactory, Selector};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Handle to a node of a `FakeDocument`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeElement(pub usize);

#[derive(Debug, Clone, Default)]
struct FakeNode {
    text: String,
    attributes: HashMap<String, String>,
    children: HashMap<String, Vec<usize>>,
    reveals: Vec<(String, Vec<usize>)>,
    detached: bool,
}

/// A scripted document
#[derive(Debug, Clone, Default)]
pub struct FakeDocument {
    nodes: Vec<FakeNode>,
    roots: HashMap<String, Vec<usize>>,
}

impl FakeDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node with the given text and returns its id
    pub fn element(&mut self, text: &str) -> usize {
        self.nodes.push(FakeNode {
            text: text.to_string(),
            ..FakeNode::default()
        });
        self.nodes.len() - 1
    }

    pub fn attr(&mut self, node: usize, name: &str, value: &str) {
        self.nodes[node]
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    /// Scripts the result of a document-rooted query
    pub fn root(&mut self, selector: &Selector, nodes: &[usize]) {
        self.roots
            .entry(selector.expression().to_string())
            .or_default()
            .extend_from_slice(nodes);
    }

    /// Scripts the result of a query rooted at `parent`
    pub fn child(&mut self, parent: usize, selector: &Selector, nodes: &[usize]) {
        self.nodes[parent]
            .children
            .entry(selector.expression().to_string())
            .or_default()
            .extend_from_slice(nodes);
    }

    /// Makes a document-rooted query match only after `trigger` is clicked
    pub fn reveal_on_click(&mut self, trigger: usize, selector: &Selector, nodes: &[usize]) {
        self.nodes[trigger]
            .reveals
            .push((selector.expression().to_string(), nodes.to_vec()));
    }

    /// Makes reads of a node fail, as if it went stale
    pub fn detach(&mut self, node: usize) {
        self.nodes[node].detached = true;
    }

    fn node(&self, element: &FakeElement) -> BrowserResult<&FakeNode> {
        match self.nodes.get(element.0) {
            Some(node) if !node.detached => Ok(node),
            _ => Err(BrowserError::Element(format!(
                "stale element reference {}",
                element.0
            ))),
        }
    }
}

/// A scripted site: documents by URL plus failure and latency scripts
#[derive(Debug, Default)]
pub struct FakeSite {
    documents: HashMap<String, FakeDocument>,
    latency: HashMap<String, Duration>,
    crashes: HashSet<String>,
    navigation_failures: Mutex<HashMap<String, u32>>,
    empty_renders: Mutex<HashMap<String, u32>>,
    navigations: Mutex<HashMap<String, u32>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    opened: AtomicUsize,
    closed: AtomicUsize,
    clicks: AtomicUsize,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&mut self, url: &str, document: FakeDocument) {
        self.documents.insert(url.to_string(), document);
    }

    pub fn latency(&mut self, url: &str, delay: Duration) {
        self.latency.insert(url.to_string(), delay);
    }

    /// Makes every navigation to `url` panic
    pub fn crash_on_navigation(&mut self, url: &str) {
        self.crashes.insert(url.to_string());
    }

    /// Makes the next `times` navigations to `url` fail
    pub fn fail_navigation(&mut self, url: &str, times: u32) {
        if let Ok(mut failures) = self.navigation_failures.lock() {
            failures.insert(url.to_string(), times);
        }
    }

    /// Makes the next `times` navigations to `url` render an empty document
    pub fn empty_renders(&mut self, url: &str, times: u32) {
        if let Ok(mut renders) = self.empty_renders.lock() {
            renders.insert(url.to_string(), times);
        }
    }

    pub fn session(self: &Arc<Self>) -> FakeSession {
        self.opened.fetch_add(1, Ordering::SeqCst);
        FakeSession {
            site: Arc::clone(self),
            document: Mutex::new(FakeDocument::new()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn factory(self: &Arc<Self>) -> FakeFactory {
        FakeFactory {
            site: Arc::clone(self),
        }
    }

    pub fn navigations(&self, url: &str) -> u32 {
        self.navigations
            .lock()
            .map(|counts| counts.get(url).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn opened_sessions(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed_sessions(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn clicks(&self) -> usize {
        self.clicks.load(Ordering::SeqCst)
    }

    fn take_scripted(counter: &Mutex<HashMap<String, u32>>, url: &str) -> bool {
        let Ok(mut counts) = counter.lock() else {
            return false;
        };
        match counts.get_mut(url) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

struct InFlight<'a>(&'a FakeSite);

impl<'a> InFlight<'a> {
    fn enter(site: &'a FakeSite) -> Self {
        let now = site.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        site.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        Self(site)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A session over a `FakeSite`
pub struct FakeSession {
    site: Arc<FakeSite>,
    document: Mutex<FakeDocument>,
    closed: AtomicBool,
}

impl FakeSession {
    fn with_document<T>(&self, f: impl FnOnce(&mut FakeDocument) -> T) -> BrowserResult<T> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(BrowserError::Closed);
        }
        let mut document = self
            .document
            .lock()
            .map_err(|_| BrowserError::Chromium("document lock poisoned".to_string()))?;
        Ok(f(&mut document))
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    type Element = FakeElement;

    async fn navigate(&self, url: &str) -> BrowserResult<()> {
        let _guard = InFlight::enter(&self.site);
        if let Ok(mut counts) = self.site.navigations.lock() {
            *counts.entry(url.to_string()).or_insert(0) += 1;
        }
        if let Some(delay) = self.site.latency.get(url) {
            tokio::time::sleep(*delay).await;
        }
        if self.site.crashes.contains(url) {
            panic!("scripted crash navigating to {}", url);
        }
        if FakeSite::take_scripted(&self.site.navigation_failures, url) {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                message: "scripted failure".to_string(),
            });
        }

        let rendered = if FakeSite::take_scripted(&self.site.empty_renders, url) {
            FakeDocument::new()
        } else {
            self.site.documents.get(url).cloned().unwrap_or_default()
        };
        self.with_document(|document| *document = rendered)
    }

    async fn query_selector(
        &self,
        context: Option<&FakeElement>,
        selector: &Selector,
        _timeout: Duration,
    ) -> Vec<FakeElement> {
        let key = selector.expression();
        self.with_document(|document| {
            let ids = match context {
                None => document.roots.get(key).cloned(),
                Some(element) => document
                    .node(element)
                    .ok()
                    .and_then(|node| node.children.get(key).cloned()),
            };
            ids.unwrap_or_default().into_iter().map(FakeElement).collect()
        })
        .unwrap_or_default()
    }

    async fn text(&self, element: &FakeElement) -> BrowserResult<String> {
        self.with_document(|document| document.node(element).map(|node| node.text.clone()))?
    }

    async fn attribute(&self, element: &FakeElement, name: &str) -> BrowserResult<Option<String>> {
        self.with_document(|document| {
            document
                .node(element)
                .map(|node| node.attributes.get(name).cloned())
        })?
    }

    async fn dispatch_click(&self, element: &FakeElement) -> BrowserResult<()> {
        self.site.clicks.fetch_add(1, Ordering::SeqCst);
        self.with_document(|document| {
            let reveals = document.node(element)?.reveals.clone();
            for (key, nodes) in reveals {
                document.roots.entry(key).or_default().extend(nodes);
            }
            Ok::<(), BrowserError>(())
        })?
    }

    async fn wait_for_ready(&self, _timeout: Duration) -> BrowserResult<bool> {
        self.with_document(|_| true)
    }

    async fn close(&mut self) -> BrowserResult<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.site.closed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Opens `FakeSession`s over one shared site
pub struct FakeFactory {
    site: Arc<FakeSite>,
}

#[async_trait]
impl SessionFactory for FakeFactory {
    type Session = FakeSession;

    async fn open(&self) -> BrowserResult<FakeSession> {
        Ok(self.site.session())
    }
}
