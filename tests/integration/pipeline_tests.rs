//! End-to-end crawl over an in-memory site
//!
//! `StaticSite` implements the public session traits with a tiny document
//! model: every node has text, attributes, and per-selector children.

use async_trait::async_trait;
use paper_trawl::browser::{
    BrowserError, BrowserResult, BrowserSession, Selector, SessionFactory,
};
use paper_trawl::config::{
    BrowserConfig, Config, CrawlerConfig, OutputConfig, RetryConfig, SearchConfig,
};
use paper_trawl::crawler::crawl;
use paper_trawl::extract::{ExtractionNode, FieldValue, Schema};
use paper_trawl::url::{listing_url, ListingQuery};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const LISTING: &str = "https://example.com/search";

#[derive(Default)]
struct Node {
    text: String,
    attributes: HashMap<String, String>,
    children: HashMap<String, Vec<usize>>,
}

#[derive(Default)]
struct Page {
    nodes: Vec<Node>,
    roots: HashMap<String, Vec<usize>>,
}

impl Page {
    fn node(&mut self, text: &str) -> usize {
        self.nodes.push(Node {
            text: text.to_string(),
            ..Node::default()
        });
        self.nodes.len() - 1
    }
}

#[derive(Default)]
struct StaticSite {
    pages: HashMap<String, Arc<Page>>,
    navigations: Mutex<Vec<String>>,
}

impl StaticSite {
    fn listing_page(&mut self, page: u32, links: &[&str]) {
        let mut doc = Page::default();
        let mut entries = Vec::new();
        for link in links {
            let entry = doc.node("");
            let anchor = doc.node("");
            doc.nodes[anchor]
                .attributes
                .insert("href".to_string(), link.to_string());
            doc.nodes[entry]
                .children
                .insert("a.title".to_string(), vec![anchor]);
            entries.push(entry);
        }
        doc.roots.insert(".result".to_string(), entries);

        let url = listing_url(LISTING, &ListingQuery::new("linux", page, None)).unwrap();
        self.pages.insert(url.to_string(), Arc::new(doc));
    }

    fn detail_page(&mut self, url: &str, title: &str) {
        let mut doc = Page::default();
        let heading = doc.node(title);
        doc.roots.insert("h1".to_string(), vec![heading]);
        self.pages.insert(url.to_string(), Arc::new(doc));
    }
}

struct StaticSession {
    site: Arc<StaticSite>,
    current: Mutex<Option<Arc<Page>>>,
}

impl StaticSession {
    fn page(&self) -> BrowserResult<Arc<Page>> {
        self.current
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| BrowserError::Element("no document loaded".to_string()))
    }
}

#[async_trait]
impl BrowserSession for StaticSession {
    type Element = usize;

    async fn navigate(&self, url: &str) -> BrowserResult<()> {
        self.site.navigations.lock().unwrap().push(url.to_string());
        let page = self.site.pages.get(url).cloned().ok_or_else(|| BrowserError::Navigation {
            url: url.to_string(),
            message: "404".to_string(),
        })?;
        *self.current.lock().unwrap() = Some(page);
        Ok(())
    }

    async fn query_selector(
        &self,
        context: Option<&usize>,
        selector: &Selector,
        _timeout: Duration,
    ) -> Vec<usize> {
        let Ok(page) = self.page() else {
            return Vec::new();
        };
        let matches = match context {
            Some(node) => page.nodes[*node].children.get(selector.expression()),
            None => page.roots.get(selector.expression()),
        };
        matches.cloned().unwrap_or_default()
    }

    async fn text(&self, element: &usize) -> BrowserResult<String> {
        Ok(self.page()?.nodes[*element].text.clone())
    }

    async fn attribute(&self, element: &usize, name: &str) -> BrowserResult<Option<String>> {
        Ok(self.page()?.nodes[*element].attributes.get(name).cloned())
    }

    async fn dispatch_click(&self, _element: &usize) -> BrowserResult<()> {
        Ok(())
    }

    async fn wait_for_ready(&self, _timeout: Duration) -> BrowserResult<bool> {
        Ok(self.page().is_ok())
    }

    async fn close(&mut self) -> BrowserResult<()> {
        Ok(())
    }
}

struct StaticFactory(Arc<StaticSite>);

#[async_trait]
impl SessionFactory for StaticFactory {
    type Session = StaticSession;

    async fn open(&self) -> BrowserResult<StaticSession> {
        Ok(StaticSession {
            site: Arc::clone(&self.0),
            current: Mutex::new(None),
        })
    }
}

fn create_test_config(pages: u32, consumers: usize) -> Config {
    Config {
        search: SearchConfig {
            query: "linux".to_string(),
            first_page: 1,
            pages,
            sort: None,
            listing_url: LISTING.to_string(),
            result_selector: Selector::css(".result"),
            link_selector: Selector::css("a.title"),
            exclude_prefixes: vec!["https://example.com/courses/".to_string()],
        },
        crawler: CrawlerConfig {
            consumers,
            query_timeout_ms: 10,
            ready_timeout_ms: 10,
            navigation_timeout_ms: 1_000,
            metrics_interval_ms: 20,
        },
        retry: RetryConfig {
            max_attempts: 3,
            backoff_ms: 0,
        },
        browser: BrowserConfig::default(),
        output: OutputConfig::default(),
    }
}

fn title_schema() -> Schema {
    Schema::new().field("Title", ExtractionNode::select(Selector::css("h1")))
}

#[tokio::test]
async fn test_crawl_preserves_rank_order() {
    let mut site = StaticSite::default();
    site.listing_page(
        1,
        &[
            "https://example.com/document/1",
            "https://example.com/courses/intro",
            "https://example.com/document/2",
        ],
    );
    site.listing_page(2, &["https://example.com/document/3"]);
    for n in 1..=3 {
        site.detail_page(
            &format!("https://example.com/document/{}", n),
            &format!("Paper {}", n),
        );
    }
    let site = Arc::new(site);

    let report = crawl(
        create_test_config(2, 3),
        StaticFactory(Arc::clone(&site)),
        title_schema(),
    )
    .await
    .expect("crawl should complete");

    let titles: Vec<_> = report
        .records
        .iter()
        .map(|r| r.field("Title").cloned())
        .collect();
    assert_eq!(
        titles,
        vec![
            Some(FieldValue::from("Paper 1")),
            Some(FieldValue::from("Paper 2")),
            Some(FieldValue::from("Paper 3")),
        ]
    );

    let ranks: Vec<(u32, u32)> = report
        .records
        .iter()
        .map(|r| (r.rank.page, r.rank.position))
        .collect();
    assert_eq!(ranks, vec![(1, 0), (1, 1), (2, 0)]);

    assert_eq!(report.statistics.items_discovered, 3);
    assert_eq!(report.statistics.records_extracted, 3);
    assert_eq!(report.statistics.pages_failed, 0);

    let navigations = site.navigations.lock().unwrap();
    assert!(!navigations.iter().any(|url| url.contains("/courses/")));
}

#[tokio::test]
async fn test_unreachable_detail_page_is_abandoned() {
    let mut site = StaticSite::default();
    site.listing_page(
        1,
        &[
            "https://example.com/document/1",
            "https://example.com/document/missing",
        ],
    );
    site.detail_page("https://example.com/document/1", "Paper 1");
    let site = Arc::new(site);

    let report = crawl(
        create_test_config(1, 2),
        StaticFactory(Arc::clone(&site)),
        title_schema(),
    )
    .await
    .expect("crawl should complete");

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].url, "https://example.com/document/1");
    assert_eq!(report.statistics.abandoned, 1);
    assert_eq!(report.statistics.requeued, 2);

    let attempts = site
        .navigations
        .lock()
        .unwrap()
        .iter()
        .filter(|url| url.ends_with("/missing"))
        .count();
    assert_eq!(attempts, 3);
}
