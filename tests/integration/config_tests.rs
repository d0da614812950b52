use paper_trawl::browser::{BrowserKind, Selector};
use paper_trawl::config::{load_config, load_config_with_hash, resolve_schema};
use paper_trawl::url::{listing_url, ListingQuery, SortMode};
use paper_trawl::ConfigError;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const FULL_CONFIG: &str = r#"
[search]
query = "linux"
first-page = 2
pages = 3
sort = "newest"
listing-url = "https://ieeexplore.ieee.org/search/searchresult.jsp"
result-selector = { css = ".List-results-items" }
link-selector = { xpath = ".//h3/a" }
exclude-prefixes = ["https://ieeexplore.ieee.org/courses/"]

[crawler]
consumers = 5
query-timeout-ms = 1000
ready-timeout-ms = 30000
navigation-timeout-ms = 60000
metrics-interval-ms = 1000

[retry]
max-attempts = 0
backoff-ms = 0

[browser]
headless = true
max-concurrent-operations = 8

[[browser.drivers]]
driver = "chromedriver"
browsers = ["chromium", "chrome"]

[output]
results-path = "./linux.json"
"#;

#[test]
fn test_full_config_round() {
    let file = write_file(FULL_CONFIG);
    let (config, hash) = load_config_with_hash(file.path()).unwrap();

    assert_eq!(hash.len(), 64);
    assert_eq!(config.search.page_range().collect::<Vec<_>>(), vec![2, 3, 4]);
    assert_eq!(config.search.sort, Some(SortMode::Newest));
    assert_eq!(config.search.link_selector, Selector::xpath(".//h3/a"));
    assert_eq!(
        config.browser.drivers[0].browsers,
        vec![BrowserKind::Chromium, BrowserKind::Chrome]
    );

    let query = ListingQuery::new(config.search.query.as_str(), 4, config.search.sort);
    let url = listing_url(&config.search.listing_url, &query).unwrap();
    assert_eq!(
        url.as_str(),
        "https://ieeexplore.ieee.org/search/searchresult.jsp?newsearch=true&queryText=linux&pageNumber=4&sortType=newest"
    );
}

#[test]
fn test_missing_search_section_is_a_parse_error() {
    let file = write_file("[crawler]\nconsumers = 2\n");
    assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
}

#[test]
fn test_validation_errors() {
    let cases = [
        "[search]\nquery = \"\"\npages = 1\n",
        "[search]\nquery = \"linux\"\npages = 1\n[crawler]\nconsumers = 0\n",
        "[search]\nquery = \"linux\"\npages = 1\n[crawler]\nquery-timeout-ms = 0\n",
        "[search]\nquery = \"linux\"\npages = 1\n[browser]\ndrivers = []\n",
        "[search]\nquery = \"linux\"\npages = 1\n[output]\nresults-path = \"\"\n",
    ];

    for case in cases {
        let file = write_file(case);
        let result = load_config(file.path());
        assert!(
            matches!(result, Err(ConfigError::Validation(_))),
            "expected validation error for {:?}, got {:?}",
            case,
            result
        );
    }
}

#[test]
fn test_schema_file_replaces_built_in_schema() {
    let schema_file = write_file(
        r#"{
            "Title": { "selector": { "css": "h1" } },
            "Views": { "selector": { "css": ".views" }, "transforms": [ { "op": "parse_int" } ] }
        }"#,
    );
    let config_file = write_file(&format!(
        "[search]\nquery = \"linux\"\npages = 1\n[output]\nschema-path = {:?}\n",
        schema_file.path().display().to_string()
    ));

    let config = load_config(config_file.path()).unwrap();
    let schema = resolve_schema(&config.output).unwrap();
    let names: Vec<&str> = schema.fields.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["Title", "Views"]);
}

#[test]
fn test_broken_schema_file() {
    let schema_file = write_file("{ not json");
    let config_file = write_file(&format!(
        "[search]\nquery = \"linux\"\npages = 1\n[output]\nschema-path = {:?}\n",
        schema_file.path().display().to_string()
    ));

    let config = load_config(config_file.path()).unwrap();
    assert!(matches!(
        resolve_schema(&config.output),
        Err(ConfigError::Schema(_))
    ));
}
