//! Listing page URLs
//!
//! A listing URL is the configured search endpoint plus the query string
//! `newsearch=true&queryText=..&pageNumber=..`, with `sortType=..` appended
//! when a sort mode is set.

use crate::{UrlError, UrlResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Result ordering offered by the listing service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    Newest,
    PaperCitations,
    MostPopular,
}

impl SortMode {
    /// Returns the value of the `sortType` query parameter
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PaperCitations => "paper-citations",
            Self::MostPopular => "most-popular",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

/// One listing page of a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    pub search: String,
    pub page: u32,
    pub sort: Option<SortMode>,
}

impl ListingQuery {
    pub fn new(search: impl Into<String>, page: u32, sort: Option<SortMode>) -> Self {
        Self {
            search: search.into(),
            page,
            sort,
        }
    }
}

/// Builds the listing URL for a query
///
/// # Arguments
///
/// * `base` - The search endpoint, without a query string
/// * `query` - Search term, page number and optional sort mode
///
/// # Returns
///
/// * `Ok(Url)` - The listing URL
/// * `Err(UrlError)` - The base is not an absolute http(s) URL
///
/// # Examples
///
/// ```
/// use paper_trawl::url::{listing_url, ListingQuery, SortMode};
///
/// let query = ListingQuery::new("linux", 2, Some(SortMode::Newest));
/// let url = listing_url("https://ieeexplore.ieee.org/search/searchresult.jsp", &query).unwrap();
/// assert_eq!(
///     url.as_str(),
///     "https://ieeexplore.ieee.org/search/searchresult.jsp?newsearch=true&queryText=linux&pageNumber=2&sortType=newest"
/// );
/// ```
pub fn listing_url(base: &str, query: &ListingQuery) -> UrlResult<Url> {
    let mut url = Url::parse(base)?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(UrlError::InvalidScheme(other.to_string())),
    }

    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair("newsearch", "true")
            .append_pair("queryText", &query.search)
            .append_pair("pageNumber", &query.page.to_string());
        if let Some(sort) = query.sort {
            pairs.append_pair("sortType", sort.as_param());
        }
    }

    Ok(url)
}
