/// Ordering keys and queued work units
///
/// Ranks are assigned once by the listing producer and travel unchanged with
/// the work item into the extracted record.
use serde::{Serialize, Serializer};
use std::fmt;

/// Ordering key of a discovered detail page
///
/// Ranks compare by page number first and by position within the page second,
/// which is exactly the order of the final output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rank {
    /// Listing page the entry was discovered on
    pub page: u32,

    /// Zero-based position among the entries kept on that page
    pub position: u32,
}

impl Rank {
    /// Creates a new rank
    pub fn new(page: u32, position: u32) -> Self {
        Self { page, position }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.page, self.position)
    }
}

// Serialized as `[page, position]`
impl Serialize for Rank {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.page, self.position).serialize(serializer)
    }
}

/// A detail page queued for extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// The rank assigned when the entry was discovered
    pub rank: Rank,

    /// Absolute URL of the detail page
    pub url: String,
}

impl WorkItem {
    /// Creates a new work item
    pub fn new(rank: Rank, url: impl Into<String>) -> Self {
        Self {
            rank,
            url: url.into(),
        }
    }
}
