//! Data model shared by the crawl pipeline
//!
//! # Components
//!
//! - `Rank`: the (page, position) ordering key assigned at discovery time
//! - `WorkItem`: a ranked detail-page URL waiting for extraction
//! - `ResultRecord`: the extracted, rank-tagged output for one detail page

mod rank;
mod record;

// Re-export main types
pub use rank::{Rank, WorkItem};
pub use record::{sort_by_rank, ResultRecord};
