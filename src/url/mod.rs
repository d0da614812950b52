//! URL handling for Paper-Trawl
//!
//! This module builds listing page URLs and filters discovered detail links.

mod listing;
mod matcher;

// Re-export main types
pub use listing::{listing_url, ListingQuery, SortMode};
pub use matcher::ExclusionList;
