//! Output handler traits and types
//!
//! This module defines the trait interface for output handlers, the
//! persistence collaborator that receives the final, rank-ordered records.

use crate::model::ResultRecord;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for output handlers
///
/// Handlers receive the complete record sequence once, after the crawl has
/// finished and the records have been sorted by rank.
pub trait OutputHandler {
    /// Persists the records in the given order
    ///
    /// # Arguments
    ///
    /// * `records` - The extracted records, sorted by rank
    fn write_records(&self, records: &[ResultRecord]) -> OutputResult<()>;

    /// Describes where the records go, for log messages
    fn destination(&self) -> String;
}
