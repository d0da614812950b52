//! Result collection
//!
//! Consumers emit records as they finish, in completion order. The collector
//! owns the receiving end and restores discovery order once the crawl is over.

use crate::model::{sort_by_rank, ResultRecord};
use tokio::sync::mpsc;

/// Sending half handed to every consumer
pub type ResultSender = mpsc::UnboundedSender<ResultRecord>;

pub struct ResultCollector {
    sender: ResultSender,
    receiver: mpsc::UnboundedReceiver<ResultRecord>,
}

impl Default for ResultCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultCollector {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self { sender, receiver }
    }

    /// Returns a new sender for a consumer
    pub fn sender(&self) -> ResultSender {
        self.sender.clone()
    }

    /// Drains every emitted record and sorts them by rank
    pub fn into_sorted(mut self) -> Vec<ResultRecord> {
        let mut records = Vec::new();
        while let Ok(record) = self.receiver.try_recv() {
            records.push(record);
        }
        sort_by_rank(&mut records);
        records
    }
}
