//! Work queue between listing producers and detail consumers
//!
//! An unbounded FIFO of `WorkItem`s with task-completion accounting. Every
//! pushed item opens one pending slot; the slot closes when the item is
//! acknowledged or abandoned. A requeued item keeps its slot, so `join`
//! returns exactly when every discovered item has been settled once.

use crate::model::{Rank, WorkItem};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::{watch, Notify};

/// Snapshot of queue counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Items pushed or requeued but not yet settled
    pub pending: usize,
    /// Items waiting to be popped
    pub queued: usize,
    pub pushed: usize,
    pub requeued: usize,
    pub acknowledged: usize,
    pub abandoned: usize,
}

#[derive(Debug, Default)]
struct QueueState {
    items: VecDeque<WorkItem>,
    failures: HashMap<Rank, u32>,
    settled: HashSet<Rank>,
    pushed: usize,
    requeued: usize,
    acknowledged: usize,
    abandoned: usize,
}

/// Concurrent FIFO work queue with completion tracking
#[derive(Debug)]
pub struct WorkQueue {
    state: Mutex<QueueState>,
    available: Notify,
    pending: watch::Sender<usize>,
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkQueue {
    pub fn new() -> Self {
        let (pending, _) = watch::channel(0);
        Self {
            state: Mutex::new(QueueState::default()),
            available: Notify::new(),
            pending,
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a newly discovered item and opens its pending slot
    pub fn push(&self, item: WorkItem) {
        {
            let mut state = self.lock();
            state.items.push_back(item);
            state.pushed += 1;
        }
        self.pending.send_modify(|pending| *pending += 1);
        self.available.notify_one();
    }

    /// Waits for the next item
    pub async fn pop(&self) -> WorkItem {
        loop {
            let notified = self.available.notified();
            let next = self.lock().items.pop_front();
            if let Some(item) = next {
                return item;
            }
            notified.await;
        }
    }

    /// Puts a failed item back at the tail, keeping its pending slot
    ///
    /// # Returns
    ///
    /// The number of failed attempts recorded for the item so far
    pub fn requeue(&self, item: WorkItem) -> u32 {
        let failures = {
            let mut state = self.lock();
            let failures = state.failures.entry(item.rank).or_insert(0);
            *failures += 1;
            let failures = *failures;
            state.items.push_back(item);
            state.requeued += 1;
            failures
        };
        self.available.notify_one();
        failures
    }

    /// Acknowledges a successfully processed item
    ///
    /// Returns false, and changes nothing, if the item's rank was already
    /// settled.
    pub fn ack(&self, item: &WorkItem) -> bool {
        let settled = {
            let mut state = self.lock();
            let fresh = state.settled.insert(item.rank);
            if fresh {
                state.acknowledged += 1;
            }
            fresh
        };
        if settled {
            self.settle_one();
        } else {
            tracing::warn!("Ignoring duplicate acknowledgement for rank {}", item.rank);
        }
        settled
    }

    /// Settles an item that exhausted its retries, without a result
    pub fn abandon(&self, item: &WorkItem) -> bool {
        let settled = {
            let mut state = self.lock();
            let fresh = state.settled.insert(item.rank);
            if fresh {
                state.abandoned += 1;
            }
            fresh
        };
        if settled {
            self.settle_one();
        }
        settled
    }

    fn settle_one(&self) {
        self.pending
            .send_modify(|pending| *pending = pending.saturating_sub(1));
    }

    /// Failed attempts recorded for a rank
    pub fn failures(&self, rank: Rank) -> u32 {
        self.lock().failures.get(&rank).copied().unwrap_or(0)
    }

    /// Number of items waiting to be popped
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> QueueStats {
        let state = self.lock();
        QueueStats {
            pending: *self.pending.borrow(),
            queued: state.items.len(),
            pushed: state.pushed,
            requeued: state.requeued,
            acknowledged: state.acknowledged,
            abandoned: state.abandoned,
        }
    }

    /// Waits until every pushed item has been acknowledged or abandoned
    pub async fn join(&self) {
        let mut pending = self.pending.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = pending.wait_for(|pending| *pending == 0).await;
    }
}
