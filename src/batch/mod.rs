//! Batch grouping of download-creation events
//!
//! Downloads created within one second of the first member of the current
//! group count as one batch. The window is anchored, not sliding: later
//! members never move its start.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

/// Arrivals at or beyond this distance from the window start open a new batch
pub const BATCH_GAP_THRESHOLD: TimeDelta = TimeDelta::milliseconds(1000);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchGroup {
    pub members: Vec<u64>,
    pub window_started_at: DateTime<Utc>,
}

impl BatchGroup {
    fn start(download_id: u64, at: DateTime<Utc>) -> Self {
        Self {
            members: vec![download_id],
            window_started_at: at,
        }
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    fn admits(&self, at: DateTime<Utc>) -> bool {
        at - self.window_started_at < BATCH_GAP_THRESHOLD
    }
}

/// Outcome of observing one event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchClassification {
    pub new_batch: bool,
    pub batch_size: usize,
}

/// Single-owner cursor over the current batch
#[derive(Debug, Default)]
pub struct BatchGrouper {
    current: Option<BatchGroup>,
}

impl BatchGrouper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify an arrival. Events must be fed in arrival order; an event
    /// stamped before the window start stays in the current group.
    pub fn observe(&mut self, download_id: u64, created_at: DateTime<Utc>) -> BatchClassification {
        if let Some(group) = self.current.as_mut().filter(|g| g.admits(created_at)) {
            group.members.push(download_id);
            return BatchClassification {
                new_batch: false,
                batch_size: group.size(),
            };
        }

        self.current = Some(BatchGroup::start(download_id, created_at));
        BatchClassification {
            new_batch: true,
            batch_size: 1,
        }
    }

    pub fn current_group_size(&self) -> usize {
        self.current.as_ref().map_or(0, BatchGroup::size)
    }

    pub fn current_group(&self) -> Option<&BatchGroup> {
        self.current.as_ref()
    }
}
