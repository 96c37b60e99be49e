//! Element manager statistics.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use hintkit_protocols::ElementType;
use serde::{Deserialize, Serialize};

/// Snapshot returned by [`ElementManager::get_stats`](crate::ElementManager::get_stats).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerStats {
    pub running: bool,
    /// Whether visibility tracking fell back to the whole registry.
    pub bailed: bool,
    /// Registered elements per category.
    pub elements: BTreeMap<ElementType, usize>,
    pub total_elements: usize,
    pub visible_elements: usize,
    pub tracked_frames: usize,
    pub visible_frames: usize,
    /// Items waiting in the change queue.
    pub queue_length: usize,
    /// Queue slices run since the manager was created.
    pub slices: u64,
    /// Time spent processing the queue, in milliseconds.
    pub processing_time_ms: f64,
    pub started_at: Option<DateTime<Utc>>,
}

/// Queue processing counters.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SliceCounters {
    pub(crate) slices: u64,
    pub(crate) busy: Duration,
}

impl SliceCounters {
    pub(crate) fn record(&mut self, elapsed: Duration) {
        self.slices += 1;
        self.busy += elapsed;
    }

    pub(crate) fn busy_ms(&self) -> f64 {
        self.busy.as_secs_f64() * 1000.0
    }
}
