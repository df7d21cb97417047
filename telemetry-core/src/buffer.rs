//! Bounded in-memory queue shared by the span, metric, and log buffers.
//!
//! Telemetry data waiting for export must never grow without bound while the
//! backend is unreachable. When full, the queue drops the oldest entries so
//! the freshest telemetry survives an outage.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::debug;

/// Bounded FIFO queue with oldest-first overflow.
#[derive(Debug)]
pub(crate) struct BoundedQueue<T> {
    items: Mutex<VecDeque<T>>,
    capacity: usize,
    dropped: AtomicU64,
}

impl<T> BoundedQueue<T> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            capacity,
            dropped: AtomicU64::new(0),
        }
    }

    /// Append an item, evicting the oldest entry when at capacity.
    pub(crate) fn push(&self, item: T, signal: &'static str) {
        let Ok(mut items) = self.items.lock() else {
            // A poisoned lock means a panic mid-push; dropping one item is
            // the only safe recovery.
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        };
        if items.len() >= self.capacity {
            items.pop_front();
            let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            debug!(signal, dropped, "telemetry buffer full, dropped oldest entry");
        }
        items.push_back(item);
    }

    /// Remove and return up to `max` items from the front of the queue.
    pub(crate) fn drain(&self, max: usize) -> Vec<T> {
        let Ok(mut items) = self.items.lock() else {
            return Vec::new();
        };
        let take = max.min(items.len());
        items.drain(..take).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
