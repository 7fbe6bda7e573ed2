//! Per-tier FIFO queues with pause gating and shutdown signalling.

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

use super::job::Priority;
use super::record::QueuedJob;

/// Tier state guarded by the queue mutex.
struct TierInner {
    entries: VecDeque<QueuedJob>,
    paused: bool,
    shutdown: bool,
}

/// One priority tier: pending entries in submission order, the tier's pause
/// gate, and the condvar its workers park on.
///
/// The manager only ever closes the gate on pausable tiers; the queue itself
/// does not care.
pub(crate) struct TierQueue {
    priority: Priority,
    inner: Mutex<TierInner>,
    wake: Condvar,
}

impl TierQueue {
    pub fn new(priority: Priority) -> Self {
        Self {
            priority,
            inner: Mutex::new(TierInner {
                entries: VecDeque::new(),
                paused: false,
                shutdown: false,
            }),
            wake: Condvar::new(),
        }
    }

    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Appends an entry and wakes one parked worker. Returns the resulting
    /// queue depth so the caller can check its warn watermark.
    pub fn push(&self, entry: QueuedJob) -> usize {
        let mut inner = self.inner.lock();
        inner.entries.push_back(entry);
        let depth = inner.entries.len();
        drop(inner);
        self.wake.notify_one();
        depth
    }

    /// Blocks until an entry can be dequeued; `None` means shutdown.
    ///
    /// Shutdown outranks the pause gate, so teardown is never held up by a
    /// paused tier. While the gate is closed, entries stay queued even when
    /// workers are parked right here.
    pub fn next_job(&self) -> Option<QueuedJob> {
        let mut inner = self.inner.lock();
        loop {
            if inner.shutdown {
                return None;
            }
            if !inner.paused {
                if let Some(entry) = inner.entries.pop_front() {
                    return Some(entry);
                }
            }
            self.wake.wait(&mut inner);
        }
    }

    /// Removes and returns every pending entry, in order, without running
    /// any of them.
    pub fn drain(&self) -> Vec<QueuedJob> {
        let mut inner = self.inner.lock();
        inner.entries.drain(..).collect()
    }

    /// Opens or closes the pause gate. Opening wakes every parked worker so
    /// they re-check the queue; closing wakes nobody.
    pub fn set_paused(&self, paused: bool) {
        let mut inner = self.inner.lock();
        inner.paused = paused;
        drop(inner);
        if !paused {
            self.wake.notify_all();
        }
    }

    /// Tells workers to exit once their current job returns.
    pub fn shutdown(&self) {
        let mut inner = self.inner.lock();
        inner.shutdown = true;
        drop(inner);
        self.wake.notify_all();
    }
}
