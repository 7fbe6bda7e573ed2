//! Id allocation and the authoritative id→record registry.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use super::job::{CancelToken, Priority};
use super::record::{JobId, JobRecord, JobState};

struct RegistryInner {
    next_id: JobId,
    records: HashMap<JobId, JobRecord>,
}

/// Shared id→record map behind the manager's cancellation and introspection
/// surface.
///
/// `drained` is signalled whenever records leave the map; `restart` parks on
/// it until everything it snapshotted is gone.
pub(crate) struct Registry {
    inner: Mutex<RegistryInner>,
    drained: Condvar,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                next_id: 0,
                records: HashMap::new(),
            }),
            drained: Condvar::new(),
        }
    }

    /// Allocates a fresh id and registers a `Queued` record, returning the
    /// id and the record's cancellation token. Ids are monotonic and never
    /// reused.
    pub fn register(&self, priority: Priority, job_type: String) -> (JobId, Arc<CancelToken>) {
        let cancel = Arc::new(CancelToken::new());
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.records.insert(
            id,
            JobRecord {
                priority,
                job_type,
                state: JobState::Queued,
                cancel: Arc::clone(&cancel),
            },
        );
        (id, cancel)
    }

    /// Flips a dequeued record to `Running`. A missing record means a
    /// lifecycle invariant broke; the caller decides how loudly to complain.
    pub fn mark_running(&self, id: JobId) -> bool {
        let mut inner = self.inner.lock();
        inner.records.get_mut(&id).is_some_and(|record| {
            record.state = JobState::Running;
            true
        })
    }

    /// Drops the record, which is the `Finished` transition, and wakes any
    /// waiting `restart`.
    pub fn finish(&self, id: JobId) {
        let mut inner = self.inner.lock();
        inner.records.remove(&id);
        drop(inner);
        self.drained.notify_all();
    }

    /// Sets the cancel flag if the id is registered. An unknown id is the
    /// expected submit/finish race: no effect, returns false.
    pub fn cancel(&self, id: JobId) -> bool {
        let inner = self.inner.lock();
        inner.records.get(&id).is_some_and(|record| {
            record.cancel.set();
            true
        })
    }

    /// Sets the cancel flag on every registered record, returning how many
    /// were flagged. Holding the lock for the sweep means no record
    /// registered before this call can slip past unflagged.
    pub fn cancel_all(&self) -> usize {
        let inner = self.inner.lock();
        for record in inner.records.values() {
            record.cancel.set();
        }
        inner.records.len()
    }

    /// True if at least one `Running` record belongs to the tier.
    pub fn is_processing(&self, priority: Priority) -> bool {
        self.inner
            .lock()
            .records
            .values()
            .any(|r| r.state == JobState::Running && r.priority == priority)
    }

    /// Number of `Running` records whose type snapshot equals `job_type`.
    pub fn processing_count(&self, job_type: &str) -> usize {
        self.inner
            .lock()
            .records
            .values()
            .filter(|r| r.state == JobState::Running && r.job_type == job_type)
            .count()
    }

    /// Queued and running record counts, taken under one lock.
    pub fn state_counts(&self) -> (usize, usize) {
        let inner = self.inner.lock();
        let mut queued = 0;
        let mut running = 0;
        for record in inner.records.values() {
            match record.state {
                JobState::Queued => queued += 1,
                JobState::Running => running += 1,
                JobState::Finished => {}
            }
        }
        (queued, running)
    }

    /// Ids of every currently registered record.
    pub fn registered_ids(&self) -> Vec<JobId> {
        self.inner.lock().records.keys().copied().collect()
    }

    /// Drops records whose entries were disposed of unrun (queue drains).
    pub fn remove_many(&self, ids: &[JobId]) {
        if ids.is_empty() {
            return;
        }
        let mut inner = self.inner.lock();
        for id in ids {
            inner.records.remove(id);
        }
        drop(inner);
        self.drained.notify_all();
    }

    /// Blocks until none of `ids` remain registered.
    pub fn wait_finished(&self, ids: &[JobId]) {
        let mut inner = self.inner.lock();
        while ids.iter().any(|id| inner.records.contains_key(id)) {
            self.drained.wait(&mut inner);
        }
    }
}
