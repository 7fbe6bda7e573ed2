//! Registry records and queue entries for submitted jobs.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::job::{CancelToken, Job, OnComplete, Priority};

/// Identifier handed back by submission, unique for the life of a manager
/// instance and never reused. Live in the registry until its job finishes.
pub type JobId = u64;

/// Lifecycle state of a registered job: `Queued → Running → Finished`, no
/// way back.
///
/// Cancellation is not a state. It is an orthogonal monotonic flag on the
/// record, settable while the job is queued or running and observed by the
/// job itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Waiting in its tier's queue.
    Queued,
    /// Executing on a worker thread.
    Running,
    /// `do_work` returned, or the entry was disposed of unrun. The record
    /// leaves the registry at this transition, so the state is never
    /// observable through the registry.
    Finished,
}

/// Registry-side metadata for one submitted job. The job itself and its
/// callback travel with the [`QueuedJob`] entry; the record stays behind for
/// cancellation and introspection.
pub(crate) struct JobRecord {
    pub priority: Priority,
    /// Snapshot of `job_type()` taken at submission. Type queries read this
    /// rather than calling into a job its worker may be mutating.
    pub job_type: String,
    pub state: JobState,
    pub cancel: Arc<CancelToken>,
}

/// Queue entry carrying the job and its callback to a worker thread.
pub(crate) struct QueuedJob {
    pub id: JobId,
    pub job: Box<dyn Job>,
    pub on_complete: Option<OnComplete>,
    /// Same flag as the record's; read at dequeue to skip jobs cancelled
    /// while queued.
    pub cancel: Arc<CancelToken>,
}
