//! The job contract, cancellation token, and priority tiers.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::record::JobId;

/// A unit of work executed by the scheduler.
///
/// Implementations are created by the caller and handed to
/// [`crate::core::JobManager::add_job`] as a `Box<dyn Job>`; the manager owns
/// the job until its work completes or it is disposed of unrun, and is
/// responsible for dropping it.
pub trait Job: Send {
    /// Runs the work to completion on a worker thread.
    ///
    /// Returns `true` for success and `false` for failure; both mean
    /// "finished" to the engine, which forwards the value to the completion
    /// callback and otherwise does not interpret it. Long operations must
    /// poll [`CancelToken::should_cancel`] periodically and return promptly
    /// once it reports true; cancellation is advisory and the engine never
    /// interrupts a running job. What a cancelled job returns is up to the
    /// implementation; document it per job type.
    fn do_work(&mut self, cancel: &CancelToken) -> bool;

    /// Stable category label for type-keyed introspection
    /// ([`crate::core::JobManager::processing_count`]). Not unique, may be
    /// empty. The engine snapshots it at submission.
    fn job_type(&self) -> &str {
        ""
    }

    /// Whether `other` is this exact instance. The default compares
    /// addresses, which is the intended meaning; override only to treat
    /// distinct allocations as one logical job in caller-side bookkeeping.
    /// Boxing a zero-sized job allocates nothing, so distinct zero-sized
    /// instances share an address and compare as the same; give such a type
    /// a field or an override if its identity matters. The engine orders
    /// and tracks jobs by id, never by this relation.
    fn is_same(&self, other: &dyn Job) -> bool {
        std::ptr::eq(
            (self as *const Self).cast::<()>(),
            (other as *const dyn Job).cast::<()>(),
        )
    }
}

/// Completion callback invoked exactly once per executed job, on the worker
/// thread that ran it, after `do_work` returns and before the job's record
/// leaves the registry. Receives the job's id, the `do_work` return value,
/// and a borrow of the job. Jobs disposed of without running (cancelled while
/// queued, drained by restart or teardown) do not get a callback.
pub type OnComplete = Box<dyn FnOnce(JobId, bool, &dyn Job) + Send>;

/// Priority tier of a submitted job.
///
/// Every tier has its own FIFO queue and dedicated worker threads, so tiers
/// make progress independently. [`Priority::LowPausable`] is the one tier the
/// pause gate applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Background work that [`crate::core::JobManager::pause_jobs`] holds
    /// back.
    LowPausable,
    /// Background work that must keep flowing while paused. The default
    /// submission tier.
    #[default]
    Low,
    /// Standard work.
    Normal,
    /// Latency-sensitive work.
    High,
}

impl Priority {
    /// Every tier, in queue-array order.
    pub const ALL: [Self; 4] = [Self::LowPausable, Self::Low, Self::Normal, Self::High];

    /// Whether the pause gate applies to this tier.
    #[must_use]
    pub const fn is_pausable(self) -> bool {
        matches!(self, Self::LowPausable)
    }

    /// Short label used in thread names and log fields.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::LowPausable => "low-pausable",
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }

    /// Position of this tier in per-tier arrays.
    pub(crate) const fn index(self) -> usize {
        match self {
            Self::LowPausable => 0,
            Self::Low => 1,
            Self::Normal => 2,
            Self::High => 3,
        }
    }
}

/// Cancellation flag shared between a job's registry record and the worker
/// executing it, handed to [`Job::do_work`] by reference.
///
/// The flag is monotonic: once set it stays set for the record's lifetime.
#[derive(Debug)]
pub struct CancelToken {
    cancelled: AtomicBool,
}

impl CancelToken {
    pub(crate) fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
        }
    }

    pub(crate) fn set(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether cancellation has been requested for this job.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Cooperative cancellation poll for long-running work.
    ///
    /// `current` and `total` let the job report fractional progress while it
    /// asks; they are emitted as a trace event and not otherwise interpreted.
    /// Returns true once cancellation has been requested.
    pub fn should_cancel(&self, current: u64, total: u64) -> bool {
        let cancelled = self.is_cancelled();
        trace!(current, total, cancelled, "cancellation poll");
        cancelled
    }
}

/// Adapter turning a closure into a [`Job`] for
/// [`crate::core::JobManager::submit`].
pub(crate) struct FnJob<F> {
    f: F,
}

impl<F> FnJob<F>
where
    F: FnMut(&CancelToken) -> bool + Send,
{
    pub(crate) fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Job for FnJob<F>
where
    F: FnMut(&CancelToken) -> bool + Send,
{
    fn do_work(&mut self, cancel: &CancelToken) -> bool {
        (self.f)(cancel)
    }
}
