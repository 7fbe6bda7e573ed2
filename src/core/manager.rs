//! The job manager: submission, cancellation, pause control, introspection,
//! and worker lifecycle.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::ManagerConfig;

use super::error::EngineError;
use super::job::{CancelToken, FnJob, Job, OnComplete, Priority};
use super::queue::TierQueue;
use super::record::{JobId, QueuedJob};
use super::registry::Registry;

/// Lifetime totals, updated lock-free by submission and the workers.
#[derive(Debug, Default)]
struct ManagerCounters {
    submitted: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
}

/// Point-in-time view of the manager from [`JobManager::stats`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManagerStats {
    /// Worker threads across all tiers.
    pub workers: usize,
    /// Registered jobs not yet started (queued, or picked up by a worker but
    /// not yet running).
    pub queued: usize,
    /// Jobs currently executing.
    pub running: usize,
    /// Jobs accepted since construction.
    pub submitted: u64,
    /// Jobs whose `do_work` returned, successfully or not.
    pub completed: u64,
    /// Subset of `completed` that reported failure. A contained panic counts
    /// as a failure.
    pub failed: u64,
    /// Jobs disposed of without running: cancelled while queued, or drained
    /// by `restart`/teardown.
    pub skipped: u64,
}

/// Priority-tiered job scheduler with dedicated worker threads per tier.
///
/// Jobs are queued FIFO within their tier and started by that tier's own
/// workers, so a paused or busy tier never stalls another. Cancellation is
/// cooperative: [`JobManager::cancel_job`] flips a flag the running job is
/// expected to poll. All methods take `&self`; share the manager behind an
/// [`Arc`] or borrow it from an owning scope.
///
/// Dropping the manager cancels everything, disposes of queued entries, and
/// joins the workers. A running job that never polls its token delays the
/// drop until it returns.
pub struct JobManager {
    registry: Arc<Registry>,
    /// Indexed by [`Priority::index`].
    tiers: Vec<Arc<TierQueue>>,
    counters: Arc<ManagerCounters>,
    workers: Vec<JoinHandle<()>>,
    queue_warn_depth: usize,
}

impl JobManager {
    /// Creates a manager with [`ManagerConfig::default`]: one worker per
    /// tier.
    ///
    /// # Panics
    ///
    /// Panics if the OS refuses to spawn a worker thread; use
    /// [`Self::with_config`] to handle that.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ManagerConfig::default()).expect("default configuration must start")
    }

    /// Validates `config`, builds the tier queues, and spawns
    /// `workers_per_tier` named workers for every priority tier.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidConfig`] if validation rejects the config,
    /// [`EngineError::Spawn`] if a worker thread cannot be started (any
    /// workers already spawned are shut down and joined first).
    pub fn with_config(config: ManagerConfig) -> Result<Self, EngineError> {
        config.validate().map_err(EngineError::InvalidConfig)?;

        let registry = Arc::new(Registry::new());
        let counters = Arc::new(ManagerCounters::default());
        let tiers: Vec<Arc<TierQueue>> = Priority::ALL
            .iter()
            .map(|priority| Arc::new(TierQueue::new(*priority)))
            .collect();

        let mut workers = Vec::with_capacity(tiers.len() * config.workers_per_tier);
        for tier in &tiers {
            for n in 0..config.workers_per_tier {
                match spawn_worker(tier, &registry, &counters, n, config.thread_stack_size) {
                    Ok(handle) => workers.push(handle),
                    Err(err) => {
                        for t in &tiers {
                            t.shutdown();
                        }
                        for handle in workers {
                            let _ = handle.join();
                        }
                        return Err(EngineError::Spawn(err));
                    }
                }
            }
        }

        info!(
            workers = workers.len(),
            tiers = Priority::ALL.len(),
            "job manager started"
        );
        Ok(Self {
            registry,
            tiers,
            counters,
            workers,
            queue_warn_depth: config.queue_warn_depth,
        })
    }

    /// Submits a boxed job at the default tier, [`Priority::Low`].
    pub fn add_job(&self, job: Box<dyn Job>, on_complete: Option<OnComplete>) -> JobId {
        self.add_job_with_priority(job, on_complete, Priority::default())
    }

    /// Submits a boxed job to the given tier and returns its id immediately;
    /// submission never blocks on execution.
    ///
    /// The job runs after every earlier submission to the same tier. The id
    /// stays live in the registry until the job finishes, which is what
    /// [`Self::cancel_job`] and the processing queries key on.
    pub fn add_job_with_priority(
        &self,
        job: Box<dyn Job>,
        on_complete: Option<OnComplete>,
        priority: Priority,
    ) -> JobId {
        let job_type = job.job_type().to_owned();
        let (id, cancel) = self.registry.register(priority, job_type);
        self.counters.submitted.fetch_add(1, Ordering::Relaxed);

        let depth = self.tiers[priority.index()].push(QueuedJob {
            id,
            job,
            on_complete,
            cancel,
        });
        if depth >= self.queue_warn_depth {
            warn!(
                tier = priority.label(),
                depth, "tier queue depth past warn watermark"
            );
        }
        debug!(job_id = id, tier = priority.label(), "job queued");
        id
    }

    /// Submits a closure as a job. The closure receives the cancellation
    /// token and returns the job's success value; its type tag is empty.
    pub fn submit<F>(&self, f: F, priority: Priority) -> JobId
    where
        F: FnMut(&CancelToken) -> bool + Send + 'static,
    {
        self.add_job_with_priority(Box::new(FnJob::new(f)), None, priority)
    }

    /// Requests cooperative cancellation of one job.
    ///
    /// A job still queued is additionally skipped at dequeue without ever
    /// running (its callback is then not invoked). An unknown id (already
    /// finished, or never issued) is silently ignored: callers cannot
    /// synchronize perfectly with completion and are not expected to.
    pub fn cancel_job(&self, id: JobId) {
        if self.registry.cancel(id) {
            debug!(job_id = id, "cancellation requested");
        } else {
            debug!(job_id = id, "cancel of unknown id ignored");
        }
    }

    /// Requests cooperative cancellation of every registered job, queued and
    /// running. Fire-and-forget: returns without waiting for anything to
    /// stop. Pair with [`Self::restart`] to wait and wipe the slate.
    pub fn cancel_jobs(&self) {
        let flagged = self.registry.cancel_all();
        info!(flagged, "cancellation requested for all registered jobs");
    }

    /// Closes the pause gate: pausable tiers stop dequeuing until
    /// [`Self::unpause_jobs`]. Jobs already running are unaffected, as are
    /// non-pausable tiers. Idempotent.
    pub fn pause_jobs(&self) {
        for tier in self.tiers.iter().filter(|t| t.priority().is_pausable()) {
            tier.set_paused(true);
        }
        info!("pausable tiers paused");
    }

    /// Reopens the pause gate and wakes every worker parked on it.
    /// Idempotent.
    pub fn unpause_jobs(&self) {
        for tier in self.tiers.iter().filter(|t| t.priority().is_pausable()) {
            tier.set_paused(false);
        }
        info!("pausable tiers unpaused");
    }

    /// True while at least one job of the tier is running. Queued jobs do
    /// not count, so a paused tier goes quiet once its in-flight job
    /// finishes even with work still queued.
    #[must_use]
    pub fn is_processing(&self, priority: Priority) -> bool {
        self.registry.is_processing(priority)
    }

    /// Number of running jobs whose type tag equals `job_type`. Zero when
    /// nothing matches; querying a type nobody runs is not an error.
    #[must_use]
    pub fn processing_count(&self, job_type: &str) -> usize {
        self.registry.processing_count(job_type)
    }

    /// Snapshot of live queue/running counts and lifetime totals.
    #[must_use]
    pub fn stats(&self) -> ManagerStats {
        let (queued, running) = self.registry.state_counts();
        ManagerStats {
            workers: self.workers.len(),
            queued,
            running,
            submitted: self.counters.submitted.load(Ordering::Relaxed),
            completed: self.counters.completed.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            skipped: self.counters.skipped.load(Ordering::Relaxed),
        }
    }

    /// Returns the manager to a clean, reusable state.
    ///
    /// Drains every tier queue (drained jobs are dropped unrun, without
    /// callbacks) and then blocks until every job registered before this
    /// call has finished. Meant to follow [`Self::cancel_jobs`], which makes
    /// in-flight work exit promptly; a running job that ignores its token
    /// prolongs the wait. Safe to call with nothing pending. Jobs submitted
    /// concurrently with the drain are not waited for and run normally.
    /// Workers stay up throughout; the pause state is preserved.
    pub fn restart(&self) {
        let pending = self.registry.registered_ids();
        let drained_ids = self.drain_tiers();
        self.registry.wait_finished(&pending);
        info!(
            drained = drained_ids.len(),
            waited = pending.len(),
            "job manager restarted"
        );
    }

    /// Empties every tier queue, dropping the entries and their registry
    /// records. Returns the dropped ids.
    fn drain_tiers(&self) -> Vec<JobId> {
        let mut drained_ids = Vec::new();
        for tier in &self.tiers {
            for entry in tier.drain() {
                drained_ids.push(entry.id);
            }
        }
        self.counters
            .skipped
            .fetch_add(drained_ids.len() as u64, Ordering::Relaxed);
        self.registry.remove_many(&drained_ids);
        drained_ids
    }
}

impl Default for JobManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for JobManager {
    /// Cancels every registered job, signals per-tier shutdown (which
    /// overrides the pause gate), disposes of queued entries, and joins the
    /// workers.
    fn drop(&mut self) {
        self.registry.cancel_all();
        for tier in &self.tiers {
            tier.shutdown();
        }
        let drained = self.drain_tiers();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                warn!("worker thread panicked during teardown");
            }
        }
        info!(drained = drained.len(), "job manager torn down");
    }
}

fn spawn_worker(
    tier: &Arc<TierQueue>,
    registry: &Arc<Registry>,
    counters: &Arc<ManagerCounters>,
    n: usize,
    stack_size: usize,
) -> std::io::Result<JoinHandle<()>> {
    let tier = Arc::clone(tier);
    let registry = Arc::clone(registry);
    let counters = Arc::clone(counters);
    std::thread::Builder::new()
        .name(format!("job-{}-{n}", tier.priority().label()))
        .stack_size(stack_size)
        .spawn(move || worker_loop(&tier, &registry, &counters))
}

/// Dequeue-execute loop run by every worker thread until shutdown.
fn worker_loop(tier: &TierQueue, registry: &Registry, counters: &ManagerCounters) {
    debug!(tier = tier.priority().label(), "worker started");
    while let Some(entry) = tier.next_job() {
        if entry.cancel.is_cancelled() {
            debug!(job_id = entry.id, "skipping job cancelled while queued");
            counters.skipped.fetch_add(1, Ordering::Relaxed);
            registry.finish(entry.id);
            continue;
        }
        run_job(entry, tier, registry, counters);
    }
    debug!(tier = tier.priority().label(), "worker exiting");
}

/// Runs one dequeued job: state transition, contained execution, callback,
/// then record removal, so processing queries never report a job whose
/// callback has already fired.
fn run_job(entry: QueuedJob, tier: &TierQueue, registry: &Registry, counters: &ManagerCounters) {
    let QueuedJob {
        id,
        mut job,
        on_complete,
        cancel,
    } = entry;

    if !registry.mark_running(id) {
        // Records outlive their queue entries; nothing should be able to
        // remove one for a job a worker is holding.
        error!(job_id = id, "record missing at dequeue, running job anyway");
    }
    debug!(job_id = id, tier = tier.priority().label(), "job started");

    let success = catch_unwind(AssertUnwindSafe(|| job.do_work(&cancel))).unwrap_or_else(|_| {
        error!(job_id = id, "job panicked, treating as failure");
        false
    });

    counters.completed.fetch_add(1, Ordering::Relaxed);
    if !success {
        counters.failed.fetch_add(1, Ordering::Relaxed);
    }

    if let Some(callback) = on_complete {
        if catch_unwind(AssertUnwindSafe(move || callback(id, success, job.as_ref()))).is_err() {
            error!(job_id = id, "completion callback panicked");
        }
    }
    registry.finish(id);
    debug!(job_id = id, success, "job finished");
}
