//! Integration tests for the job manager's execution pipeline
//!
//! These tests validate real-world functionality including:
//! - Job execution through the trait and closure APIs
//! - FIFO ordering within a tier
//! - Distinct id assignment across tiers
//! - Completion callbacks and failure accounting
//! - Panic containment inside worker threads
//! - Concurrent execution with extra workers per tier
//! - Cancellation and join on drop

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use tierpool::config::ManagerConfig;
use tierpool::core::{CancelToken, Job, JobManager, Priority};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Polls `cond` every millisecond until it holds or `timeout` elapses.
fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    cond()
}

// ============================================================================
// TEST JOBS - Real implementations for testing
// ============================================================================

/// Job that flips a flag so tests can observe that it ran.
struct FlagJob {
    ran: Arc<AtomicBool>,
    succeed: bool,
}

impl FlagJob {
    fn new(ran: &Arc<AtomicBool>) -> Self {
        Self {
            ran: Arc::clone(ran),
            succeed: true,
        }
    }

    fn failing(ran: &Arc<AtomicBool>) -> Self {
        Self {
            ran: Arc::clone(ran),
            succeed: false,
        }
    }
}

impl Job for FlagJob {
    fn do_work(&mut self, _cancel: &CancelToken) -> bool {
        self.ran.store(true, Ordering::SeqCst);
        self.succeed
    }

    fn job_type(&self) -> &str {
        "flag"
    }
}

/// Job that signals when it starts, then parks until the test releases it.
struct BlockingJob {
    kind: &'static str,
    started_tx: Sender<()>,
    release_rx: Receiver<()>,
}

impl Job for BlockingJob {
    fn do_work(&mut self, _cancel: &CancelToken) -> bool {
        let _ = self.started_tx.send(());
        let _ = self.release_rx.recv();
        true
    }

    fn job_type(&self) -> &str {
        self.kind
    }
}

/// Control handles for a [`BlockingJob`] kept on the test side.
struct BlockingHandle {
    started: Receiver<()>,
    release: Sender<()>,
}

fn blocking_job(kind: &'static str) -> (BlockingJob, BlockingHandle) {
    let (started_tx, started) = bounded(1);
    let (release, release_rx) = bounded(1);
    let job = BlockingJob {
        kind,
        started_tx,
        release_rx,
    };
    (job, BlockingHandle { started, release })
}

// ============================================================================
// TESTS
// ============================================================================

/// Test basic trait-object submission runs to completion
#[test]
fn test_single_job_runs_to_completion() {
    println!("\n=== test_single_job_runs_to_completion ===");

    let manager = JobManager::new();
    let ran = Arc::new(AtomicBool::new(false));
    manager.add_job_with_priority(Box::new(FlagJob::new(&ran)), None, Priority::High);

    assert!(
        wait_until(Duration::from_secs(5), || ran.load(Ordering::SeqCst)),
        "job never ran"
    );
    assert!(wait_until(Duration::from_secs(5), || {
        let stats = manager.stats();
        stats.completed == 1 && stats.running == 0
    }));
    let stats = manager.stats();
    println!("Final stats: {stats:?}");
    assert_eq!(stats.submitted, 1);
    assert_eq!(stats.failed, 0);

    println!("=== test_single_job_runs_to_completion PASSED ===\n");
}

/// Test every submission gets a distinct id, across all tiers
#[test]
fn test_job_ids_are_distinct() {
    println!("\n=== test_job_ids_are_distinct ===");

    let manager = JobManager::new();
    let mut ids = HashSet::new();
    for i in 0..100 {
        let priority = Priority::ALL[i % Priority::ALL.len()];
        let id = manager.submit(move |_cancel| true, priority);
        ids.insert(id);
    }

    println!("Submitted 100 jobs, got {} distinct ids", ids.len());
    assert_eq!(ids.len(), 100);

    assert!(wait_until(Duration::from_secs(10), || {
        manager.stats().completed == 100
    }));

    println!("=== test_job_ids_are_distinct PASSED ===\n");
}

/// Test jobs on one tier run in submission order
#[test]
fn test_jobs_run_in_submission_order() {
    println!("\n=== test_jobs_run_in_submission_order ===");

    // Default config: one worker per tier, so ordering is observable.
    let manager = JobManager::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    for i in 0..8 {
        let order = Arc::clone(&order);
        manager.submit(
            move |_cancel| {
                order.lock().push(i);
                true
            },
            Priority::Normal,
        );
    }

    assert!(wait_until(Duration::from_secs(5), || {
        manager.stats().completed == 8
    }));

    let seen = order.lock().clone();
    println!("Execution order: {seen:?}");
    assert_eq!(seen, (0..8).collect::<Vec<_>>());

    println!("=== test_jobs_run_in_submission_order PASSED ===\n");
}

/// Test add_job without a priority lands on the low tier
#[test]
fn test_default_priority_is_low() {
    println!("\n=== test_default_priority_is_low ===");

    let manager = JobManager::new();
    let (job, handle) = blocking_job("background");
    manager.add_job(Box::new(job), None);

    handle
        .started
        .recv_timeout(Duration::from_secs(5))
        .expect("Failed to start job");

    assert!(manager.is_processing(Priority::Low));
    assert!(!manager.is_processing(Priority::High));
    assert!(!manager.is_processing(Priority::Normal));
    assert!(!manager.is_processing(Priority::LowPausable));
    println!("Job is running on the low tier");

    handle.release.send(()).expect("Failed to release job");
    assert!(wait_until(Duration::from_secs(5), || {
        !manager.is_processing(Priority::Low)
    }));

    println!("=== test_default_priority_is_low PASSED ===\n");
}

/// Test the completion callback gets the id, the success value, and the job
#[test]
fn test_completion_callback_reports_failure() {
    println!("\n=== test_completion_callback_reports_failure ===");

    let manager = JobManager::new();
    let ran = Arc::new(AtomicBool::new(false));
    let ran_at_callback = Arc::clone(&ran);
    let (tx, rx) = bounded(1);

    let id = manager.add_job(
        Box::new(FlagJob::failing(&ran)),
        Some(Box::new(move |job_id, success, job| {
            let _ = tx.send((
                job_id,
                success,
                job.job_type().to_owned(),
                ran_at_callback.load(Ordering::SeqCst),
            ));
        })),
    );

    let (cb_id, success, kind, work_done_first) = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("Failed to receive callback");

    println!("Callback fired: id={cb_id}, success={success}, kind={kind}");
    assert_eq!(cb_id, id);
    assert!(!success);
    assert_eq!(kind, "flag");
    assert!(work_done_first, "callback must run after do_work returns");

    assert!(wait_until(Duration::from_secs(5), || {
        let stats = manager.stats();
        stats.completed == 1 && stats.failed == 1 && stats.running == 0
    }));

    println!("=== test_completion_callback_reports_failure PASSED ===\n");
}

/// Test a panicking job is contained and its worker keeps serving the tier
#[test]
fn test_worker_survives_a_panicking_job() {
    println!("\n=== test_worker_survives_a_panicking_job ===");

    let manager = JobManager::new();
    manager.submit(
        move |_cancel| panic!("job panicked on purpose"),
        Priority::Normal,
    );
    println!("Panicking job submitted");

    let ran = Arc::new(AtomicBool::new(false));
    manager.add_job_with_priority(Box::new(FlagJob::new(&ran)), None, Priority::Normal);

    assert!(
        wait_until(Duration::from_secs(5), || ran.load(Ordering::SeqCst)),
        "worker died, follow-up job never ran"
    );
    let stats = manager.stats();
    println!("Stats after panic: {stats:?}");
    assert_eq!(stats.completed, 2);
    assert_eq!(stats.failed, 1);

    println!("=== test_worker_survives_a_panicking_job PASSED ===\n");
}

/// Test extra workers let one tier run jobs concurrently
#[test]
fn test_extra_workers_run_one_tier_concurrently() {
    println!("\n=== test_extra_workers_run_one_tier_concurrently ===");

    let config = ManagerConfig::new().with_workers_per_tier(2);
    let manager = JobManager::with_config(config).expect("Failed to create manager");

    let (job_a, handle_a) = blocking_job("concurrent");
    let (job_b, handle_b) = blocking_job("concurrent");
    manager.add_job_with_priority(Box::new(job_a), None, Priority::Normal);
    manager.add_job_with_priority(Box::new(job_b), None, Priority::Normal);

    // Both must start while neither has been released, which takes two
    // workers on the same tier.
    handle_a
        .started
        .recv_timeout(Duration::from_secs(5))
        .expect("Failed to start first job");
    handle_b
        .started
        .recv_timeout(Duration::from_secs(5))
        .expect("Failed to start second job");

    println!("Both jobs running at once");
    assert_eq!(manager.processing_count("concurrent"), 2);

    handle_a.release.send(()).expect("Failed to release");
    handle_b.release.send(()).expect("Failed to release");
    assert!(wait_until(Duration::from_secs(5), || {
        manager.stats().completed == 2
    }));

    println!("=== test_extra_workers_run_one_tier_concurrently PASSED ===\n");
}

/// Test dropping the manager cancels the running job and joins the workers
#[test]
fn test_drop_cancels_and_joins() {
    println!("\n=== test_drop_cancels_and_joins ===");

    let started = Arc::new(AtomicBool::new(false));
    let finished = Arc::new(AtomicBool::new(false));
    {
        let manager = JobManager::new();
        let started_in_job = Arc::clone(&started);
        let finished_in_job = Arc::clone(&finished);
        manager.submit(
            move |cancel| {
                started_in_job.store(true, Ordering::SeqCst);
                while !cancel.should_cancel(0, 0) {
                    std::thread::yield_now();
                }
                finished_in_job.store(true, Ordering::SeqCst);
                false
            },
            Priority::High,
        );

        assert!(wait_until(Duration::from_secs(5), || {
            started.load(Ordering::SeqCst)
        }));
        println!("Job is spinning on its token, dropping the manager");
    }

    // Drop returned, so the worker observed the cancel and was joined.
    assert!(
        finished.load(Ordering::SeqCst),
        "drop must cancel the running job and join its worker"
    );

    println!("=== test_drop_cancels_and_joins PASSED ===\n");
}

/// Test lifetime counters across a mixed batch
#[test]
fn test_stats_track_lifetime_totals() {
    println!("\n=== test_stats_track_lifetime_totals ===");

    let manager = JobManager::new();
    manager.submit(|_cancel| true, Priority::Normal);
    manager.submit(|_cancel| false, Priority::High);
    manager.submit(|_cancel| true, Priority::Low);

    assert!(wait_until(Duration::from_secs(5), || {
        let stats = manager.stats();
        stats.completed == 3 && stats.running == 0
    }));

    let stats = manager.stats();
    println!("Final stats: {stats:?}");
    assert_eq!(stats.submitted, 3);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.skipped, 0);
    assert_eq!(stats.queued, 0);
    assert_eq!(stats.workers, Priority::ALL.len());

    println!("=== test_stats_track_lifetime_totals PASSED ===\n");
}
