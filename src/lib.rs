//! # tierpool
//!
//! A priority-tiered, pausable, cancellable job-execution engine built on
//! dedicated OS worker threads.
//!
//! The engine dispatches caller-defined units of work ([`core::Job`]) across
//! a fixed pool of worker threads partitioned by priority tier. Each tier has
//! its own FIFO queue and its own workers, so a busy, blocked, or paused tier
//! never starves the others. Callers submit jobs, query what is running by
//! tier or by type tag, cancel one job or everything in flight, and pause or
//! resume the interruptible tiers without killing work that has already
//! started.
//!
//! ## Design points
//!
//! - **Per-tier workers**: one or more dedicated threads per [`core::Priority`]
//!   tier, started once and parked on a condvar while idle.
//! - **Cooperative cancellation**: cancelling never interrupts a thread; a
//!   running job observes the request by polling the [`core::CancelToken`]
//!   handed to [`core::Job::do_work`] and returns early on its own.
//! - **Pause gate**: pausing blocks *dequeue* on pausable tiers only. A job
//!   that is already running is never suspended.
//! - **Identity bookkeeping**: every submission gets a unique [`core::JobId`]
//!   backed by a registry record, which is what cancellation and the
//!   `is_processing` queries operate on.
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::mpsc;
//! use tierpool::core::{JobManager, Priority};
//!
//! let manager = JobManager::new();
//! let (tx, rx) = mpsc::channel();
//! manager.submit(move |_cancel| tx.send(6 * 7).is_ok(), Priority::Normal);
//! assert_eq!(rx.recv().unwrap(), 42);
//! ```
//!
//! ## Implementing a job
//!
//! Long-running jobs poll their token so cancellation can take effect:
//!
//! ```rust,ignore
//! use tierpool::core::{CancelToken, Job};
//!
//! struct Transcode { frames: Vec<Frame> }
//!
//! impl Job for Transcode {
//!     fn do_work(&mut self, cancel: &CancelToken) -> bool {
//!         let total = self.frames.len() as u64;
//!         for (i, frame) in self.frames.iter_mut().enumerate() {
//!             if cancel.should_cancel(i as u64, total) {
//!                 return false;
//!             }
//!             frame.transcode();
//!         }
//!         true
//!     }
//!
//!     fn job_type(&self) -> &str {
//!         "transcode"
//!     }
//! }
//! ```
//!
//! For complete scenarios, see `tests/job_manager_test.rs` and
//! `tests/pause_cancel_test.rs`.

#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core job scheduling: the manager, the job contract, and lifecycle types.
pub mod core;
/// Configuration models for the manager and its workers.
pub mod config;
/// Shared utilities: telemetry, date/time conversion, token splitting.
pub mod util;
