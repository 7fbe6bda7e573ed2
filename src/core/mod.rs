//! Core scheduling: the job contract, priority tiers, and the manager.

pub mod error;
pub mod job;
pub mod manager;
pub mod record;

mod queue;
mod registry;

pub use error::{AppResult, EngineError};
pub use job::{CancelToken, Job, OnComplete, Priority};
pub use manager::{JobManager, ManagerStats};
pub use record::{JobId, JobState};
