//! Configuration models for the job manager.

pub mod manager;

pub use manager::{ManagerConfig, DEFAULT_QUEUE_WARN_DEPTH, DEFAULT_STACK_SIZE};
