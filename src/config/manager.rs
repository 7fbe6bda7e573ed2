//! Job manager configuration.

use serde::{Deserialize, Serialize};

/// Default stack size for worker threads.
pub const DEFAULT_STACK_SIZE: usize = 2 * 1024 * 1024;

/// Default queue depth at which submission starts warning.
pub const DEFAULT_QUEUE_WARN_DEPTH: usize = 512;

/// Configuration for a [`crate::core::JobManager`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Worker threads dedicated to each priority tier.
    pub workers_per_tier: usize,
    /// Stack size, in bytes, for every worker thread.
    pub thread_stack_size: usize,
    /// Tier queue depth at which submission logs a warning. Queues are
    /// unbounded; this only makes runaway backlogs visible.
    pub queue_warn_depth: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            workers_per_tier: 1,
            thread_stack_size: DEFAULT_STACK_SIZE,
            queue_warn_depth: DEFAULT_QUEUE_WARN_DEPTH,
        }
    }
}

impl ManagerConfig {
    /// Default configuration: one worker per tier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how many workers each tier gets.
    #[must_use]
    pub const fn with_workers_per_tier(mut self, workers: usize) -> Self {
        self.workers_per_tier = workers;
        self
    }

    /// Sets the worker thread stack size in bytes.
    #[must_use]
    pub const fn with_thread_stack_size(mut self, bytes: usize) -> Self {
        self.thread_stack_size = bytes;
        self
    }

    /// Sets the queue depth at which submission starts warning.
    #[must_use]
    pub const fn with_queue_warn_depth(mut self, depth: usize) -> Self {
        self.queue_warn_depth = depth;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.workers_per_tier == 0 {
            return Err("workers_per_tier must be greater than 0".into());
        }
        if self.thread_stack_size < 64 * 1024 {
            return Err("thread_stack_size must be at least 64 KiB".into());
        }
        if self.queue_warn_depth == 0 {
            return Err("queue_warn_depth must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse a manager configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ManagerConfig::default().validate().is_ok());
    }

    #[test]
    fn builders_set_every_field() {
        let cfg = ManagerConfig::new()
            .with_workers_per_tier(2)
            .with_thread_stack_size(256 * 1024)
            .with_queue_warn_depth(64);
        assert_eq!(cfg.workers_per_tier, 2);
        assert_eq!(cfg.thread_stack_size, 256 * 1024);
        assert_eq!(cfg.queue_warn_depth, 64);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_workers_is_rejected() {
        let err = ManagerConfig::new()
            .with_workers_per_tier(0)
            .validate()
            .unwrap_err();
        assert!(err.contains("workers_per_tier"));
    }

    #[test]
    fn tiny_stacks_are_rejected() {
        let err = ManagerConfig::new()
            .with_thread_stack_size(1024)
            .validate()
            .unwrap_err();
        assert!(err.contains("thread_stack_size"));
    }

    #[test]
    fn zero_warn_depth_is_rejected() {
        let err = ManagerConfig::new()
            .with_queue_warn_depth(0)
            .validate()
            .unwrap_err();
        assert!(err.contains("queue_warn_depth"));
    }

    #[test]
    fn json_round_trip() {
        let json = r#"{
            "workers_per_tier": 2,
            "thread_stack_size": 1048576,
            "queue_warn_depth": 100
        }"#;
        let cfg = ManagerConfig::from_json_str(json).expect("valid config");
        assert_eq!(cfg.workers_per_tier, 2);
        assert_eq!(cfg.thread_stack_size, 1_048_576);
        assert_eq!(cfg.queue_warn_depth, 100);
    }

    #[test]
    fn invalid_json_and_invalid_values_are_rejected() {
        assert!(ManagerConfig::from_json_str("not json").is_err());

        let zero_workers = r#"{
            "workers_per_tier": 0,
            "thread_stack_size": 1048576,
            "queue_warn_depth": 100
        }"#;
        let err = ManagerConfig::from_json_str(zero_workers).unwrap_err();
        assert!(err.contains("workers_per_tier"));
    }
}
