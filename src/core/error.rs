//! Error types for engine construction.

use thiserror::Error;

/// Errors produced while building a [`crate::core::JobManager`].
///
/// The running engine itself is infallible at its public surface: expected
/// races such as cancelling an already-finished id are silent no-ops, and a
/// job's own failure is reported through its completion callback, never as an
/// engine error.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A worker thread could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
