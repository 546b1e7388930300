use thiserror::Error;

/// Errors originating from the scheduling crate.
#[derive(Debug, Error)]
pub enum SchedError {
    #[error("invalid worker count: 0 (need at least one compute worker)")]
    InvalidWorkerCount,

    #[error("invalid block size: {0} (must be > 0)")]
    InvalidBlockSize(u32),

    #[error("invalid zoom factor: {0} (must be > 1)")]
    InvalidZoomFactor(f64),

    /// A compute worker's channel closed while work was outstanding.
    /// Only possible if a worker thread died, which the pool never does
    /// in normal operation.
    #[error("worker pool shut down unexpectedly")]
    PoolShutDown,

    #[error(transparent)]
    Core(#[from] fractile_core::CoreError),
}
