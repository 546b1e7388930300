use serde::{Deserialize, Serialize};

use crate::error::SchedError;

/// Default edge length of a square work unit, in pixels.
pub const DEFAULT_BLOCK_SIZE: u32 = 128;

/// Default scale multiplier applied per zoom step.
pub const DEFAULT_ZOOM_FACTOR: f64 = 4.0;

/// Tuning knobs for the scheduler and its worker pool.
///
/// Everything here is fixed for the lifetime of a scheduler: the pool
/// never grows or shrinks, and the block size determines the one buffer
/// allocation each worker slot ever makes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Number of compute workers. Defaults to the machine's available
    /// parallelism, or 4 when that cannot be determined.
    pub worker_count: usize,

    /// Edge length of a square work unit, in pixels. Units at the
    /// right/bottom canvas edge keep this size and overhang; the sink
    /// clips them.
    pub block_size: u32,

    /// Scale multiplier per zoom step: zooming in divides the viewport
    /// scale by this, zooming out multiplies.
    pub zoom_factor: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            block_size: DEFAULT_BLOCK_SIZE,
            zoom_factor: DEFAULT_ZOOM_FACTOR,
        }
    }
}

fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<(), SchedError> {
        if self.worker_count == 0 {
            return Err(SchedError::InvalidWorkerCount);
        }
        if self.block_size == 0 {
            return Err(SchedError::InvalidBlockSize(self.block_size));
        }
        if self.zoom_factor <= 1.0 || !self.zoom_factor.is_finite() {
            return Err(SchedError::InvalidZoomFactor(self.zoom_factor));
        }
        Ok(())
    }
}
