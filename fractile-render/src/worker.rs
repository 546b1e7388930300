use std::sync::mpsc;

use tracing::{debug, error};

use fractile_core::{escape_time, Complex, KernelParams};

use crate::unit::WorkUnit;

// ---------------------------------------------------------------------------
// Message contract
// ---------------------------------------------------------------------------

/// Message from scheduler to worker: one unit of work plus the buffer to
/// fill. The buffer *moves* with the message — after dispatch the
/// scheduler side holds nothing, so there is no aliasing to race on.
pub struct Dispatch {
    pub unit: WorkUnit,
    pub params: KernelParams,
    pub counts: Vec<u32>,
}

/// Message from worker back to scheduler: the unit's generation and
/// geometry echoed unchanged, buffer filled with per-sample escape
/// counts (the value `params.max_iterations` marking interior samples).
pub struct WorkResult {
    pub generation: u64,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub counts: Vec<u32>,
}

/// A completed result tagged with the slot that produced it, so the
/// scheduler can re-feed that exact worker.
pub struct Completion {
    pub worker: usize,
    pub result: WorkResult,
}

// ---------------------------------------------------------------------------
// Kernel driver
// ---------------------------------------------------------------------------

/// Fill `counts` with the escape time of every sample in `unit`.
///
/// Sample coordinates are interpolated from the unit's own plane
/// bounds, not from any shared viewport — a unit is fully
/// self-contained, so the same unit produces bit-identical output on
/// any worker.
pub fn compute_unit(unit: &WorkUnit, params: &KernelParams, counts: &mut [u32]) {
    debug_assert!(counts.len() >= unit.sample_count());
    let w = unit.width as f64;
    let h = unit.height as f64;
    for py in 0..unit.height {
        let c_i = unit.i_start + (unit.i_end - unit.i_start) * py as f64 / h;
        let row = (py * unit.width) as usize;
        for px in 0..unit.width {
            let c_r = unit.r_start + (unit.r_end - unit.r_start) * px as f64 / w;
            counts[row + px as usize] = escape_time(Complex::new(c_r, c_i), params);
        }
    }
}

// ---------------------------------------------------------------------------
// Pool
// ---------------------------------------------------------------------------

/// Scheduler-side handle to one worker slot.
///
/// Workers are addressed only by index through these handles; the
/// worker thread knows nothing about the pool it belongs to. Exactly
/// one of two places holds the slot's buffer at any instant: `counts`
/// here while the slot is idle, or the in-flight message while it is
/// busy.
pub(crate) struct WorkerHandle {
    tx: mpsc::Sender<Dispatch>,
    pub(crate) idle: bool,
    pub(crate) counts: Option<Vec<u32>>,
}

impl WorkerHandle {
    /// Move the slot's buffer into a dispatch message and send it.
    pub(crate) fn dispatch(&mut self, unit: WorkUnit, params: KernelParams) {
        let Some(counts) = self.counts.take() else {
            debug_assert!(false, "dispatch on a slot whose buffer is in flight");
            return;
        };
        debug_assert!(self.idle);
        self.idle = false;
        if self
            .tx
            .send(Dispatch {
                unit,
                params,
                counts,
            })
            .is_err()
        {
            // The thread is gone; nothing will ever complete this unit.
            error!(unit.x, unit.y, "compute worker channel closed, unit dropped");
            self.idle = true;
        }
    }
}

/// Spawn `count` compute threads, each owning a pre-allocated buffer of
/// `buffer_len` samples. Completions from every worker funnel into the
/// single `completions` sender.
pub(crate) fn spawn_pool(
    count: usize,
    buffer_len: usize,
    completions: &mpsc::Sender<Completion>,
) -> Vec<WorkerHandle> {
    (0..count)
        .map(|id| {
            let (tx, rx) = mpsc::channel::<Dispatch>();
            let completions = completions.clone();
            std::thread::Builder::new()
                .name(format!("compute-{id}"))
                .spawn(move || worker_loop(id, rx, completions))
                .expect("failed to spawn compute worker thread");
            WorkerHandle {
                tx,
                idle: true,
                counts: Some(vec![0u32; buffer_len]),
            }
        })
        .collect()
}

/// Body of one compute thread: pull a dispatch, run the kernel, hand
/// the filled buffer back. Exits when the scheduler drops its handles
/// (dispatch channel closes) or stops listening for completions.
fn worker_loop(id: usize, rx: mpsc::Receiver<Dispatch>, tx: mpsc::Sender<Completion>) {
    debug!(worker = id, "compute worker started");
    while let Ok(Dispatch {
        unit,
        params,
        mut counts,
    }) = rx.recv()
    {
        compute_unit(&unit, &params, &mut counts);
        let result = WorkResult {
            generation: unit.generation,
            x: unit.x,
            y: unit.y,
            width: unit.width,
            height: unit.height,
            counts,
        };
        if tx.send(Completion { worker: id, result }).is_err() {
            break;
        }
    }
    debug!(worker = id, "compute worker exiting");
}
