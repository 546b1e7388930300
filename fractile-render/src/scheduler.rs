use std::sync::mpsc;
use std::time::Instant;

use tracing::{debug, info, trace};

use fractile_core::{Complex, KernelParams, Viewport};

use crate::config::SchedulerConfig;
use crate::error::SchedError;
use crate::sink::ResultSink;
use crate::unit::TileCursor;
use crate::worker::{spawn_pool, Completion, WorkerHandle};

/// Distributes per-tile escape-time work across a fixed pool of compute
/// workers and streams fresh results to a sink.
///
/// The scheduler is the sole owner of the generation counter, the
/// viewport, and the work sequence; workers only ever exchange
/// [`Dispatch`](crate::worker::Dispatch) and [`Completion`] messages
/// with it. Every view change bumps the generation and rebuilds the
/// work sequence — results computed for an older generation are
/// recognised by their tag and silently dropped, which is the entire
/// cancellation model: nothing is ever preempted, so the worst-case
/// cancellation latency is one unit's compute time per worker.
///
/// None of the scheduler's own transitions block. An interactive caller
/// drives it with [`poll`](Self::poll) from its event loop; a headless
/// caller can use [`render_frame`](Self::render_frame) to produce one
/// complete frame synchronously.
pub struct TileScheduler<S: ResultSink> {
    config: SchedulerConfig,
    params: KernelParams,
    viewport: Viewport,
    /// Strictly monotonic epoch; bumped once per view-changing
    /// operation, never reused.
    generation: u64,
    /// Work sequence for the current generation. `None` between a
    /// cancel and the next redraw, and before the first redraw.
    cursor: Option<TileCursor>,
    workers: Vec<WorkerHandle>,
    completions: mpsc::Receiver<Completion>,
    sink: S,
}

impl<S: ResultSink> TileScheduler<S> {
    /// Validate the configuration, spawn the worker pool, and return a
    /// scheduler with no work outstanding. Nothing is computed until
    /// the first [`redraw`](Self::redraw) (or view change).
    pub fn new(
        config: SchedulerConfig,
        params: KernelParams,
        viewport: Viewport,
        sink: S,
    ) -> Result<Self, SchedError> {
        config.validate()?;
        let buffer_len = config.block_size as usize * config.block_size as usize;
        let (completion_tx, completion_rx) = mpsc::channel();
        let workers = spawn_pool(config.worker_count, buffer_len, &completion_tx);
        debug!(
            workers = config.worker_count,
            block_size = config.block_size,
            "scheduler ready"
        );
        Ok(Self {
            config,
            params,
            viewport,
            generation: 0,
            cursor: None,
            workers,
            completions: completion_rx,
            sink,
        })
    }

    // -- accessors --

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn params(&self) -> KernelParams {
        self.params
    }

    pub fn config(&self) -> SchedulerConfig {
        self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The sink is an external collaborator — on resize, reallocating
    /// its storage is the caller's job, through this.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Workers with a unit in flight.
    pub fn busy_count(&self) -> usize {
        self.workers.iter().filter(|w| !w.idle).count()
    }

    pub fn is_idle(&self) -> bool {
        self.busy_count() == 0
    }

    // -- state machine transitions --

    /// Start over for the current viewport: advance the generation,
    /// rebuild the work sequence, and feed every idle worker one unit.
    /// Busy workers are left alone — their eventual results will carry
    /// the old tag and be dropped, and they re-enter the new sequence
    /// the moment they complete.
    pub fn redraw(&mut self) {
        self.generation += 1;
        self.cursor = Some(TileCursor::new(
            self.generation,
            self.viewport,
            self.config.block_size,
        ));
        debug!(
            generation = self.generation,
            width = self.viewport.width,
            height = self.viewport.height,
            "redraw"
        );
        for worker in 0..self.workers.len() {
            if self.workers[worker].idle {
                self.feed(worker);
            }
        }
    }

    /// Stop producing work without starting anything new. In-flight
    /// units run to completion and die at the generation check; workers
    /// then fall idle until the next redraw.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.cursor = None;
        debug!(generation = self.generation, "cancelled");
    }

    /// Replace the iteration parameters and recompute the frame.
    pub fn set_params(&mut self, params: KernelParams) {
        self.params = params;
        self.redraw();
    }

    // -- viewport controller operations --

    /// Translate the view by a plane-space delta and recompute.
    pub fn pan(&mut self, delta_r: f64, delta_i: f64) {
        self.viewport = self.viewport.panned(delta_r, delta_i);
        self.redraw();
    }

    /// Commit a pixel-space drag and recompute.
    pub fn pan_pixels(&mut self, dx: f64, dy: f64) {
        self.viewport = self.viewport.panned_pixels(dx, dy);
        self.redraw();
    }

    /// Re-centre on a plane point, multiply the scale by `factor`
    /// (`< 1` zooms in), and recompute.
    pub fn zoom(&mut self, center_r: f64, center_i: f64, factor: f64) -> Result<(), SchedError> {
        let target = Complex::new(center_r, center_i);
        self.viewport = Viewport::new(
            target,
            self.viewport.scale * factor,
            self.viewport.width,
            self.viewport.height,
        )?;
        self.redraw();
        Ok(())
    }

    /// Zoom in by the configured factor around a clicked canvas pixel.
    pub fn zoom_in_at(&mut self, px: f64, py: f64) -> Result<(), SchedError> {
        let target = self.viewport.subpixel_to_complex(px, py);
        self.zoom(target.re, target.im, 1.0 / self.config.zoom_factor)
    }

    /// Zoom out by the configured factor around a clicked canvas pixel.
    pub fn zoom_out_at(&mut self, px: f64, py: f64) -> Result<(), SchedError> {
        let target = self.viewport.subpixel_to_complex(px, py);
        self.zoom(target.re, target.im, self.config.zoom_factor)
    }

    /// Back to the home view and recompute.
    pub fn reset(&mut self) {
        self.viewport = Viewport::home(self.viewport.width, self.viewport.height);
        self.redraw();
    }

    /// Adopt a new canvas size and recompute. The centre and scale are
    /// unchanged; the average-dimension mapping keeps the aspect ratio
    /// correct on its own. Worker buffers are block-sized, not
    /// canvas-sized, so nothing here reallocates — resizing the sink's
    /// storage is the caller's side of the bargain.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), SchedError> {
        self.viewport = self.viewport.resized(width, height)?;
        self.redraw();
        Ok(())
    }

    // -- completion handling --

    /// One worker finished one unit: forward the result iff it is
    /// still current, reclaim the buffer, and immediately re-feed the
    /// worker from the *current* sequence — a stale result still frees
    /// the worker for fresh work.
    fn on_completion(&mut self, completion: Completion) {
        let Completion { worker, result } = completion;
        if result.generation == self.generation {
            self.sink
                .accept(result.x, result.y, result.width, result.height, &result.counts);
        } else {
            trace!(
                stale = result.generation,
                current = self.generation,
                x = result.x,
                y = result.y,
                "discarding stale result"
            );
        }
        let slot = &mut self.workers[worker];
        slot.counts = Some(result.counts);
        slot.idle = true;
        self.feed(worker);
    }

    /// Pull the next unit for an idle worker, or leave it idle if the
    /// sequence is exhausted (or cancelled).
    fn feed(&mut self, worker: usize) {
        match self.cursor.as_mut().and_then(TileCursor::next_unit) {
            Some(unit) => self.workers[worker].dispatch(unit, self.params),
            None => self.workers[worker].idle = true,
        }
    }

    // -- drive --

    /// Handle every completion that has already arrived, without
    /// blocking. Returns how many were handled. This is the call an
    /// interactive event loop makes once per tick.
    pub fn poll(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(completion) = self.completions.try_recv() {
            self.on_completion(completion);
            handled += 1;
        }
        handled
    }

    /// Block until every worker is idle, handling completions as they
    /// arrive.
    pub fn run_until_idle(&mut self) -> Result<(), SchedError> {
        while !self.is_idle() {
            let completion = self
                .completions
                .recv()
                .map_err(|_| SchedError::PoolShutDown)?;
            self.on_completion(completion);
        }
        Ok(())
    }

    /// Produce one complete frame synchronously: redraw, then drain.
    pub fn render_frame(&mut self) -> Result<(), SchedError> {
        let start = Instant::now();
        self.redraw();
        self.run_until_idle()?;
        info!(
            generation = self.generation,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "frame complete"
        );
        Ok(())
    }
}
