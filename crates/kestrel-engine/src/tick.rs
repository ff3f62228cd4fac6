//! Tick engine: runs one tick of any kind against the double buffer.
//!
//! [`TickEngine`] owns the current/next frame pair, the validated system
//! pipeline and the fork-join dispatcher. It knows nothing about wall-clock
//! time; the [`Scheduler`](crate::Scheduler) decides when and how often to
//! call it.
//!
//! - [`TickEngine::execute_tick`] runs a full, authoritative tick: stage
//!   next from current, stamp the new tick, run all six phases, swap.
//! - [`TickEngine::interpolate`] runs a render-only tick over a fraction
//!   of the step on a scratch copy of current.
//! - [`TickEngine::estimate`] runs an estimate-only tick (Global phase) on
//!   another scratch copy.
//!
//! Discarded ticks never touch the double buffer.

use std::time::Instant;

use kestrel_arena::{DoubleBuffer, Staging};
use kestrel_core::{SimFrame, SimInput, TickId};
use kestrel_system::{ForkJoin, Phase, Pipeline, StepContext, System, TickKind};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::config::{ConfigError, EngineConfig};
use crate::metrics::StepMetrics;

/// Single-threaded tick executor with optional fork-join helpers.
pub struct TickEngine<F, I> {
    frames: DoubleBuffer<F>,
    render: F,
    estimate: F,
    pipeline: Pipeline<F, I>,
    workers: ForkJoin,
    bucket_hint: usize,
    dt: f32,
    last_metrics: StepMetrics,
}

impl<F: SimFrame, I: SimInput> TickEngine<F, I> {
    /// Build an engine starting from `initial`.
    ///
    /// Validates `config` and the system list and spins up the fork-join
    /// pool.
    pub fn new(
        initial: F,
        systems: Vec<Box<dyn System<F, I>>>,
        config: &EngineConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let pipeline = Pipeline::new(systems)?;
        let worker_count = config.resolved_worker_count();
        let workers = ForkJoin::new(worker_count).map_err(|e| ConfigError::ThreadPool {
            reason: e.to_string(),
        })?;
        debug!(
            systems = pipeline.len(),
            workers = worker_count,
            tick_rate_hz = config.tick_rate_hz,
            "tick engine ready"
        );
        Ok(Self {
            render: initial.clone(),
            estimate: initial.clone(),
            frames: DoubleBuffer::new(initial),
            pipeline,
            workers,
            bucket_hint: config.bucket_hint,
            dt: config.dt(),
            last_metrics: StepMetrics::default(),
        })
    }

    /// Run one full deterministic tick with `input`.
    ///
    /// Next is staged as a copy of current, stamped with `current + 1`,
    /// run through every phase, then published by swapping.
    pub fn execute_tick(&mut self, input: &I) -> &StepMetrics {
        let tick_start = Instant::now();
        let Staging { next, current } = self.frames.stage();
        let tick = current.tick().next();
        next.set_tick(tick);

        let mut ctx = StepContext::new(
            next,
            current,
            input,
            self.dt,
            TickKind::Full,
            tick,
            &self.workers,
        )
        .with_bucket_hint(self.bucket_hint);
        let phase_us = run_timed(&self.pipeline, &mut ctx);
        self.frames.swap();

        self.record(tick, TickKind::Full, tick_start, phase_us);
        &self.last_metrics
    }

    /// Render interpolation: advance a scratch copy of current by
    /// `alpha * dt` through Global and Interpolate. Returns the scratch frame.
    pub fn interpolate(&mut self, input: &I, alpha: f32) -> &F {
        let dt = self.dt * alpha.clamp(0.0, 1.0);
        self.run_discarded(TickKind::Main, input, dt);
        &self.render
    }

    /// Estimate-only tick: advance a scratch copy of current through the
    /// Global phase with an estimated `dt`. Returns the scratch frame.
    pub fn estimate(&mut self, input: &I, dt: f32) -> &F {
        self.run_discarded(TickKind::Global, input, dt);
        &self.estimate
    }

    fn run_discarded(&mut self, kind: TickKind, input: &I, dt: f32) {
        let tick_start = Instant::now();
        let current = self.frames.current();
        let scratch = match kind {
            TickKind::Global => &mut self.estimate,
            _ => &mut self.render,
        };
        scratch.clone_from(current);
        let tick = current.tick();

        let mut ctx = StepContext::new(scratch, current, input, dt, kind, tick, &self.workers)
            .with_bucket_hint(self.bucket_hint);
        let phase_us = run_timed(&self.pipeline, &mut ctx);
        self.record(tick, kind, tick_start, phase_us);
    }

    fn record(
        &mut self,
        tick: TickId,
        kind: TickKind,
        tick_start: Instant,
        phase_us: SmallVec<[(Phase, u64); 6]>,
    ) {
        self.last_metrics = StepMetrics {
            tick,
            kind,
            total_us: tick_start.elapsed().as_micros() as u64,
            phase_us,
        };
        trace!(
            %tick,
            ?kind,
            total_us = self.last_metrics.total_us,
            "tick complete"
        );
    }

    /// Replace both frames with `frame`, e.g. after loading a save or
    /// attaching a replay.
    pub fn reset(&mut self, frame: F) {
        debug!(tick = %frame.tick(), "tick engine reset");
        self.render.clone_from(&frame);
        self.estimate.clone_from(&frame);
        self.frames.reset(frame);
    }

    /// The last completed authoritative frame.
    pub fn current(&self) -> &F {
        self.frames.current()
    }

    /// The authoritative frame before [`TickEngine::current`].
    pub fn previous(&self) -> &F {
        self.frames.previous()
    }

    /// Last render-interpolated frame.
    pub fn render_frame(&self) -> &F {
        &self.render
    }

    /// Last estimate frame.
    pub fn estimate_frame(&self) -> &F {
        &self.estimate
    }

    /// Tick of the current frame.
    pub fn current_tick(&self) -> TickId {
        self.frames.current().tick()
    }

    /// Fixed step in seconds.
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Configured fork-join bucket hint.
    pub fn bucket_hint(&self) -> usize {
        self.bucket_hint
    }

    /// The fork-join dispatcher.
    pub fn workers(&self) -> &ForkJoin {
        &self.workers
    }

    /// The validated system pipeline.
    pub fn pipeline(&self) -> &Pipeline<F, I> {
        &self.pipeline
    }

    /// Metrics of the most recent tick of any kind.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }
}

fn run_timed<F: 'static, I: 'static>(
    pipeline: &Pipeline<F, I>,
    ctx: &mut StepContext<'_, F, I>,
) -> SmallVec<[(Phase, u64); 6]> {
    let mut phase_us = SmallVec::new();
    pipeline.run(ctx, |phase, elapsed| {
        phase_us.push((phase, elapsed.as_micros() as u64));
    });
    phase_us
}
