//! Fixed-timestep scheduler.
//!
//! [`Scheduler`] turns variable wall-clock frame deltas into a whole number
//! of fixed ticks plus one render interpolation:
//!
//! ```text
//! Idle ──advance──▶ Accumulating ──▶ Ticking ──▶ RenderPending ──advance──▶ Accumulating ...
//! ```
//!
//! 1. **Accumulating**: scale the wall delta by the time ratio and add it
//!    to the accumulator (integer nanoseconds). Clamp the backlog to
//!    `max_ticks_per_advance` ticks.
//! 2. **Ticking**: while a whole tick is banked, pick the tick's input
//!    (replay substitutes recorded input, the recorder logs it) and run
//!    one full tick. If ticking took longer than the display refresh
//!    interval, halve the time multiplier.
//! 3. **RenderPending**: run one interpolation tick over the leftover
//!    fraction. Its output is for rendering only.
//!
//! Record and replay hooks live here because the scheduler is the only
//! place that knows which input each tick actually consumed.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use kestrel_core::{SimFrame, SimInput, TickId};
use kestrel_replay::{
    frame_hash, load_snapshot, save_snapshot, DifferenceReader, DifferenceWriter, ReplayError,
};
use kestrel_system::System;
use tracing::{debug, error, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigError, DesyncPolicy, EngineConfig, TimeRatio};
use crate::tick::TickEngine;

// ── State and reports ──────────────────────────────────────────────

/// Where the scheduler is in its per-frame cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    /// Constructed or reset; no advance has run yet.
    Idle,
    /// Banking scaled wall time.
    Accumulating,
    /// Running full ticks.
    Ticking,
    /// Ticks done; the interpolated frame is ready for the renderer.
    RenderPending,
}

/// A finished replay that did not reproduce its saved end state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DesyncReport {
    /// Tick of the live frame when the replay ended.
    pub tick: TickId,
    /// Tick of the saved end state.
    pub expected_tick: TickId,
    /// FNV-1a hash of the saved end state.
    pub expected_hash: u64,
    /// FNV-1a hash of the live frame.
    pub actual_hash: u64,
}

impl fmt::Display for DesyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "replay desync at tick {} (expected tick {}): \
             expected={:#018x}, actual={:#018x}",
            self.tick, self.expected_tick, self.expected_hash, self.actual_hash
        )
    }
}

/// Replay progress during one advance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplayStatus {
    /// No replay attached.
    Inactive,
    /// Recorded input drove every tick of this advance.
    Playing,
    /// The replay reached its saved end during this advance and was
    /// detached. Carries the mismatch, if any.
    Finished {
        /// Set when the live frame differs from the saved end state.
        desync: Option<DesyncReport>,
    },
}

/// Outcome of one [`Scheduler::advance`].
#[derive(Clone, Debug)]
pub struct AdvanceReport {
    /// Full ticks run.
    pub ticks_run: u32,
    /// Banked ticks discarded by the `max_ticks_per_advance` clamp.
    pub ticks_dropped: u64,
    /// Ticking overran the refresh interval.
    pub throttled: bool,
    /// Leftover accumulator fraction used for interpolation, in `[0, 1)`.
    pub alpha: f32,
    /// Time ratio in effect after this advance.
    pub time_ratio: TimeRatio,
    /// Replay progress.
    pub replay: ReplayStatus,
}

// ── Scheduler ──────────────────────────────────────────────────────

/// Accumulator-driven fixed-step loop around a [`TickEngine`].
pub struct Scheduler<F, I, C = SystemClock> {
    engine: TickEngine<F, I>,
    clock: C,
    state: SchedulerState,
    /// Banked simulation time in nanoseconds.
    accumulator: u128,
    tick_nanos: u128,
    ratio: TimeRatio,
    max_multiplier: u32,
    refresh_interval: Duration,
    max_ticks: u32,
    desync_policy: DesyncPolicy,
    writer: Option<DifferenceWriter<F, I>>,
    reader: Option<DifferenceReader<F, I>>,
    /// Input consumed by the most recent full tick.
    last_input: I,
    last_desync: Option<DesyncReport>,
}

impl<F: SimFrame, I: SimInput> Scheduler<F, I, SystemClock> {
    /// Build a scheduler on the system clock.
    pub fn new(
        initial: F,
        systems: Vec<Box<dyn System<F, I>>>,
        config: &EngineConfig,
    ) -> Result<Self, ConfigError> {
        Self::with_clock(initial, systems, config, SystemClock::new())
    }
}

impl<F: SimFrame, I: SimInput, C: Clock> Scheduler<F, I, C> {
    /// Build a scheduler measuring its ticking time with `clock`.
    pub fn with_clock(
        initial: F,
        systems: Vec<Box<dyn System<F, I>>>,
        config: &EngineConfig,
        clock: C,
    ) -> Result<Self, ConfigError> {
        let engine = TickEngine::new(initial, systems, config)?;
        Ok(Self {
            engine,
            clock,
            state: SchedulerState::Idle,
            accumulator: 0,
            tick_nanos: config.tick_duration().as_nanos(),
            ratio: config.time_ratio,
            max_multiplier: config.max_time_multiplier,
            refresh_interval: config.refresh_interval,
            max_ticks: config.max_ticks_per_advance,
            desync_policy: config.desync_policy,
            writer: None,
            reader: None,
            last_input: I::default(),
            last_desync: None,
        })
    }

    /// Advance by one real frame of `wall_delta` with this frame's live input.
    ///
    /// Runs as many full ticks as the scaled accumulator holds (at most
    /// `max_ticks_per_advance`), then one interpolation tick. The
    /// interpolated frame is available from [`Scheduler::render_frame`].
    pub fn advance(&mut self, wall_delta: Duration, live_input: &I) -> AdvanceReport {
        self.transition(SchedulerState::Accumulating);
        self.accumulator += self.ratio.scale_nanos(wall_delta);

        let budget = self.tick_nanos * self.max_ticks as u128;
        let mut ticks_dropped = 0;
        if self.accumulator >= budget + self.tick_nanos {
            let excess = self.accumulator - budget;
            ticks_dropped = (excess / self.tick_nanos) as u64;
            self.accumulator = budget + excess % self.tick_nanos;
            warn!(
                ticks_dropped,
                max_ticks = self.max_ticks,
                "tick backlog exceeds max_ticks_per_advance, dropping"
            );
        }

        self.transition(SchedulerState::Ticking);
        let started = self.clock.now();
        let mut ticks_run = 0u32;
        let mut replay = if self.reader.is_some() {
            ReplayStatus::Playing
        } else {
            ReplayStatus::Inactive
        };
        while self.accumulator >= self.tick_nanos {
            self.accumulator -= self.tick_nanos;
            let input = self.tick_input(live_input, &mut replay);
            self.engine.execute_tick(&input);
            self.last_input = input;
            ticks_run += 1;
        }
        let elapsed = self.clock.now().saturating_sub(started);

        let throttled = ticks_run > 0 && elapsed > self.refresh_interval;
        if throttled {
            self.throttle(elapsed);
        }

        self.transition(SchedulerState::RenderPending);
        let alpha = (self.accumulator as f64 / self.tick_nanos as f64) as f32;
        let render_input = if self.reader.is_some() {
            &self.last_input
        } else {
            live_input
        };
        self.engine.interpolate(render_input, alpha);

        AdvanceReport {
            ticks_run,
            ticks_dropped,
            throttled,
            alpha,
            time_ratio: self.ratio,
            replay,
        }
    }

    /// Estimate-only tick before this frame's input is final. The result
    /// is available from [`Scheduler::estimate_frame`].
    pub fn estimate(&mut self, input: &I, wall_delta: Duration) -> &F {
        let dt = self.ratio.scale_secs(wall_delta);
        self.engine.estimate(input, dt)
    }

    fn tick_input(&mut self, live_input: &I, status: &mut ReplayStatus) -> I {
        let tick = self.engine.current_tick();
        let mut input = live_input.clone();
        if let Some(reader) = self.reader.as_mut() {
            match reader.update(tick) {
                Some(recorded) => input = recorded,
                None => {
                    let desync = self.finish_replay();
                    *status = ReplayStatus::Finished { desync };
                }
            }
        }
        if let Some(writer) = self.writer.as_mut() {
            writer.update(tick, &input);
        }
        input
    }

    fn finish_replay(&mut self) -> Option<DesyncReport> {
        let reader = self.reader.take()?;
        let expected = reader.saved_end()?;
        let actual = self.engine.current();
        if actual.tick() == expected.tick() && actual.bit_eq(expected) {
            debug!(tick = %actual.tick(), "replay finished in sync");
            return None;
        }

        let report = DesyncReport {
            tick: actual.tick(),
            expected_tick: expected.tick(),
            expected_hash: frame_hash(expected),
            actual_hash: frame_hash(actual),
        };
        error!(
            tick = %report.tick,
            expected_tick = %report.expected_tick,
            expected_hash = report.expected_hash,
            actual_hash = report.actual_hash,
            "replay desync"
        );
        if self.desync_policy == DesyncPolicy::Trap {
            panic!("{report}");
        }
        self.last_desync = Some(report.clone());
        Some(report)
    }

    fn throttle(&mut self, elapsed: Duration) {
        let before = self.ratio;
        self.ratio.multiplier = (self.ratio.multiplier / 2).max(1);
        warn!(
            elapsed_us = elapsed.as_micros() as u64,
            refresh_us = self.refresh_interval.as_micros() as u64,
            from = %before,
            to = %self.ratio,
            "ticking overran refresh interval, throttling"
        );
    }

    fn transition(&mut self, next: SchedulerState) {
        if self.state != next {
            tracing::trace!(from = ?self.state, to = ?next, "scheduler state");
            self.state = next;
        }
    }

    // ── Time ratio ─────────────────────────────────────────────────

    /// Current wall-clock to simulation time scale.
    pub fn time_ratio(&self) -> TimeRatio {
        self.ratio
    }

    /// Set the time scale. The multiplier must not exceed the configured cap.
    pub fn set_time_ratio(&mut self, ratio: TimeRatio) -> Result<(), ConfigError> {
        if ratio.multiplier == 0 || ratio.divisor == 0 || ratio.multiplier > self.max_multiplier {
            return Err(ConfigError::InvalidTimeRatio {
                reason: format!("{ratio} outside 1..={} multiplier", self.max_multiplier),
            });
        }
        debug!(from = %self.ratio, to = %ratio, "time ratio set");
        self.ratio = ratio;
        Ok(())
    }

    /// Double the multiplier, up to the configured cap.
    pub fn speed_up(&mut self) -> TimeRatio {
        self.ratio.multiplier = (self.ratio.multiplier.saturating_mul(2)).min(self.max_multiplier);
        self.ratio
    }

    /// Halve the multiplier, never below 1.
    pub fn slow_down(&mut self) -> TimeRatio {
        self.ratio.multiplier = (self.ratio.multiplier / 2).max(1);
        self.ratio
    }

    // ── Record / replay ────────────────────────────────────────────

    /// Start logging consumed input from the current frame. Replaces any
    /// recording in progress.
    pub fn start_recording(&mut self) {
        let start = self.engine.current().clone();
        if self.writer.is_some() {
            warn!("recording restarted, previous log discarded");
        }
        self.writer = Some(DifferenceWriter::new(start, I::default()));
    }

    /// Stop recording and hand back the log.
    pub fn stop_recording(&mut self) -> Option<DifferenceWriter<F, I>> {
        let writer = self.writer.take();
        if let Some(w) = &writer {
            debug!(deltas = w.difference_count(), "recording stopped");
        }
        writer
    }

    fn discard_recording(&mut self, reason: &str) {
        if let Some(w) = self.writer.take() {
            debug!(deltas = w.difference_count(), reason, "recording discarded");
        }
    }

    /// Stop recording and save the log to `path`, using the current frame
    /// as the end state. Returns `Ok(false)` if nothing was recording.
    pub fn save_recording(&mut self, path: &Path) -> Result<bool, ReplayError> {
        match self.writer.take() {
            Some(writer) => {
                writer.save(path, self.engine.current())?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Attach a replay. The simulation is reset to the replay's start
    /// state and recorded input replaces live input until its end tick.
    /// A recording in progress is discarded.
    ///
    /// Returns false, leaving the simulation untouched, if the reader has
    /// nothing to replay.
    pub fn attach_replay(&mut self, mut reader: DifferenceReader<F, I>) -> bool {
        let start = match reader.saved_start() {
            Some(start) if reader.loaded() => start.clone(),
            _ => {
                debug!("replay not attached: nothing loaded");
                return false;
            }
        };
        reader.rewind();
        debug!(
            start = %start.tick(),
            deltas = reader.difference_count(),
            "replay attached"
        );
        self.discard_recording("replay attached");
        self.engine.reset(start);
        self.accumulator = 0;
        self.last_input = I::default();
        self.reader = Some(reader);
        true
    }

    /// Load and attach the replay saved at `path`.
    pub fn load_replay(&mut self, path: &Path) -> bool {
        self.attach_replay(DifferenceReader::load(path))
    }

    /// Detach any replay without the end-state check.
    pub fn detach_replay(&mut self) -> Option<DifferenceReader<F, I>> {
        self.reader.take()
    }

    /// Whether input is being recorded.
    pub fn is_recording(&self) -> bool {
        self.writer.is_some()
    }

    /// Whether a replay is driving input.
    pub fn is_replaying(&self) -> bool {
        self.reader.is_some()
    }

    /// Most recent desync reported under [`DesyncPolicy::Report`].
    pub fn last_desync(&self) -> Option<&DesyncReport> {
        self.last_desync.as_ref()
    }

    // ── Saves ──────────────────────────────────────────────────────

    /// Save the current frame to `path`.
    pub fn save_state(&self, path: &Path) -> Result<(), ReplayError> {
        save_snapshot::<F, I>(path, self.engine.current())
    }

    /// Load a frame saved by [`Scheduler::save_state`]. Returns false,
    /// leaving the simulation untouched, if the save is missing, stale or
    /// corrupt.
    pub fn load_state(&mut self, path: &Path) -> bool {
        match load_snapshot::<F, I>(path) {
            Some(frame) => {
                self.reset(frame);
                true
            }
            None => false,
        }
    }

    /// Replace the simulation state and clear the accumulator. A recording
    /// in progress is discarded, since its ticks no longer follow on.
    pub fn reset(&mut self, frame: F) {
        self.discard_recording("timeline reset");
        self.engine.reset(frame);
        self.accumulator = 0;
        self.state = SchedulerState::Idle;
    }

    // ── Accessors ──────────────────────────────────────────────────

    /// Current cycle state.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// The last authoritative frame.
    pub fn current(&self) -> &F {
        self.engine.current()
    }

    /// The frame to render: the last interpolation tick's output.
    pub fn render_frame(&self) -> &F {
        self.engine.render_frame()
    }

    /// The last estimate tick's output.
    pub fn estimate_frame(&self) -> &F {
        self.engine.estimate_frame()
    }

    /// Banked time that has not yet become a tick.
    pub fn pending(&self) -> Duration {
        Duration::from_nanos(self.accumulator as u64)
    }

    /// The wrapped tick engine.
    pub fn engine(&self) -> &TickEngine<F, I> {
        &self.engine
    }

    /// The wrapped tick engine, mutably. Running ticks directly bypasses
    /// record and replay.
    pub fn engine_mut(&mut self) -> &mut TickEngine<F, I> {
        &mut self.engine
    }
}
