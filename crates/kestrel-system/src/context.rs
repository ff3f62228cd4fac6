//! Execution context passed to systems during a tick.

use kestrel_core::TickId;

use crate::fork_join::ForkJoin;
use crate::phase::TickKind;

/// Everything a system phase may touch.
///
/// Fields are public so a system can hold `&mut next` and `&previous` at the
/// same time. `previous` is the last authoritative frame and never changes
/// during a tick; `next` starts as a copy of it and accumulates the writes
/// of every earlier phase and every earlier system in the current phase.
pub struct StepContext<'a, F, I> {
    /// The frame being produced.
    pub next: &'a mut F,
    /// The frame `next` was staged from. Read-only for the whole tick.
    pub previous: &'a F,
    /// Input for this tick (recorded input during replay).
    pub input: &'a I,
    /// Seconds to advance. The fixed step on full ticks, a fraction of it
    /// on interpolation and estimate ticks.
    pub dt: f32,
    /// Which kind of tick is running.
    pub kind: TickKind,
    /// Tick being produced. On full ticks this is `previous.tick() + 1`;
    /// on discarded ticks it is the current tick.
    pub tick: TickId,
    /// Fork-join dispatcher for expensive per-object passes.
    pub workers: &'a ForkJoin,
    /// Target items per fork-join bucket.
    pub bucket_hint: usize,
}

/// Bucket hint used when the engine does not set one.
pub const DEFAULT_BUCKET_HINT: usize = 64;

impl<'a, F, I> StepContext<'a, F, I> {
    /// Construct a context. Typically called by the engine.
    pub fn new(
        next: &'a mut F,
        previous: &'a F,
        input: &'a I,
        dt: f32,
        kind: TickKind,
        tick: TickId,
        workers: &'a ForkJoin,
    ) -> Self {
        Self {
            next,
            previous,
            input,
            dt,
            kind,
            tick,
            workers,
            bucket_hint: DEFAULT_BUCKET_HINT,
        }
    }

    /// Override the fork-join bucket hint.
    pub fn with_bucket_hint(mut self, hint: usize) -> Self {
        self.bucket_hint = hint;
        self
    }

    /// Whether this tick's output becomes authoritative state.
    pub fn is_authoritative(&self) -> bool {
        self.kind.is_authoritative()
    }
}
