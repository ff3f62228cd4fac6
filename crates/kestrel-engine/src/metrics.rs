//! Per-tick timing metrics.
//!
//! [`StepMetrics`] captures the timing of the most recent tick of any kind.
//! The scheduler logs it at `trace!` and exposes the last value for
//! profiling overlays.

use kestrel_core::TickId;
use kestrel_system::{Phase, TickKind};
use smallvec::SmallVec;

/// Timing collected during a single tick.
///
/// All durations are in microseconds.
#[derive(Clone, Debug)]
pub struct StepMetrics {
    /// Tick that was produced (or, for discarded ticks, the current tick).
    pub tick: TickId,
    /// Which kind of tick ran.
    pub kind: TickKind,
    /// Wall-clock time for the whole tick, including staging and the swap.
    pub total_us: u64,
    /// Per-phase execution times in execution order.
    pub phase_us: SmallVec<[(Phase, u64); 6]>,
}

impl StepMetrics {
    /// Time spent in one phase, if it ran.
    pub fn phase(&self, phase: Phase) -> Option<u64> {
        self.phase_us
            .iter()
            .find(|(p, _)| *p == phase)
            .map(|(_, us)| *us)
    }
}

impl Default for StepMetrics {
    fn default() -> Self {
        Self {
            tick: TickId::default(),
            kind: TickKind::Full,
            total_us: 0,
            phase_us: SmallVec::new(),
        }
    }
}
