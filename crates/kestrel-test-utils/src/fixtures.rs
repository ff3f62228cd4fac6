//! Reusable system test fixtures.
//!
//! - [`AddStep`]: adds the input's step to the running total on full ticks.
//! - [`PhaseRecorder`]: logs every `(system, phase, kind, tick)` it is called with.

use std::sync::{Arc, Mutex};

use kestrel_core::TickId;
use kestrel_system::{Phase, StepContext, System, TickKind};

use crate::{CounterFrame, CounterInput};

/// Adds `input.step` to `total` in the Interpolate phase.
///
/// On discarded ticks the scratch frame is advanced too, so tests can
/// see that interpolation output never reaches the authoritative frame.
pub struct AddStep;

impl System<CounterFrame, CounterInput> for AddStep {
    fn name(&self) -> &str {
        "add_step"
    }

    fn interpolate(&self, ctx: &mut StepContext<'_, CounterFrame, CounterInput>) {
        ctx.next.total = ctx.previous.total.wrapping_add(ctx.input.step as u64);
        ctx.next.last_step = ctx.input.step;
    }
}

/// Shared log written by [`PhaseRecorder`]s.
pub type PhaseLog = Arc<Mutex<Vec<(String, Phase, TickKind, TickId)>>>;

/// Records every phase call into a shared log.
pub struct PhaseRecorder {
    pub name: String,
    log: PhaseLog,
}

impl PhaseRecorder {
    /// Create a recorder writing into `log`.
    pub fn new(name: impl Into<String>, log: PhaseLog) -> Self {
        Self {
            name: name.into(),
            log,
        }
    }

    /// A fresh, empty log.
    pub fn log() -> PhaseLog {
        Arc::new(Mutex::new(Vec::new()))
    }
}

impl<F: 'static, I: 'static> System<F, I> for PhaseRecorder {
    fn name(&self) -> &str {
        &self.name
    }

    fn run_phase(&self, phase: Phase, ctx: &mut StepContext<'_, F, I>) {
        self.log
            .lock()
            .unwrap()
            .push((self.name.clone(), phase, ctx.kind, ctx.tick));
    }
}
