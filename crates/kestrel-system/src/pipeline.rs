//! Ordered system list and phase-major dispatch.
//!
//! [`Pipeline`] is validated once at engine startup. Per tick the engine
//! walks the tick kind's phases in order and, within each phase, every
//! system in declared order. A later system may read what an earlier one
//! wrote in the same phase, never the reverse.

use indexmap::IndexMap;
use tracing::trace;

use crate::context::StepContext;
use crate::phase::{Phase, TickKind};
use crate::system::System;

use std::error::Error;
use std::fmt;
use std::time::{Duration, Instant};

// ── Errors ─────────────────────────────────────────────────────────

/// Errors from pipeline validation (startup-time, not per-tick).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// No systems registered.
    EmptyPipeline,
    /// Two systems share a name, which makes logs and metrics ambiguous.
    DuplicateSystem {
        /// The repeated name.
        name: String,
        /// Position of the first system with this name.
        first: usize,
        /// Position of the repeat.
        second: usize,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPipeline => write!(f, "pipeline has no systems"),
            Self::DuplicateSystem {
                name,
                first,
                second,
            } => write!(
                f,
                "system name '{name}' used at positions {first} and {second}"
            ),
        }
    }
}

impl Error for PipelineError {}

// ── Pipeline ───────────────────────────────────────────────────────

/// A validated, fixed-order list of systems.
pub struct Pipeline<F, I> {
    systems: Vec<Box<dyn System<F, I>>>,
}

impl<F: 'static, I: 'static> Pipeline<F, I> {
    /// Validate and wrap a system list.
    ///
    /// Checks that the list is non-empty and that names are unique.
    pub fn new(systems: Vec<Box<dyn System<F, I>>>) -> Result<Self, PipelineError> {
        if systems.is_empty() {
            return Err(PipelineError::EmptyPipeline);
        }
        let mut seen: IndexMap<&str, usize> = IndexMap::with_capacity(systems.len());
        for (i, system) in systems.iter().enumerate() {
            if let Some(&first) = seen.get(system.name()) {
                return Err(PipelineError::DuplicateSystem {
                    name: system.name().to_string(),
                    first,
                    second: i,
                });
            }
            seen.insert(system.name(), i);
        }
        Ok(Self { systems })
    }

    /// Number of systems.
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Whether the pipeline is empty. Always false for a validated pipeline.
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// System names in execution order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.systems.iter().map(|s| s.name())
    }

    /// Run one phase across every system in declared order.
    pub fn run_phase(&self, phase: Phase, ctx: &mut StepContext<'_, F, I>) {
        for system in &self.systems {
            trace!(system = system.name(), %phase, "run phase");
            system.run_phase(phase, ctx);
        }
    }

    /// Run every phase of `ctx.kind` in order, reporting each phase's
    /// wall time to `on_phase` as it finishes.
    pub fn run(
        &self,
        ctx: &mut StepContext<'_, F, I>,
        mut on_phase: impl FnMut(Phase, Duration),
    ) {
        let kind: TickKind = ctx.kind;
        for &phase in kind.phases() {
            let start = Instant::now();
            self.run_phase(phase, ctx);
            on_phase(phase, start.elapsed());
        }
    }
}

impl<F: 'static, I: 'static> fmt::Debug for Pipeline<F, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fork_join::ForkJoin;
    use kestrel_core::TickId;

    type Log = Vec<(String, Phase)>;

    struct Recorder(&'static str);

    impl System<Log, ()> for Recorder {
        fn name(&self) -> &str {
            self.0
        }
        fn run_phase(&self, phase: Phase, ctx: &mut StepContext<'_, Log, ()>) {
            ctx.next.push((self.0.to_string(), phase));
        }
    }

    fn run(pipeline: &Pipeline<Log, ()>, kind: TickKind) -> Log {
        let previous = Log::new();
        let mut next = Log::new();
        let workers = ForkJoin::sequential();
        let mut ctx = StepContext::new(&mut next, &previous, &(), 0.004, kind, TickId(1), &workers);
        let mut timed = Vec::new();
        pipeline.run(&mut ctx, |phase, _| timed.push(phase));
        assert_eq!(timed, kind.phases(), "one timing per phase, in order");
        next
    }

    fn two() -> Pipeline<Log, ()> {
        Pipeline::new(vec![Box::new(Recorder("a")), Box::new(Recorder("b"))]).unwrap()
    }

    #[test]
    fn empty_pipeline_rejected() {
        let result = Pipeline::<Log, ()>::new(vec![]);
        assert!(matches!(result, Err(PipelineError::EmptyPipeline)));
    }

    #[test]
    fn duplicate_names_rejected() {
        let result =
            Pipeline::<Log, ()>::new(vec![Box::new(Recorder("a")), Box::new(Recorder("a"))]);
        assert_eq!(
            result.err(),
            Some(PipelineError::DuplicateSystem {
                name: "a".into(),
                first: 0,
                second: 1
            })
        );
    }

    #[test]
    fn full_tick_is_phase_major() {
        let log = run(&two(), TickKind::Full);
        assert_eq!(log.len(), 12);
        for (i, phase) in Phase::ALL.iter().enumerate() {
            assert_eq!(log[2 * i], ("a".to_string(), *phase));
            assert_eq!(log[2 * i + 1], ("b".to_string(), *phase));
        }
    }

    #[test]
    fn main_and_global_ticks_run_prefixes() {
        let main = run(&two(), TickKind::Main);
        let phases: Vec<Phase> = main.iter().map(|(_, p)| *p).collect();
        assert_eq!(
            phases,
            vec![Phase::Global, Phase::Global, Phase::Interpolate, Phase::Interpolate]
        );

        let global = run(&two(), TickKind::Global);
        assert_eq!(global.len(), 2);
        assert!(global.iter().all(|(_, p)| *p == Phase::Global));
    }

    #[test]
    fn names_in_declared_order() {
        assert_eq!(two().names().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
