//! Fixed-timestep engine for Kestrel simulations.
//!
//! [`TickEngine`] runs single ticks of any [`TickKind`](kestrel_system::TickKind)
//! against a double-buffered frame. [`Scheduler`] wraps it in an
//! accumulator loop that converts wall-clock frame deltas into whole
//! ticks, drives render interpolation, throttles the time ratio when
//! ticking overruns the display refresh, and hosts record/replay.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod clock;
pub mod config;
pub mod metrics;
pub mod scheduler;
pub mod tick;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, DesyncPolicy, EngineConfig, TimeRatio};
pub use metrics::StepMetrics;
pub use scheduler::{AdvanceReport, DesyncReport, ReplayStatus, Scheduler, SchedulerState};
pub use tick::TickEngine;
