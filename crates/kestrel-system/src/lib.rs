//! System trait, phase pipeline and fork-join dispatcher for Kestrel.
//!
//! A [`System`] implements up to six phase hooks over a
//! [`StepContext`] holding `(next, previous, input, dt)`. A [`Pipeline`] is
//! the fixed, ordered list of systems a simulation runs; it dispatches
//! phase-major in the order given by [`Phase::ALL`], truncated by the
//! [`TickKind`]. [`ForkJoin`] splits expensive per-object passes across a
//! bounded worker pool and joins before the phase returns.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod context;
pub mod fork_join;
pub mod phase;
pub mod pipeline;
pub mod system;

pub use context::{StepContext, DEFAULT_BUCKET_HINT};
pub use fork_join::{bucket_ranges, ForkJoin};
pub use phase::{Phase, TickKind};
pub use pipeline::{Pipeline, PipelineError};
pub use system::System;
