//! Kestrel: a deterministic fixed-timestep simulation core.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Kestrel sub-crates. For most users, adding `kestrel` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use kestrel::prelude::*;
//! use kestrel::systems::{reference_pipeline, Frame, FrameInput};
//!
//! let config = EngineConfig {
//!     worker_count: Some(0),
//!     ..EngineConfig::default()
//! };
//! let mut engine = TickEngine::new(Frame::new(42), reference_pipeline(), &config).unwrap();
//! engine.execute_tick(&FrameInput::default());
//! assert_eq!(engine.current_tick(), TickId(1));
//!
//! // Render between ticks without touching the timeline.
//! let render = engine.interpolate(&FrameInput::default(), 0.5);
//! assert_eq!(render.tick, TickId(1));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `kestrel-core` | Tick IDs, frame/input traits, fixed-layout codec, layout versions |
//! | [`arena`] | `kestrel-arena` | Sparse and dense object pools, handles, double buffer |
//! | [`system`] | `kestrel-system` | System trait, phases, pipeline, fork-join workers |
//! | [`engine`] | `kestrel-engine` | Tick engine, scheduler, clocks, configuration |
//! | [`replay`] | `kestrel-replay` | Difference-stream recording, replay and saves |
//! | [`systems`] | `kestrel-systems` | Reference space shooter built on the core |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and the fixed-layout codec (`kestrel-core`).
///
/// Contains [`types::TickId`], the [`types::SimFrame`] and
/// [`types::SimInput`] traits, and [`types::Encode`]/[`types::Decode`].
pub use kestrel_core as types;

/// Object pools and frame double-buffering (`kestrel-arena`).
pub use kestrel_arena as arena;

/// Systems, phases, and the fork-join worker pool (`kestrel-system`).
///
/// The [`system::System`] trait is the main extension point for
/// user-defined simulation logic.
pub use kestrel_system as system;

/// Tick engine and fixed-timestep scheduler (`kestrel-engine`).
///
/// [`engine::TickEngine`] for stepping by hand,
/// [`engine::Scheduler`] for wall-clock driven loops with record/replay.
pub use kestrel_engine as engine;

/// Recording, replay, and single-state saves (`kestrel-replay`).
pub use kestrel_replay as replay;

/// Reference game world (`kestrel-systems`).
pub use kestrel_systems as systems;

/// Common imports for typical Kestrel usage.
///
/// ```rust
/// use kestrel::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use kestrel_core::{bit_eq, Decode, Encode, SimFrame, SimInput, TickId, Versioned};

    // Errors
    pub use kestrel_arena::ArenaError;
    pub use kestrel_core::CodecError;
    pub use kestrel_engine::ConfigError;
    pub use kestrel_replay::ReplayError;
    pub use kestrel_system::PipelineError;

    // Pools
    pub use kestrel_arena::{DensePool, Handle, ObjectPool};

    // Systems
    pub use kestrel_system::{ForkJoin, Phase, StepContext, System, TickKind};

    // Engine
    pub use kestrel_engine::{
        AdvanceReport, DesyncPolicy, EngineConfig, ReplayStatus, Scheduler, StepMetrics,
        TickEngine, TimeRatio,
    };

    // Replay
    pub use kestrel_replay::{DifferenceReader, DifferenceWriter};
}
