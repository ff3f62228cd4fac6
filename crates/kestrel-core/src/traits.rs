//! Core abstraction traits for snapshots and input records.

use crate::codec::{bit_eq, Decode, Encode};
use crate::id::TickId;
use crate::version::Versioned;

/// The complete deterministic world state at one tick.
///
/// Implementors must be plain data: fixed-size inline arrays and scalars,
/// no heap allocation, no pointers. That keeps cloning a flat copy, makes
/// [`SimFrame::bit_eq`] meaningful, and lets the whole frame go through the
/// fixed-layout codec for save files.
pub trait SimFrame: Clone + Encode + Decode + Versioned + Send + Sync + 'static {
    /// The tick this frame represents.
    fn tick(&self) -> TickId;

    /// Stamp the frame with a tick. Called by the engine once per full tick.
    fn set_tick(&mut self, tick: TickId);

    /// Bit-exact equality over every field.
    fn bit_eq(&self, other: &Self) -> bool {
        bit_eq(self, other)
    }
}

/// External stimulus for one tick.
///
/// `PartialEq` drives write-on-change compression in the difference
/// stream; `Default` is the neutral "no input" value.
pub trait SimInput:
    Clone + Default + PartialEq + Encode + Decode + Versioned + Send + Sync + 'static
{
}
