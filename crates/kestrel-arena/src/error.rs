//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during pool operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// Every slot is in use; the spawn cannot be placed.
    Exhausted {
        /// Fixed capacity of the pool.
        capacity: usize,
    },
    /// A handle whose slot has since been freed or reused.
    StaleHandle {
        /// Slot index encoded in the handle.
        index: usize,
        /// Generation encoded in the handle.
        generation: u32,
        /// Generation currently stored in the slot (0 if the slot is free).
        current: u32,
    },
    /// An index outside the pool's capacity or live range.
    OutOfRange {
        /// The offending index.
        index: usize,
        /// The bound it was checked against.
        len: usize,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted { capacity } => {
                write!(f, "pool exhausted: all {capacity} slots in use")
            }
            Self::StaleHandle {
                index,
                generation,
                current,
            } => {
                write!(
                    f,
                    "stale handle: slot {index} generation {generation}, current {current}"
                )
            }
            Self::OutOfRange { index, len } => {
                write!(f, "index {index} out of range (len {len})")
            }
        }
    }
}

impl Error for ArenaError {}
