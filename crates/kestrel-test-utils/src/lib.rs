//! Test utilities and mock types for Kestrel development.
//!
//! Provides a tiny frame/input pair ([`CounterFrame`], [`CounterInput`])
//! that implements the core traits with a handful of scalar fields, plus
//! the system fixtures in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::io::{Read, Write};

use kestrel_core::{
    fold_version, version_of, CodecError, Decode, Encode, SimFrame, SimInput, TickId, Versioned,
};

pub use fixtures::{AddStep, PhaseLog, PhaseRecorder};

/// Minimal frame: a tick, a running total and the last step applied.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CounterFrame {
    pub tick: TickId,
    pub total: u64,
    pub last_step: u32,
}

impl CounterFrame {
    /// A zeroed frame stamped with `tick`.
    pub fn at(tick: u64) -> Self {
        Self {
            tick: TickId(tick),
            ..Self::default()
        }
    }
}

impl Versioned for CounterFrame {
    const VERSION: u64 = fold_version(&[
        version_of::<TickId>(),
        version_of::<u64>(),
        version_of::<u32>(),
        1,
    ]);
}

impl Encode for CounterFrame {
    const ENCODED_LEN: usize = TickId::ENCODED_LEN + u64::ENCODED_LEN + u32::ENCODED_LEN;

    fn encode(&self, w: &mut dyn Write) -> Result<(), CodecError> {
        self.tick.encode(w)?;
        self.total.encode(w)?;
        self.last_step.encode(w)
    }
}

impl Decode for CounterFrame {
    fn decode(r: &mut dyn Read) -> Result<Self, CodecError> {
        Ok(Self {
            tick: TickId::decode(r)?,
            total: u64::decode(r)?,
            last_step: u32::decode(r)?,
        })
    }
}

impl SimFrame for CounterFrame {
    fn tick(&self) -> TickId {
        self.tick
    }

    fn set_tick(&mut self, tick: TickId) {
        self.tick = tick;
    }
}

/// Minimal input: the amount [`AddStep`] adds per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CounterInput {
    pub step: u32,
}

impl CounterInput {
    pub fn new(step: u32) -> Self {
        Self { step }
    }
}

impl Versioned for CounterInput {
    const VERSION: u64 = fold_version(&[version_of::<u32>(), 1]);
}

impl Encode for CounterInput {
    const ENCODED_LEN: usize = u32::ENCODED_LEN;

    fn encode(&self, w: &mut dyn Write) -> Result<(), CodecError> {
        self.step.encode(w)
    }
}

impl Decode for CounterInput {
    fn decode(r: &mut dyn Read) -> Result<Self, CodecError> {
        Ok(Self {
            step: u32::decode(r)?,
        })
    }
}

impl SimInput for CounterInput {}
