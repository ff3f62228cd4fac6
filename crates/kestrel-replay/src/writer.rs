//! Difference-stream recording.
//!
//! [`DifferenceWriter`] keeps the starting state, the value in effect before
//! the first tick, and an in-memory log of `(tick, value)` pairs appended
//! only when the value changes. Nothing touches disk until
//! [`DifferenceWriter::save`].

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use kestrel_core::{SimFrame, SimInput, TickId};
use tracing::debug;

use crate::error::ReplayError;
use crate::header::{encode_delta, frames_path, DifferenceStreamHeader};

/// Records a write-on-change log of `D` values over a run that started at `S`.
///
/// # Examples
///
/// ```
/// use kestrel_core::TickId;
/// use kestrel_replay::{DifferenceReader, DifferenceWriter};
/// use kestrel_test_utils::{CounterFrame, CounterInput};
///
/// let mut writer = DifferenceWriter::new(CounterFrame::at(0), CounterInput::default());
/// for (tick, step) in [1u32, 1, 2, 2, 2].into_iter().enumerate() {
///     writer.update(TickId(tick as u64), &CounterInput::new(step));
/// }
/// assert_eq!(writer.difference_count(), 2);
///
/// let (mut header, mut frames) = (Vec::new(), Vec::new());
/// writer.write_to(&mut header, &mut frames, &CounterFrame::at(5)).unwrap();
///
/// let mut reader: DifferenceReader<CounterFrame, CounterInput> =
///     DifferenceReader::from_readers(header.as_slice(), frames.as_slice()).unwrap();
/// assert_eq!(reader.update(TickId(0)), Some(CounterInput::new(1)));
/// assert_eq!(reader.update(TickId(2)), Some(CounterInput::new(2)));
/// assert_eq!(reader.update(TickId(5)), None);
/// ```
pub struct DifferenceWriter<S, D> {
    saved_start: S,
    initial: D,
    last: D,
    deltas: Vec<(TickId, D)>,
}

impl<S: SimFrame, D: SimInput> DifferenceWriter<S, D> {
    /// Start recording from `saved_start` with `initial` as the value in
    /// effect before the first tick.
    pub fn new(saved_start: S, initial: D) -> Self {
        debug!(start = %saved_start.tick(), "difference writer started");
        Self {
            saved_start,
            last: initial.clone(),
            initial,
            deltas: Vec::new(),
        }
    }

    /// Offer the value for `tick`. It is logged only if it differs from the
    /// previous value; returns whether it was.
    pub fn update(&mut self, tick: TickId, value: &D) -> bool {
        if *value == self.last {
            return false;
        }
        debug_assert!(
            self.deltas.last().is_none_or(|(t, _)| *t < tick),
            "difference ticks must increase"
        );
        self.last = value.clone();
        self.deltas.push((tick, value.clone()));
        true
    }

    /// Number of logged changes.
    pub fn difference_count(&self) -> usize {
        self.deltas.len()
    }

    /// The logged `(tick, value)` changes in order.
    pub fn deltas(&self) -> &[(TickId, D)] {
        &self.deltas
    }

    /// State the recording started from.
    pub fn saved_start(&self) -> &S {
        &self.saved_start
    }

    /// Value in effect before the first logged change.
    pub fn initial(&self) -> &D {
        &self.initial
    }

    /// Header describing this recording with `saved_end` as its end state.
    pub fn header(&self, saved_end: &S) -> DifferenceStreamHeader<S, D> {
        DifferenceStreamHeader {
            saved_start: self.saved_start.clone(),
            initial_difference: self.initial.clone(),
            difference_count: self.deltas.len() as u64,
            saved_end: saved_end.clone(),
        }
    }

    /// Write the header and the delta block to two sinks.
    pub fn write_to<H: Write, W: Write>(
        &self,
        mut header_sink: H,
        mut frames_sink: W,
        saved_end: &S,
    ) -> Result<(), ReplayError> {
        self.header(saved_end).encode(&mut header_sink)?;
        for (tick, value) in &self.deltas {
            encode_delta(&mut frames_sink, *tick, value)?;
        }
        header_sink.flush()?;
        frames_sink.flush()?;
        Ok(())
    }

    /// Save to `path` and its `.frames` sibling, overwriting both.
    pub fn save(&self, path: &Path, saved_end: &S) -> Result<(), ReplayError> {
        let header = BufWriter::new(File::create(path)?);
        let frames = BufWriter::new(File::create(frames_path(path))?);
        self.write_to(header, frames, saved_end)?;
        debug!(
            path = %path.display(),
            start = %self.saved_start.tick(),
            end = %saved_end.tick(),
            deltas = self.deltas.len(),
            "difference stream saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_test_utils::{CounterFrame, CounterInput};

    fn writer() -> DifferenceWriter<CounterFrame, CounterInput> {
        DifferenceWriter::new(CounterFrame::at(0), CounterInput::default())
    }

    #[test]
    fn unchanged_values_are_not_logged() {
        let mut w = writer();
        assert!(!w.update(TickId(0), &CounterInput::default()));
        assert!(w.update(TickId(1), &CounterInput::new(3)));
        assert!(!w.update(TickId(2), &CounterInput::new(3)));
        assert!(w.update(TickId(3), &CounterInput::new(0)));
        assert_eq!(
            w.deltas(),
            &[
                (TickId(1), CounterInput::new(3)),
                (TickId(3), CounterInput::new(0)),
            ]
        );
    }

    #[test]
    fn write_to_sizes_match_header() {
        let mut w = writer();
        w.update(TickId(1), &CounterInput::new(1));
        w.update(TickId(4), &CounterInput::new(2));
        let (mut header, mut frames) = (Vec::new(), Vec::new());
        w.write_to(&mut header, &mut frames, &CounterFrame::at(9)).unwrap();
        let h = w.header(&CounterFrame::at(9));
        assert_eq!(frames.len() as u64, h.expected_delta_bytes());
        assert_eq!(h.difference_count, 2);
    }
}
