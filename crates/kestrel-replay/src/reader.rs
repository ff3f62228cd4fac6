//! Difference-stream playback.
//!
//! [`DifferenceReader`] reconstructs the per-tick value sequence a
//! [`DifferenceWriter`](crate::DifferenceWriter) saw: for each tick it
//! returns the latest logged value whose tick is not after the asked tick,
//! and signals the end of the replay once the asked tick reaches the saved
//! end state's tick.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use kestrel_core::{SimFrame, SimInput, TickId};
use tracing::{debug, warn};

use crate::error::ReplayError;
use crate::header::{decode_delta, frames_path, DifferenceStreamHeader};

/// Plays back a saved difference stream.
pub struct DifferenceReader<S, D> {
    header: Option<DifferenceStreamHeader<S, D>>,
    deltas: Vec<(TickId, D)>,
    cursor: usize,
    current: Option<D>,
}

impl<S: SimFrame, D: SimInput> DifferenceReader<S, D> {
    /// A reader with nothing to replay.
    pub fn unloaded() -> Self {
        Self {
            header: None,
            deltas: Vec::new(),
            cursor: 0,
            current: None,
        }
    }

    /// Open `path` and its `.frames` sibling, keeping the typed error.
    pub fn open(path: &Path) -> Result<Self, ReplayError> {
        let header = BufReader::new(File::open(path)?);
        let frames = BufReader::new(File::open(frames_path(path))?);
        let reader = Self::from_readers(header, frames)?;
        debug!(
            path = %path.display(),
            deltas = reader.deltas.len(),
            "difference stream loaded"
        );
        Ok(reader)
    }

    /// Open `path`, treating every failure as "no saved data".
    ///
    /// A missing file, a version mismatch from an older build, or a corrupt
    /// side file all produce an unloaded reader; the cause is logged.
    pub fn load(path: &Path) -> Self {
        match Self::open(path) {
            Ok(reader) => reader,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "difference stream not loaded");
                Self::unloaded()
            }
        }
    }

    /// Decode a stream from a header source and a delta source.
    ///
    /// The delta source is read to the end and must hold exactly
    /// `difference_count` records; delta ticks must strictly increase.
    pub fn from_readers<H: Read, R: Read>(
        mut header_src: H,
        mut frames_src: R,
    ) -> Result<Self, ReplayError> {
        let header = DifferenceStreamHeader::<S, D>::decode(&mut header_src)?;

        let mut rest = Vec::new();
        header_src.read_to_end(&mut rest)?;
        if !rest.is_empty() {
            return Err(ReplayError::TrailingBytes {
                count: rest.len() as u64,
            });
        }

        let mut bytes = Vec::new();
        frames_src.read_to_end(&mut bytes)?;
        let expected_bytes = header.expected_delta_bytes();
        if bytes.len() as u64 != expected_bytes {
            return Err(ReplayError::CorruptDeltas {
                expected_bytes,
                found_bytes: bytes.len() as u64,
            });
        }

        let mut src = bytes.as_slice();
        let mut deltas: Vec<(TickId, D)> = Vec::with_capacity(header.difference_count as usize);
        for _ in 0..header.difference_count {
            let (tick, value) = decode_delta::<D>(&mut src)?;
            if let Some((prev, _)) = deltas.last() {
                if tick <= *prev {
                    return Err(ReplayError::Malformed {
                        detail: format!("delta tick {tick} does not follow {prev}"),
                    });
                }
            }
            deltas.push((tick, value));
        }

        Ok(Self {
            current: Some(header.initial_difference.clone()),
            header: Some(header),
            deltas,
            cursor: 0,
        })
    }

    /// Whether there is anything to replay.
    ///
    /// A stream whose value never changed holds no deltas and is treated
    /// the same as a failed load.
    pub fn loaded(&self) -> bool {
        self.header.is_some() && !self.deltas.is_empty()
    }

    /// Value to use for `tick`, or `None` once the replay is complete.
    ///
    /// Returns the latest logged value at or before `tick`, or the last
    /// returned value if nothing new applies. Ends when `tick` reaches the
    /// saved end state's tick.
    pub fn update(&mut self, tick: TickId) -> Option<D> {
        let header = self.header.as_ref()?;
        if tick >= header.saved_end.tick() {
            return None;
        }
        while let Some((at, value)) = self.deltas.get(self.cursor) {
            if *at > tick {
                break;
            }
            self.current = Some(value.clone());
            self.cursor += 1;
        }
        self.current.clone()
    }

    /// Restart playback from the initial value.
    pub fn rewind(&mut self) {
        self.cursor = 0;
        self.current = self
            .header
            .as_ref()
            .map(|h| h.initial_difference.clone());
    }

    /// State the recording started from.
    pub fn saved_start(&self) -> Option<&S> {
        self.header.as_ref().map(|h| &h.saved_start)
    }

    /// State the recording ended at.
    pub fn saved_end(&self) -> Option<&S> {
        self.header.as_ref().map(|h| &h.saved_end)
    }

    /// Number of logged changes.
    pub fn difference_count(&self) -> usize {
        self.deltas.len()
    }
}

impl<S: SimFrame, D: SimInput> Default for DifferenceReader<S, D> {
    fn default() -> Self {
        Self::unloaded()
    }
}
