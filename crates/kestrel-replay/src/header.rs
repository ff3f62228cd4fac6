//! On-disk layout of a difference stream.
//!
//! A saved stream is two sibling files:
//!
//! ```text
//! <path>          [version i64] [saved_start S] [initial D] [count i64] [saved_end S]
//! <path>.frames   count x ([tick i64] [D])
//! ```
//!
//! Every record has a fixed encoded length, so the side file's exact size is
//! known once the header is read.

use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use kestrel_core::{fold_version, version_of, Decode, Encode, SimFrame, SimInput, TickId};

use crate::error::ReplayError;

/// Suffix appended to the primary path to name the delta side file.
pub const FRAMES_SUFFIX: &str = ".frames";

/// Header of a saved difference stream.
#[derive(Clone, Debug)]
pub struct DifferenceStreamHeader<S, D> {
    /// State the recording started from.
    pub saved_start: S,
    /// Difference value in effect before the first delta.
    pub initial_difference: D,
    /// Number of `(tick, D)` records in the side file.
    pub difference_count: u64,
    /// State when the recording was saved. Replay ends at its tick.
    pub saved_end: S,
}

impl<S: SimFrame, D: SimInput> DifferenceStreamHeader<S, D> {
    /// Layout version of a stream over `S` and `D`.
    pub const VERSION: u64 = fold_version(&[version_of::<S>(), version_of::<D>()]);

    /// Encoded size of one side-file record.
    pub const DELTA_LEN: usize = 8 + D::ENCODED_LEN;

    /// Write the header record.
    pub fn encode(&self, w: &mut dyn Write) -> Result<(), ReplayError> {
        (Self::VERSION as i64).encode(w)?;
        self.saved_start.encode(w)?;
        self.initial_difference.encode(w)?;
        count_to_i64(self.difference_count)?.encode(w)?;
        self.saved_end.encode(w)?;
        Ok(())
    }

    /// Read and validate the header record.
    ///
    /// The version is checked before anything else is decoded.
    pub fn decode(r: &mut dyn Read) -> Result<Self, ReplayError> {
        let found = i64::decode(r)? as u64;
        if found != Self::VERSION {
            return Err(ReplayError::VersionMismatch {
                found,
                expected: Self::VERSION,
            });
        }
        let saved_start = S::decode(r)?;
        let initial_difference = D::decode(r)?;
        let count = i64::decode(r)?;
        let difference_count = u64::try_from(count).map_err(|_| ReplayError::Malformed {
            detail: format!("negative difference count {count}"),
        })?;
        let saved_end = S::decode(r)?;
        if saved_end.tick() < saved_start.tick() {
            return Err(ReplayError::Malformed {
                detail: format!(
                    "saved end tick {} precedes start tick {}",
                    saved_end.tick(),
                    saved_start.tick()
                ),
            });
        }
        Ok(Self {
            saved_start,
            initial_difference,
            difference_count,
            saved_end,
        })
    }

    /// Exact size in bytes the side file must have.
    pub fn expected_delta_bytes(&self) -> u64 {
        self.difference_count
            .saturating_mul(Self::DELTA_LEN as u64)
    }
}

/// Write one side-file record.
pub(crate) fn encode_delta<D: Encode>(
    w: &mut dyn Write,
    tick: TickId,
    value: &D,
) -> Result<(), ReplayError> {
    count_to_i64(tick.0)?.encode(w)?;
    value.encode(w)?;
    Ok(())
}

/// Read one side-file record.
pub(crate) fn decode_delta<D: Decode>(r: &mut dyn Read) -> Result<(TickId, D), ReplayError> {
    let raw = i64::decode(r)?;
    let tick = u64::try_from(raw).map_err(|_| ReplayError::Malformed {
        detail: format!("negative delta tick {raw}"),
    })?;
    Ok((TickId(tick), D::decode(r)?))
}

/// Path of the delta side file for a primary path: `path` + `.frames`.
pub fn frames_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(FRAMES_SUFFIX);
    PathBuf::from(name)
}

fn count_to_i64(v: u64) -> Result<i64, ReplayError> {
    i64::try_from(v).map_err(|_| ReplayError::Malformed {
        detail: format!("value {v} does not fit the i64 on-disk field"),
    })
}
