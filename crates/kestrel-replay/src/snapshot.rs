//! Single-state saves (autosave / quicksave).
//!
//! A snapshot is a difference stream with no deltas whose start and end
//! are the same frame. It shares the header layout and version check, so a
//! save from an older build is rejected exactly like a stale replay.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use kestrel_core::{SimFrame, SimInput};
use tracing::{debug, warn};

use crate::error::ReplayError;
use crate::header::DifferenceStreamHeader;
use crate::writer::DifferenceWriter;

/// Save `frame` to `path` (and an empty `.frames` sibling).
pub fn save_snapshot<S: SimFrame, D: SimInput>(path: &Path, frame: &S) -> Result<(), ReplayError> {
    DifferenceWriter::<S, D>::new(frame.clone(), D::default()).save(path, frame)
}

/// Read the frame saved at `path`, keeping the typed error.
pub fn read_snapshot<S: SimFrame, D: SimInput>(path: &Path) -> Result<S, ReplayError> {
    let mut src = BufReader::new(File::open(path)?);
    let header = DifferenceStreamHeader::<S, D>::decode(&mut src)?;
    let mut rest = Vec::new();
    src.read_to_end(&mut rest)?;
    if !rest.is_empty() {
        return Err(ReplayError::TrailingBytes {
            count: rest.len() as u64,
        });
    }
    debug!(path = %path.display(), tick = %header.saved_end.tick(), "snapshot read");
    Ok(header.saved_end)
}

/// Read the frame saved at `path`, or `None` if it is missing, stale or
/// corrupt. The caller falls back to a fresh state.
pub fn load_snapshot<S: SimFrame, D: SimInput>(path: &Path) -> Option<S> {
    match read_snapshot::<S, D>(path) {
        Ok(frame) => Some(frame),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "snapshot not loaded");
            None
        }
    }
}
