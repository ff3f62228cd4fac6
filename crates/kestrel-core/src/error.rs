//! Error types for the fixed-layout codec.

use std::error::Error;
use std::fmt;
use std::io;

/// Errors produced while encoding or decoding fixed-layout records.
#[derive(Debug)]
pub enum CodecError {
    /// The underlying reader or writer failed (includes short reads).
    Io(io::Error),
    /// The bytes were read but do not form a valid value.
    Malformed {
        /// Human-readable description of what went wrong.
        detail: String,
    },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Malformed { detail } => write!(f, "malformed record: {detail}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Malformed { .. } => None,
        }
    }
}

impl From<io::Error> for CodecError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
