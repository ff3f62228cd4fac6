//! Error types for difference-stream save and load.

use std::fmt;
use std::io;

use kestrel_core::CodecError;

/// Errors that can occur while saving or loading a difference stream.
#[derive(Debug)]
pub enum ReplayError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// The file was written by a build with a different frame or input layout.
    VersionMismatch {
        /// Version stored in the file.
        found: u64,
        /// Version computed from the current layouts.
        expected: u64,
    },
    /// The side file's size does not match the delta count in the header.
    CorruptDeltas {
        /// Bytes implied by the header's delta count.
        expected_bytes: u64,
        /// Bytes actually present.
        found_bytes: u64,
    },
    /// A record could not be decoded, or the deltas are out of order.
    Malformed {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// The primary file continues past the end of the header.
    TrailingBytes {
        /// Number of unexpected bytes.
        count: u64,
    },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::VersionMismatch { found, expected } => {
                write!(
                    f,
                    "version mismatch: file={found:#018x}, build={expected:#018x}"
                )
            }
            Self::CorruptDeltas {
                expected_bytes,
                found_bytes,
            } => {
                write!(
                    f,
                    "delta file holds {found_bytes} bytes, header implies {expected_bytes}"
                )
            }
            Self::Malformed { detail } => write!(f, "malformed stream: {detail}"),
            Self::TrailingBytes { count } => {
                write!(f, "{count} trailing bytes after header")
            }
        }
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ReplayError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<CodecError> for ReplayError {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::Io(e) => Self::Io(e),
            CodecError::Malformed { detail } => Self::Malformed { detail },
        }
    }
}
