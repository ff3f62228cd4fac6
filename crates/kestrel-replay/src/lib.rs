//! Difference-stream recording and replay for Kestrel simulations.
//!
//! A session is reproduced from its starting state plus the input values
//! that drove it. Because input tends to stay constant for long stretches,
//! only the ticks where it changed are logged (write-on-change).
//!
//! # Architecture
//!
//! - [`DifferenceWriter`] logs `(tick, value)` pairs in memory and saves them
//! - [`DifferenceReader`] loads a saved pair of files and yields per-tick values
//! - [`DifferenceStreamHeader`] is the versioned primary-file record
//! - [`save_snapshot`] / [`load_snapshot`] store a single frame in the same format
//! - [`frame_hash`] labels frames in desync reports
//!
//! # Format
//!
//! ```text
//! <path>          [VERSION i64] [saved_start] [initial_difference] [count i64] [saved_end]
//! <path>.frames   [tick i64][difference] x count
//! ```
//!
//! `VERSION` is folded at compile time from the frame and input layouts; a
//! file from a build with different layouts is rejected before any state is
//! decoded.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod hash;
pub mod header;
pub mod reader;
pub mod snapshot;
pub mod writer;

pub use error::ReplayError;
pub use hash::{bytes_hash, frame_hash};
pub use header::{frames_path, DifferenceStreamHeader, FRAMES_SUFFIX};
pub use reader::DifferenceReader;
pub use snapshot::{load_snapshot, read_snapshot, save_snapshot};
pub use writer::DifferenceWriter;
