//! Core types and traits for the Kestrel deterministic simulation core.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the tick identifier, the compile-time versioning scheme used to reject
//! stale save files, the fixed-layout binary codec every snapshot and
//! input record goes through, and the [`SimFrame`]/[`SimInput`] traits the
//! rest of the workspace is generic over.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod id;
pub mod traits;
pub mod version;

pub use codec::{bit_eq, Decode, Encode};
pub use error::CodecError;
pub use id::TickId;
pub use traits::{SimFrame, SimInput};
pub use version::{fold_version, version_of, Versioned};
