//! Fixed-capacity object pools and double-buffered frames.
//!
//! Everything here is plain data: pools are inline arrays sized by a const
//! generic, so a frame built from them stays a flat, cloneable, encodable
//! aggregate with no heap allocation.
//!
//! # Architecture
//!
//! ```text
//! DoubleBuffer<F> (current / next ping-pong)
//! └── F: SimFrame
//!     ├── ObjectPool<I, N, O>   sparse, addressed by generation-checked Handle<I>
//!     └── DensePool<T, N>       packed [0, len), swap-remove on destruction
//! ```
//!
//! # Pool disciplines
//!
//! - **Sparse:** slots are reused but never reshuffled. A [`Handle`] stays
//!   valid for the slot's lifetime; the generation catches use-after-free.
//! - **Dense:** the index *is* the handle and is not stable across a tick
//!   boundary, because destruction moves the last element into the hole.
//!
//! # Capacity exhaustion
//!
//! `try_*` methods return [`ArenaError`]. The infallible forms (`add`,
//! `push`) trap with `debug_assert!` in debug builds and drop the request
//! with a `warn!` in release builds; callers must tolerate dropped spawns.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod dense;
pub mod error;
pub mod handle;
pub mod pingpong;
pub mod pool;

pub use dense::DensePool;
pub use error::ArenaError;
pub use handle::Handle;
pub use pingpong::{DoubleBuffer, Staging};
pub use pool::ObjectPool;
