//! Generation-checked handles into sparse pools.
//!
//! A [`Handle`] encodes a slot index and the generation the slot had when
//! the handle was issued. Generation 0 is never issued, so the all-zero
//! handle is the "no entity" sentinel and a zeroed frame holds no live
//! references.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::{Read, Write};
use std::marker::PhantomData;

use kestrel_core::{fold_version, CodecError, Decode, Encode, Versioned};

/// Stable reference to a live slot of an [`ObjectPool`](crate::ObjectPool).
///
/// Typed by the pool's info record so a light handle cannot address the
/// particle pool. Only meaningful relative to the frame that owns the pool.
#[must_use]
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    /// The invalid handle. Adding through it allocates a fresh slot.
    pub const NONE: Self = Self {
        index: 0,
        generation: 0,
        _marker: PhantomData,
    };

    pub(crate) fn new(index: u32, generation: u32) -> Self {
        debug_assert!(generation != 0, "generation 0 is reserved for NONE");
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Whether this is the invalid handle.
    pub fn is_none(&self) -> bool {
        self.generation == 0
    }

    /// Whether this handle was issued by a pool (it may still be stale).
    pub fn is_some(&self) -> bool {
        self.generation != 0
    }

    /// Slot index.
    pub fn index(&self) -> usize {
        self.index as usize
    }

    /// Generation the slot had when the handle was issued.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> Default for Handle<T> {
    fn default() -> Self {
        Self::NONE
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "Handle(none)")
        } else {
            write!(f, "Handle({}v{})", self.index, self.generation)
        }
    }
}

impl<T> Versioned for Handle<T> {
    const VERSION: u64 = fold_version(&[u32::VERSION, u32::VERSION, 1]);
}

impl<T> Encode for Handle<T> {
    const ENCODED_LEN: usize = 8;

    fn encode(&self, w: &mut dyn Write) -> Result<(), CodecError> {
        self.index.encode(w)?;
        self.generation.encode(w)
    }
}

impl<T> Decode for Handle<T> {
    fn decode(r: &mut dyn Read) -> Result<Self, CodecError> {
        let index = u32::decode(r)?;
        let generation = u32::decode(r)?;
        if generation == 0 {
            return Ok(Self::NONE);
        }
        Ok(Self::new(index, generation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Light;

    #[test]
    fn none_is_default_and_invalid() {
        let h: Handle<Light> = Handle::default();
        assert!(h.is_none());
        assert_eq!(h, Handle::NONE);
    }

    #[test]
    fn handle_accessors() {
        let h: Handle<Light> = Handle::new(3, 7);
        assert!(h.is_some());
        assert_eq!(h.index(), 3);
        assert_eq!(h.generation(), 7);
        assert_eq!(format!("{h:?}"), "Handle(3v7)");
    }

    #[test]
    fn handles_with_different_generations_differ() {
        let a: Handle<Light> = Handle::new(1, 1);
        let b: Handle<Light> = Handle::new(1, 2);
        assert_ne!(a, b);
    }

    #[test]
    fn zero_generation_decodes_as_none() {
        let bytes = [5u8, 0, 0, 0, 0, 0, 0, 0];
        let h = Handle::<Light>::decode(&mut bytes.as_slice()).unwrap();
        assert!(h.is_none());
        assert_eq!(h.index(), 0);
    }
}
