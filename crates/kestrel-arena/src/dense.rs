//! Dense swap-remove pool.
//!
//! Live elements always occupy `[0, len)`. Destroying element `i` copies the
//! last element into `i` and shrinks the count, so iteration is a plain
//! slice walk but indices are not stable across removals. Any cross-entity
//! reference must use a sparse [`Handle`](crate::Handle) instead.

use std::fmt;
use std::io::{Read, Write};

use kestrel_core::{fold_version, version_of, CodecError, Decode, Encode, Versioned};
use tracing::warn;

use crate::error::ArenaError;

/// Packed array of up to `N` elements of `T`.
#[derive(Clone)]
pub struct DensePool<T, const N: usize> {
    items: [T; N],
    count: u32,
}

impl<T: Copy + Default, const N: usize> DensePool<T, N> {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self {
            items: [T::default(); N],
            count: 0,
        }
    }

    /// Append `item`, returning its index.
    ///
    /// Exhaustion traps in debug builds and drops the item (returning
    /// `None`) in release.
    pub fn push(&mut self, item: T) -> Option<usize> {
        match self.try_push(item) {
            Ok(index) => Some(index),
            Err(e) => {
                debug_assert!(false, "dense pool push failed: {e}");
                warn!(capacity = N, "dense pool exhausted, dropping spawn");
                None
            }
        }
    }

    /// Fallible form of [`DensePool::push`].
    pub fn try_push(&mut self, item: T) -> Result<usize, ArenaError> {
        let index = self.len();
        if index >= N {
            return Err(ArenaError::Exhausted { capacity: N });
        }
        self.items[index] = item;
        self.count += 1;
        Ok(index)
    }

    /// Destroy element `index` by moving the last element into its place.
    ///
    /// Returns the removed element. The element previously at `len() - 1`
    /// now lives at `index`.
    pub fn swap_remove(&mut self, index: usize) -> Result<T, ArenaError> {
        let len = self.len();
        if index >= len {
            return Err(ArenaError::OutOfRange { index, len });
        }
        let removed = self.items[index];
        self.copy(index, len - 1)?;
        self.count -= 1;
        self.items[len - 1] = T::default();
        Ok(removed)
    }

    /// Copy element `src` over element `dest`. Both must be live.
    pub fn copy(&mut self, dest: usize, src: usize) -> Result<(), ArenaError> {
        let len = self.len();
        for index in [dest, src] {
            if index >= len {
                return Err(ArenaError::OutOfRange { index, len });
            }
        }
        self.items[dest] = self.items[src];
        Ok(())
    }

    /// Swap-remove every element that fails the predicate.
    ///
    /// Survivors keep their relative order only up to the swaps performed;
    /// the scan revisits each moved-in element before advancing.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        let mut i = 0;
        while i < self.len() {
            if keep(&self.items[i]) {
                i += 1;
            } else {
                let last = self.len() - 1;
                self.items[i] = self.items[last];
                self.items[last] = T::default();
                self.count -= 1;
            }
        }
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.items = [T::default(); N];
        self.count = 0;
    }
}

impl<T, const N: usize> DensePool<T, N> {
    /// Fixed number of slots.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.count as usize
    }

    /// Whether no element is live.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Whether another push would succeed.
    pub fn has_room(&self) -> bool {
        self.len() < N
    }

    /// Element at `index`, if live.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// Mutable element at `index`, if live.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    /// The live elements.
    pub fn as_slice(&self) -> &[T] {
        &self.items[..self.count as usize]
    }

    /// The live elements, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.count as usize;
        &mut self.items[..len]
    }

    /// Iterate the live elements in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }
}

impl<T: Copy + Default, const N: usize> Default for DensePool<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a DensePool<T, N> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for DensePool<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DensePool")
            .field("capacity", &N)
            .field("items", &self.as_slice())
            .finish()
    }
}

impl<T: Versioned, const N: usize> Versioned for DensePool<T, N> {
    const VERSION: u64 = fold_version(&[version_of::<T>(), N as u64, 3]);
}

impl<T: Encode, const N: usize> Encode for DensePool<T, N> {
    const ENCODED_LEN: usize = 4 + N * T::ENCODED_LEN;

    fn encode(&self, w: &mut dyn Write) -> Result<(), CodecError> {
        self.count.encode(w)?;
        self.items.encode(w)
    }
}

impl<T: Decode + Copy + Default, const N: usize> Decode for DensePool<T, N> {
    fn decode(r: &mut dyn Read) -> Result<Self, CodecError> {
        let count = u32::decode(r)?;
        if count as usize > N {
            return Err(CodecError::Malformed {
                detail: format!("dense count {count} exceeds capacity {N}"),
            });
        }
        let items = <[T; N]>::decode(r)?;
        Ok(Self { items, count })
    }
}
