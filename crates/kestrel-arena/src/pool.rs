//! Sparse fixed-capacity slot pool.
//!
//! [`ObjectPool`] gives stable, generation-checked [`Handle`]s to entities
//! that are spawned and despawned at arbitrary times (lights, particles,
//! sounds). Slots are found by a first-free scan, freed slots are reused by
//! later scans, and nothing is ever compacted. Live iteration is bounded by
//! a high-water mark that only grows (until [`ObjectPool::clear`]), so a
//! caller always walks `0..high_water()` and tests [`ObjectPool::is_used`].

use std::fmt;
use std::io::{Read, Write};

use kestrel_core::{fold_version, version_of, CodecError, Decode, Encode, Versioned};
use tracing::warn;

use crate::error::ArenaError;
use crate::handle::Handle;

/// Fixed-capacity slot table of `N` entries.
///
/// Each slot holds a used flag, a generation counter, an `I` info record
/// (gameplay data, read/write) and an `O` object record (bookkeeping such
/// as spawn tick). Owned exclusively by the frame it lives in.
#[derive(Clone)]
pub struct ObjectPool<I, const N: usize, O = ()> {
    used: [bool; N],
    generations: [u32; N],
    /// One past the highest index ever allocated.
    high_water: u32,
    live: u32,
    infos: [I; N],
    objects: [O; N],
}

impl<I: Copy + Default, const N: usize, O: Copy + Default> ObjectPool<I, N, O> {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self {
            used: [false; N],
            generations: [0; N],
            high_water: 0,
            live: 0,
            infos: [I::default(); N],
            objects: [O::default(); N],
        }
    }

    /// Add or refresh an entity.
    ///
    /// If `handle` is [`Handle::NONE`] the first free slot is allocated and
    /// its handle written back. If `handle` is live, the slot's info is
    /// overwritten in place; calling this every tick is how an owner keeps
    /// a sparse entity alive.
    ///
    /// Exhaustion traps in debug builds and drops the spawn in release. A
    /// stale handle traps in debug builds; in release it is treated as
    /// `NONE` and a fresh slot is allocated.
    pub fn add(&mut self, handle: &mut Handle<I>, info: I) {
        match self.try_add(handle, info) {
            Ok(()) => {}
            Err(ArenaError::StaleHandle { .. }) => {
                debug_assert!(false, "add through stale handle {handle:?}");
                warn!(?handle, "add through stale handle, allocating fresh slot");
                *handle = Handle::NONE;
                self.add(handle, info);
            }
            Err(e) => {
                debug_assert!(false, "object pool add failed: {e}");
                warn!(capacity = N, "object pool exhausted, dropping spawn");
            }
        }
    }

    /// Fallible form of [`ObjectPool::add`]. Leaves the pool and handle
    /// untouched on error.
    pub fn try_add(&mut self, handle: &mut Handle<I>, info: I) -> Result<(), ArenaError> {
        if handle.is_some() {
            let index = self.check(*handle)?;
            self.infos[index] = info;
            return Ok(());
        }

        let index = self
            .used
            .iter()
            .position(|&used| !used)
            .ok_or(ArenaError::Exhausted { capacity: N })?;

        let generation = self.bump_generation(index);
        self.used[index] = true;
        self.live += 1;
        self.high_water = self.high_water.max(index as u32 + 1);
        self.infos[index] = info;
        self.objects[index] = O::default();
        *handle = Handle::new(index as u32, generation);
        Ok(())
    }

    /// Free the slot and reset `handle` to [`Handle::NONE`].
    ///
    /// No-op on `NONE`. A stale handle traps in debug builds and is only
    /// cleared in release; the slot it used to name is left alone.
    pub fn remove(&mut self, handle: &mut Handle<I>) {
        if handle.is_none() {
            return;
        }
        match self.check(*handle) {
            Ok(index) => self.free(index),
            Err(e) => {
                debug_assert!(false, "remove through stale handle: {e}");
                warn!(?handle, "remove through stale handle ignored");
            }
        }
        *handle = Handle::NONE;
    }

    /// Copy one live slot's payload (info and object) onto `dest`.
    ///
    /// `dest` becomes live if it was free. Handles to `dest` issued before
    /// a free/realloc cycle stay stale; a live `dest` keeps its generation.
    pub fn copy(&mut self, dest: usize, src: usize) -> Result<(), ArenaError> {
        if dest >= N {
            return Err(ArenaError::OutOfRange { index: dest, len: N });
        }
        if src >= N || !self.used[src] {
            return Err(ArenaError::OutOfRange {
                index: src,
                len: self.high_water(),
            });
        }
        if dest == src {
            return Ok(());
        }
        if !self.used[dest] {
            self.bump_generation(dest);
            self.used[dest] = true;
            self.live += 1;
            self.high_water = self.high_water.max(dest as u32 + 1);
        }
        self.infos[dest] = self.infos[src];
        self.objects[dest] = self.objects[src];
        Ok(())
    }

    /// Free every slot that fails the predicate.
    pub fn retain(&mut self, mut keep: impl FnMut(&I, &O) -> bool) {
        for index in 0..self.high_water() {
            if self.used[index] && !keep(&self.infos[index], &self.objects[index]) {
                self.free(index);
            }
        }
    }

    /// Free every slot and reset the high-water mark.
    ///
    /// Generations are kept, so handles issued before the clear stay stale.
    pub fn clear(&mut self) {
        self.used = [false; N];
        self.high_water = 0;
        self.live = 0;
    }

    fn free(&mut self, index: usize) {
        self.used[index] = false;
        self.live -= 1;
    }

    fn bump_generation(&mut self, index: usize) -> u32 {
        let next = match self.generations[index].wrapping_add(1) {
            0 => 1,
            g => g,
        };
        self.generations[index] = next;
        next
    }
}

impl<I, const N: usize, O> ObjectPool<I, N, O> {
    /// Fixed number of slots.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of live slots.
    pub fn len(&self) -> usize {
        self.live as usize
    }

    /// Whether no slot is live.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Exclusive upper bound of every index that has ever been live.
    ///
    /// Every live slot is below this bound.
    pub fn high_water(&self) -> usize {
        self.high_water as usize
    }

    /// Highest index ever allocated, if any.
    pub fn max_index(&self) -> Option<usize> {
        self.high_water().checked_sub(1)
    }

    /// Whether slot `index` is live.
    pub fn is_used(&self, index: usize) -> bool {
        index < N && self.used[index]
    }

    /// Resolve a handle to its slot index, rejecting stale and NONE handles.
    pub fn check(&self, handle: Handle<I>) -> Result<usize, ArenaError> {
        let index = handle.index();
        if index >= N {
            return Err(ArenaError::OutOfRange { index, len: N });
        }
        let current = if self.used[index] {
            self.generations[index]
        } else {
            0
        };
        if handle.is_none() || current != handle.generation() {
            return Err(ArenaError::StaleHandle {
                index,
                generation: handle.generation(),
                current,
            });
        }
        Ok(index)
    }

    /// Whether `handle` names a live slot.
    pub fn contains(&self, handle: Handle<I>) -> bool {
        self.check(handle).is_ok()
    }

    /// Info record behind a live handle.
    pub fn get(&self, handle: Handle<I>) -> Option<&I> {
        self.check(handle).ok().map(|i| &self.infos[i])
    }

    /// Mutable info record behind a live handle.
    pub fn get_mut(&mut self, handle: Handle<I>) -> Option<&mut I> {
        let index = self.check(handle).ok()?;
        Some(&mut self.infos[index])
    }

    /// Bookkeeping record behind a live handle.
    pub fn object(&self, handle: Handle<I>) -> Option<&O> {
        self.check(handle).ok().map(|i| &self.objects[i])
    }

    /// Mutable bookkeeping record behind a live handle.
    pub fn object_mut(&mut self, handle: Handle<I>) -> Option<&mut O> {
        let index = self.check(handle).ok()?;
        Some(&mut self.objects[index])
    }

    /// Info record at a live slot index.
    pub fn info(&self, index: usize) -> Option<&I> {
        self.is_used(index).then(|| &self.infos[index])
    }

    /// Mutable info record at a live slot index.
    pub fn info_mut(&mut self, index: usize) -> Option<&mut I> {
        if self.is_used(index) {
            Some(&mut self.infos[index])
        } else {
            None
        }
    }

    /// Handle for a live slot index.
    pub fn handle_at(&self, index: usize) -> Option<Handle<I>> {
        self.is_used(index)
            .then(|| Handle::new(index as u32, self.generations[index]))
    }

    /// Walk the live set in index order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<I>, &I)> + '_ {
        (0..self.high_water()).filter_map(move |i| {
            self.handle_at(i).map(|h| (h, &self.infos[i]))
        })
    }
}

impl<I: Copy + Default, const N: usize, O: Copy + Default> Default for ObjectPool<I, N, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, const N: usize, O> fmt::Debug for ObjectPool<I, N, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectPool")
            .field("capacity", &N)
            .field("live", &self.live)
            .field("high_water", &self.high_water)
            .finish_non_exhaustive()
    }
}

impl<I: Versioned, const N: usize, O: Versioned> Versioned for ObjectPool<I, N, O> {
    const VERSION: u64 = fold_version(&[version_of::<I>(), version_of::<O>(), N as u64, 2]);
}

impl<I: Encode, const N: usize, O: Encode> Encode for ObjectPool<I, N, O> {
    const ENCODED_LEN: usize = 8 + N * (1 + 4 + I::ENCODED_LEN + O::ENCODED_LEN);

    fn encode(&self, w: &mut dyn Write) -> Result<(), CodecError> {
        self.high_water.encode(w)?;
        self.live.encode(w)?;
        for i in 0..N {
            self.used[i].encode(w)?;
            self.generations[i].encode(w)?;
            self.infos[i].encode(w)?;
            self.objects[i].encode(w)?;
        }
        Ok(())
    }
}

impl<I, const N: usize, O> Decode for ObjectPool<I, N, O>
where
    I: Decode + Copy + Default,
    O: Decode + Copy + Default,
{
    fn decode(r: &mut dyn Read) -> Result<Self, CodecError> {
        let mut pool = Self::new();
        pool.high_water = u32::decode(r)?;
        pool.live = u32::decode(r)?;
        if pool.high_water as usize > N || pool.live > pool.high_water {
            return Err(CodecError::Malformed {
                detail: format!(
                    "pool bounds high_water={} live={} exceed capacity {N}",
                    pool.high_water, pool.live
                ),
            });
        }
        let mut counted = 0u32;
        for i in 0..N {
            pool.used[i] = bool::decode(r)?;
            pool.generations[i] = u32::decode(r)?;
            pool.infos[i] = I::decode(r)?;
            pool.objects[i] = O::decode(r)?;
            if pool.used[i] {
                counted += 1;
                if pool.generations[i] == 0 {
                    return Err(CodecError::Malformed {
                        detail: format!("live slot {i} has generation 0"),
                    });
                }
                if i >= pool.high_water as usize {
                    return Err(CodecError::Malformed {
                        detail: format!("live slot {i} beyond high-water mark"),
                    });
                }
            }
        }
        if counted != pool.live {
            return Err(CodecError::Malformed {
                detail: format!("live count {} disagrees with {counted} used slots", pool.live),
            });
        }
        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Pool = ObjectPool<u32, 4>;

    fn live_by_scan<const N: usize>(pool: &ObjectPool<u32, N>) -> Vec<usize> {
        (0..pool.high_water()).filter(|&i| pool.is_used(i)).collect()
    }

    #[test]
    fn add_allocates_first_free_slot() {
        let mut pool = Pool::new();
        let mut a = Handle::NONE;
        let mut b = Handle::NONE;
        pool.add(&mut a, 10);
        pool.add(&mut b, 20);
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get(a), Some(&10));
        assert_eq!(pool.get(b), Some(&20));
    }

    #[test]
    fn add_with_live_handle_overwrites_in_place() {
        let mut pool = Pool::new();
        let mut h = Handle::NONE;
        pool.add(&mut h, 1);
        let first = h;
        pool.add(&mut h, 2);
        assert_eq!(h, first, "keep-alive must not reissue the handle");
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(h), Some(&2));
    }

    #[test]
    fn remove_resets_handle_and_is_idempotent() {
        let mut pool = Pool::new();
        let mut h = Handle::NONE;
        pool.add(&mut h, 5);
        pool.remove(&mut h);
        assert!(h.is_none());
        assert!(pool.is_empty());
        pool.remove(&mut h);
        assert!(pool.is_empty());
    }

    #[test]
    fn freed_slot_is_reused_with_new_generation() {
        let mut pool = Pool::new();
        let mut a = Handle::NONE;
        pool.add(&mut a, 1);
        let old = a;
        pool.remove(&mut a);
        let mut b = Handle::NONE;
        pool.add(&mut b, 2);
        assert_eq!(b.index(), old.index());
        assert_ne!(b, old);
        assert!(!pool.contains(old));
        assert_eq!(pool.get(old), None);
    }

    #[test]
    fn try_add_reports_exhaustion() {
        let mut pool = Pool::new();
        for _ in 0..4 {
            let mut h = Handle::NONE;
            pool.try_add(&mut h, 0).unwrap();
        }
        let mut h = Handle::NONE;
        assert_eq!(
            pool.try_add(&mut h, 0),
            Err(ArenaError::Exhausted { capacity: 4 })
        );
        assert!(h.is_none());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "object pool add failed")]
    fn add_traps_on_exhaustion_in_debug() {
        let mut pool = ObjectPool::<u32, 1>::new();
        let mut a = Handle::NONE;
        let mut b = Handle::NONE;
        pool.add(&mut a, 0);
        pool.add(&mut b, 0);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn add_drops_spawn_on_exhaustion_in_release() {
        let mut pool = ObjectPool::<u32, 1>::new();
        let mut a = Handle::NONE;
        let mut b = Handle::NONE;
        pool.add(&mut a, 0);
        pool.add(&mut b, 0);
        assert!(b.is_none());
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn try_add_rejects_stale_handle() {
        let mut pool = Pool::new();
        let mut h = Handle::NONE;
        pool.add(&mut h, 1);
        let stale = h;
        pool.remove(&mut h);
        let mut stale_copy = stale;
        assert!(matches!(
            pool.try_add(&mut stale_copy, 3),
            Err(ArenaError::StaleHandle { .. })
        ));
        assert!(pool.is_empty());
    }

    #[test]
    fn high_water_bounds_live_set() {
        let mut pool = Pool::new();
        let mut hs = [Handle::NONE; 3];
        for (i, h) in hs.iter_mut().enumerate() {
            pool.add(h, i as u32);
        }
        pool.remove(&mut hs[2]);
        assert_eq!(pool.high_water(), 3, "high-water mark never shrinks on remove");
        assert_eq!(pool.max_index(), Some(2));
        assert_eq!(live_by_scan(&pool), vec![0, 1]);
    }

    #[test]
    fn copy_moves_payload_and_marks_dest_live() {
        let mut pool = Pool::new();
        let mut a = Handle::NONE;
        pool.add(&mut a, 42);
        pool.copy(3, 0).unwrap();
        assert!(pool.is_used(3));
        assert_eq!(pool.info(3), Some(&42));
        assert_eq!(pool.high_water(), 4);
        assert_eq!(pool.len(), 2);
        assert!(pool.copy(1, 2).is_err(), "copy from a free slot is rejected");
    }

    #[test]
    fn retain_frees_failing_slots() {
        let mut pool = Pool::new();
        for v in 0..4 {
            let mut h = Handle::NONE;
            pool.add(&mut h, v);
        }
        pool.retain(|&v, _| v % 2 == 0);
        let live: Vec<u32> = pool.iter().map(|(_, &v)| v).collect();
        assert_eq!(live, vec![0, 2]);
    }

    #[test]
    fn clear_keeps_old_handles_stale() {
        let mut pool = Pool::new();
        let mut h = Handle::NONE;
        pool.add(&mut h, 1);
        pool.clear();
        assert_eq!(pool.high_water(), 0);
        let mut fresh = Handle::NONE;
        pool.add(&mut fresh, 2);
        assert_eq!(fresh.index(), h.index());
        assert!(!pool.contains(h));
    }

    #[test]
    fn encode_decode_preserves_generations() {
        let mut pool = Pool::new();
        let mut a = Handle::NONE;
        let mut b = Handle::NONE;
        pool.add(&mut a, 7);
        pool.add(&mut b, 8);
        pool.remove(&mut a);
        let bytes = pool.to_bytes();
        assert_eq!(bytes.len(), Pool::ENCODED_LEN);
        let decoded = Pool::decode(&mut bytes.as_slice()).unwrap();
        assert!(decoded.contains(b));
        assert_eq!(decoded.get(b), Some(&8));
        assert_eq!(decoded.high_water(), 2);
        assert_eq!(decoded.to_bytes(), bytes);
    }

    #[test]
    fn decode_rejects_inconsistent_live_count() {
        let mut pool = Pool::new();
        let mut a = Handle::NONE;
        pool.add(&mut a, 7);
        let mut bytes = pool.to_bytes();
        // live count lives in bytes 4..8.
        bytes[4] = 3;
        assert!(matches!(
            Pool::decode(&mut bytes.as_slice()),
            Err(CodecError::Malformed { .. })
        ));
    }

    #[test]
    fn decode_rejects_live_slot_without_generation() {
        let mut pool = Pool::new();
        let mut a = Handle::NONE;
        pool.add(&mut a, 7);
        let mut bytes = pool.to_bytes();
        // Slot 0: used flag at byte 8, generation in bytes 9..13.
        bytes[9..13].fill(0);
        assert!(matches!(
            Pool::decode(&mut bytes.as_slice()),
            Err(CodecError::Malformed { .. })
        ));
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::HashSet;

        #[derive(Clone, Debug)]
        enum Op {
            Add,
            Remove(usize),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![Just(Op::Add), (0usize..16).prop_map(Op::Remove)]
        }

        proptest! {
            #[test]
            fn live_handles_are_unique_and_scan_matches(
                ops in proptest::collection::vec(op(), 1..64),
            ) {
                let mut pool = ObjectPool::<u32, 16>::new();
                let mut live: Vec<Handle<u32>> = Vec::new();
                for (n, op) in ops.into_iter().enumerate() {
                    match op {
                        Op::Add if pool.len() < pool.capacity() => {
                            let mut h = Handle::NONE;
                            pool.try_add(&mut h, n as u32).unwrap();
                            prop_assert!(!live.contains(&h));
                            live.push(h);
                        }
                        Op::Add => {}
                        Op::Remove(k) if !live.is_empty() => {
                            let mut h = live.swap_remove(k % live.len());
                            pool.remove(&mut h);
                            prop_assert!(h.is_none());
                        }
                        Op::Remove(_) => {}
                    }

                    let unique: HashSet<_> = live.iter().copied().collect();
                    prop_assert_eq!(unique.len(), live.len());
                    for h in &live {
                        prop_assert!(pool.contains(*h));
                        prop_assert!(h.index() < pool.high_water());
                    }
                    let mut expected: Vec<usize> = live.iter().map(|h| h.index()).collect();
                    expected.sort_unstable();
                    prop_assert_eq!(live_by_scan(&pool), expected);
                    prop_assert_eq!(pool.len(), live.len());
                }
            }
        }
    }
}
