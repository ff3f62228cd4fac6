//! Bounded fork-join dispatch over contiguous index buckets.
//!
//! [`ForkJoin`] splits `[0, n)` into near-equal contiguous ranges, hands all
//! but the last to a fixed rayon pool, runs the last on the calling thread
//! and joins before returning. Nothing outlives the call: no work is left
//! queued between phases.
//!
//! Two entry points keep bucket writes disjoint:
//!
//! - [`ForkJoin::for_each_mut`] gives each bucket an exclusive `&mut` chunk.
//! - [`ForkJoin::map_buckets`] gives each bucket a read-only range and
//!   returns one result per bucket, in bucket order, for the caller to merge
//!   sequentially. Pool insertions derived from parallel work go through
//!   this merge, never through the buckets themselves.
//!
//! Results are identical for any worker count, including zero, as long as
//! the per-index function does not depend on which bucket it ran in.

use std::ops::Range;

use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

/// Fork-join dispatcher with a fixed number of helper threads.
pub struct ForkJoin {
    pool: Option<ThreadPool>,
    workers: usize,
}

impl ForkJoin {
    /// A dispatcher with no helper threads. Every call runs inline.
    pub fn sequential() -> Self {
        Self {
            pool: None,
            workers: 0,
        }
    }

    /// A dispatcher backed by `workers` helper threads.
    ///
    /// Zero selects the sequential fallback without building a pool.
    pub fn new(workers: usize) -> Result<Self, ThreadPoolBuildError> {
        if workers == 0 {
            return Ok(Self::sequential());
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("kestrel-worker-{i}"))
            .build()?;
        Ok(Self {
            pool: Some(pool),
            workers,
        })
    }

    /// Number of helper threads (the caller's thread is not counted).
    pub fn worker_count(&self) -> usize {
        self.workers
    }

    /// Bucket count for `n` items: `min(round(n / hint), workers + 1)`,
    /// at least 1 when `n > 0`.
    pub fn bucket_count(&self, n: usize, hint: usize) -> usize {
        if n == 0 {
            return 0;
        }
        let hint = hint.max(1);
        let rounded = (n + hint / 2) / hint;
        rounded.min(self.workers + 1).max(1)
    }

    /// Run `f(index, &mut item)` over every item, bucketed.
    ///
    /// Each bucket owns a disjoint sub-slice, so `f` can only write the
    /// item it was handed.
    pub fn for_each_mut<T, F>(&self, items: &mut [T], hint: usize, f: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Sync,
    {
        let n = items.len();
        let buckets = self.bucket_count(n, hint);
        let pool = match &self.pool {
            Some(pool) if buckets > 1 => pool,
            _ => {
                items.iter_mut().enumerate().for_each(|(i, item)| f(i, item));
                return;
            }
        };

        let f = &f;
        pool.in_place_scope(|scope| {
            let mut rest = items;
            for (b, range) in bucket_ranges(n, buckets).enumerate() {
                let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(range.len());
                rest = tail;
                let mut run = move || {
                    for (offset, item) in chunk.iter_mut().enumerate() {
                        f(range.start + offset, item);
                    }
                };
                if b + 1 == buckets {
                    run();
                } else {
                    scope.spawn(move |_| run());
                }
            }
        });
    }

    /// Run `f(range)` once per bucket and collect the results in bucket order.
    pub fn map_buckets<R, F>(&self, n: usize, hint: usize, f: F) -> Vec<R>
    where
        R: Send,
        F: Fn(Range<usize>) -> R + Sync,
    {
        let buckets = self.bucket_count(n, hint);
        let pool = match &self.pool {
            Some(pool) if buckets > 1 => pool,
            _ => return bucket_ranges(n, buckets).map(f).collect(),
        };

        let mut slots: Vec<Option<R>> = (0..buckets).map(|_| None).collect();
        let f = &f;
        pool.in_place_scope(|scope| {
            for (b, (slot, range)) in slots.iter_mut().zip(bucket_ranges(n, buckets)).enumerate() {
                if b + 1 == buckets {
                    *slot = Some(f(range));
                } else {
                    scope.spawn(move |_| *slot = Some(f(range)));
                }
            }
        });
        // The scope joined every bucket, so every slot is filled.
        slots.into_iter().flatten().collect()
    }
}

impl Default for ForkJoin {
    fn default() -> Self {
        Self::sequential()
    }
}

impl std::fmt::Debug for ForkJoin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForkJoin")
            .field("workers", &self.workers)
            .finish()
    }
}

/// Partition `[0, n)` into `buckets` contiguous ranges whose lengths differ
/// by at most one. Bucket `i` is `[i*n/buckets, (i+1)*n/buckets)`.
pub fn bucket_ranges(n: usize, buckets: usize) -> impl Iterator<Item = Range<usize>> {
    (0..buckets).map(move |i| (i * n / buckets)..((i + 1) * n / buckets))
}
