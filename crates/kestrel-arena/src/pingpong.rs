//! Double-buffered frame storage.
//!
//! [`DoubleBuffer`] holds two complete frames that alternate between the
//! "current" (read-only, last completed tick) and "next" (being written)
//! roles. The per-tick lifecycle is:
//!
//! 1. [`DoubleBuffer::stage`]: copy current into next and borrow both
//! 2. systems read `current` and write `next`
//! 3. [`DoubleBuffer::swap`]: next becomes current
//!
//! Because next starts as a full copy of current, any field a system does
//! not touch carries over unchanged.

/// Borrowed view of both frames during a tick.
#[must_use]
pub struct Staging<'a, F> {
    /// The frame being produced.
    pub next: &'a mut F,
    /// The last completed frame.
    pub current: &'a F,
}

/// Two boxed frames with an index selecting the current one.
///
/// Frames are boxed once at construction so swapping is an index flip and
/// large frames never move.
pub struct DoubleBuffer<F> {
    frames: [Box<F>; 2],
    current: usize,
    /// Number of completed swaps since construction or the last reset.
    swaps: u64,
}

impl<F: Clone> DoubleBuffer<F> {
    /// Create a buffer whose current and next frames both start as `initial`.
    pub fn new(initial: F) -> Self {
        Self {
            frames: [Box::new(initial.clone()), Box::new(initial)],
            current: 0,
            swaps: 0,
        }
    }

    /// Begin a tick: copy current into next and borrow both.
    pub fn stage(&mut self) -> Staging<'_, F> {
        let (a, b) = self.frames.split_at_mut(1);
        let (current, next) = if self.current == 0 {
            (&*a[0], &mut *b[0])
        } else {
            (&*b[0], &mut *a[0])
        };
        next.clone_from(current);
        Staging { next, current }
    }

    /// Replace both frames with `frame`. Used when loading a save or
    /// attaching a replay.
    pub fn reset(&mut self, frame: F) {
        *self.frames[1 - self.current] = frame.clone();
        *self.frames[self.current] = frame;
        self.swaps = 0;
    }
}

impl<F> DoubleBuffer<F> {
    /// Publish the staged frame: next becomes current.
    pub fn swap(&mut self) {
        self.current = 1 - self.current;
        self.swaps += 1;
    }

    /// The last completed frame.
    pub fn current(&self) -> &F {
        &self.frames[self.current]
    }

    /// The previous frame (the one current was produced from).
    ///
    /// Only meaningful after at least one swap; before that both frames
    /// hold the initial state.
    pub fn previous(&self) -> &F {
        &self.frames[1 - self.current]
    }

    /// Number of swaps since construction or the last reset.
    pub fn swaps(&self) -> u64 {
        self.swaps
    }
}
