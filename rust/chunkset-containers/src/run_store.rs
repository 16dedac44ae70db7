//! Paired-array storage of run descriptors.

use crate::run::Run;

/// Growable storage for `(start, length)` run descriptors.
///
/// A single buffer of `2 * capacity` slots holds the run starts in its first half and
/// the run lengths in its second half. Slot `i` of each half describes run `i`; only
/// the first `len()` slots of each half are live.
///
/// Growth is explicit and follows [`RunStore::next_capacity`]; the buffer never
/// reallocates behind the caller's back.
pub struct RunStore {
    buf: Box<[u16]>,
    nbrruns: usize,
}

impl RunStore {
    /// Capacity (in runs) allocated when an empty store first needs room.
    pub const DEFAULT_CAPACITY: usize = 4;

    /// Creates an empty store without allocating.
    pub fn new() -> RunStore {
        RunStore::with_capacity(0)
    }

    /// Creates an empty store with room for `capacity` runs.
    pub fn with_capacity(capacity: usize) -> RunStore {
        RunStore {
            buf: vec![0u16; 2 * capacity].into_boxed_slice(),
            nbrruns: 0,
        }
    }

    /// Creates a store holding exactly `runs`, with no spare capacity.
    pub fn from_runs(runs: &[Run]) -> RunStore {
        let capacity = runs.len();
        let mut buf = vec![0u16; 2 * capacity].into_boxed_slice();
        for (i, run) in runs.iter().enumerate() {
            buf[i] = run.start;
            buf[capacity + i] = run.length;
        }
        RunStore {
            buf,
            nbrruns: capacity,
        }
    }

    /// Wraps a buffer laid out as `starts ++ lengths`, with every slot live.
    ///
    /// # Panics
    ///
    /// Panics if the buffer has an odd number of slots.
    pub fn from_buffer(buf: Box<[u16]>) -> RunStore {
        assert!(buf.len() % 2 == 0, "Odd run buffer length {}", buf.len());
        let nbrruns = buf.len() / 2;
        RunStore { buf, nbrruns }
    }

    /// Capacity in runs.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len() / 2
    }

    /// Number of live runs.
    #[inline]
    pub fn len(&self) -> usize {
        self.nbrruns
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nbrruns == 0
    }

    /// Live run starts, ascending.
    #[inline]
    pub fn starts(&self) -> &[u16] {
        &self.buf[..self.nbrruns]
    }

    /// Live run lengths, in run order.
    #[inline]
    pub fn lengths(&self) -> &[u16] {
        let capacity = self.capacity();
        &self.buf[capacity..capacity + self.nbrruns]
    }

    #[inline]
    pub fn start(&self, index: usize) -> u16 {
        debug_assert!(index < self.nbrruns);
        self.buf[index]
    }

    #[inline]
    pub fn length(&self, index: usize) -> u16 {
        debug_assert!(index < self.nbrruns);
        self.buf[self.capacity() + index]
    }

    #[inline]
    pub fn get(&self, index: usize) -> Run {
        Run {
            start: self.start(index),
            length: self.length(index),
        }
    }

    #[inline]
    pub fn set_start(&mut self, index: usize, start: u16) {
        debug_assert!(index < self.nbrruns);
        self.buf[index] = start;
    }

    #[inline]
    pub fn set_length(&mut self, index: usize, length: u16) {
        debug_assert!(index < self.nbrruns);
        let capacity = self.capacity();
        self.buf[capacity + index] = length;
    }

    #[inline]
    pub fn set(&mut self, index: usize, run: Run) {
        self.set_start(index, run.start);
        self.set_length(index, run.length);
    }

    #[inline]
    pub fn increment_length(&mut self, index: usize) {
        let length = self.length(index);
        self.set_length(index, length + 1);
    }

    #[inline]
    pub fn decrement_length(&mut self, index: usize) {
        let length = self.length(index);
        self.set_length(index, length - 1);
    }

    /// Returns the live runs in order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Run> + ExactSizeIterator + '_ {
        self.starts()
            .iter()
            .zip(self.lengths())
            .map(|(&start, &length)| Run { start, length })
    }

    /// Opens an empty slot at `index`, shifting runs `index..len()` one slot to the
    /// right in both halves. Grows the buffer first if it is full.
    ///
    /// The contents of the new slot are unspecified until the caller sets them.
    pub fn make_room_at(&mut self, index: usize) {
        assert!(
            index <= self.nbrruns,
            "Index {index} out of bounds (len: {})",
            self.nbrruns
        );
        if self.nbrruns == self.capacity() {
            self.increase_capacity();
        }
        let capacity = self.capacity();
        let n = self.nbrruns;
        self.buf.copy_within(index..n, index + 1);
        self.buf
            .copy_within(capacity + index..capacity + n, capacity + index + 1);
        self.nbrruns += 1;
    }

    /// Removes the slot at `index`, shifting the following runs one slot to the left.
    pub fn recover_room_at(&mut self, index: usize) {
        assert!(
            index < self.nbrruns,
            "Index {index} out of bounds (len: {})",
            self.nbrruns
        );
        let capacity = self.capacity();
        let n = self.nbrruns;
        self.buf.copy_within(index + 1..n, index);
        self.buf
            .copy_within(capacity + index + 1..capacity + n, capacity + index);
        self.nbrruns -= 1;
    }

    /// Appends a run after the current last run.
    pub fn push(&mut self, run: Run) {
        let index = self.nbrruns;
        self.make_room_at(index);
        self.set(index, run);
    }

    /// Drops all runs, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.nbrruns = 0;
    }

    /// Shrinks the buffer to exactly `2 * len()` slots.
    pub fn trim(&mut self) {
        if self.capacity() != self.nbrruns {
            self.reallocate(self.nbrruns);
        }
    }

    /// Returns the number of heap-allocated bytes held by the buffer.
    pub fn heap_size_bytes(&self) -> usize {
        self.buf.len() * std::mem::size_of::<u16>()
    }

    /// Capacity (in runs) to grow to from `capacity`: 4 when empty, doubling below
    /// 64 runs, 1.5x below 1024 runs and 1.25x beyond.
    pub fn next_capacity(capacity: usize) -> usize {
        if capacity == 0 {
            Self::DEFAULT_CAPACITY
        } else if capacity < 64 {
            capacity * 2
        } else if capacity < 1024 {
            capacity * 3 / 2
        } else {
            capacity * 5 / 4
        }
    }

    fn increase_capacity(&mut self) {
        let capacity = Self::next_capacity(self.capacity());
        if capacity >= 1024 {
            log::trace!(
                "run store growing from {} to {} runs",
                self.capacity(),
                capacity
            );
        }
        self.reallocate(capacity);
    }

    fn reallocate(&mut self, capacity: usize) {
        debug_assert!(capacity >= self.nbrruns);
        let old_capacity = self.capacity();
        let n = self.nbrruns;
        let mut buf = vec![0u16; 2 * capacity].into_boxed_slice();
        buf[..n].copy_from_slice(&self.buf[..n]);
        buf[capacity..capacity + n].copy_from_slice(&self.buf[old_capacity..old_capacity + n]);
        self.buf = buf;
    }
}

impl Default for RunStore {
    fn default() -> Self {
        RunStore::new()
    }
}

impl Clone for RunStore {
    /// Copies the live runs only; the clone has no spare capacity.
    fn clone(&self) -> Self {
        let n = self.nbrruns;
        let mut buf = vec![0u16; 2 * n].into_boxed_slice();
        buf[..n].copy_from_slice(self.starts());
        buf[n..].copy_from_slice(self.lengths());
        RunStore { buf, nbrruns: n }
    }
}
