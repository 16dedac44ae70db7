//! Run-length encoded container.
//!
//! Values are stored as maximal runs of consecutive values, each described by a
//! `(start, length)` pair covering `[start, start + length]`. Invariants, restored
//! after every mutation without a separate compaction pass:
//! - run starts are strictly ascending,
//! - runs never overlap,
//! - runs are never adjacent (`start[i + 1] > start[i] + length[i] + 1`); touching
//!   runs are always fused into one.

use std::ops::{Range, RangeInclusive};

use chunkset_common::{Result, error::Error};
use itertools::Itertools;

use crate::{
    array::ArrayContainer,
    bitmap::BitmapContainer,
    run::Run,
    run_store::RunStore,
    unsigned::{preceding_index, unsigned_binary_search},
};

/// A container storing its values as sorted, maximal, non-adjacent runs.
///
/// Efficient when values cluster into few long runs: each run costs four bytes
/// regardless of how many values it covers.
///
/// Single value insertion and removal locate the affected run with a binary search
/// over the run starts and then shift at most the runs that follow it, so they are
/// O(log r + r) in the number of runs `r`, independent of cardinality.
#[derive(Clone, Default)]
pub struct RunContainer {
    store: RunStore,
}

impl RunContainer {
    /// Capacity (in runs) of a container created with [`RunContainer::new`].
    pub const DEFAULT_INIT_SIZE: usize = 4;

    /// Creates an empty container with room for [`Self::DEFAULT_INIT_SIZE`] runs.
    pub fn new() -> RunContainer {
        RunContainer::with_capacity(Self::DEFAULT_INIT_SIZE)
    }

    /// Creates an empty container with room for `capacity` runs.
    pub fn with_capacity(capacity: usize) -> RunContainer {
        RunContainer {
            store: RunStore::with_capacity(capacity),
        }
    }

    /// Creates a container holding every value of the domain as a single run.
    pub fn full() -> RunContainer {
        RunContainer::from_store(RunStore::from_runs(&[Run::new(0, u16::MAX)]))
    }

    /// Builds a container from runs sorted by start. Overlapping or adjacent runs
    /// are fused.
    pub fn from_runs(runs: &[Run]) -> RunContainer {
        let mut store = RunStore::with_capacity(runs.len());
        for run in runs
            .iter()
            .copied()
            .coalesce(|prev, next| prev.coalesce(next))
        {
            store.push(run);
        }
        RunContainer::from_store(store)
    }

    /// Builds a container from ascending, non-overlapping half-open spans within
    /// `[0, 65536)`. Adjacent spans are fused; empty spans are skipped.
    pub fn from_spans(spans: impl Iterator<Item = Range<u32>>) -> RunContainer {
        let (lower, upper) = spans.size_hint();
        let mut store = RunStore::with_capacity(upper.unwrap_or(lower).min(32768));
        for run in spans
            .filter(|r| r.start < r.end)
            .map(Run::from)
            .coalesce(|prev, next| prev.coalesce(next))
        {
            store.push(run);
        }
        RunContainer::from_store(store)
    }

    /// Builds a container from inclusive ranges sorted by start. Overlapping or
    /// adjacent ranges are fused.
    pub fn from_ranges<I>(ranges: I) -> RunContainer
    where
        I: IntoIterator<Item = RangeInclusive<u16>>,
    {
        let runs = ranges
            .into_iter()
            .filter(|r| r.start() <= r.end())
            .map(Run::from)
            .collect::<Vec<_>>();
        RunContainer::from_runs(&runs)
    }

    pub(crate) fn from_store(store: RunStore) -> RunContainer {
        let container = RunContainer { store };
        #[cfg(debug_assertions)]
        container.check_full_invariants();
        container
    }

    /// Replaces the contents with `runs` (already maximal and sorted), reusing the
    /// existing buffer when it is large enough.
    pub(crate) fn assign_runs(&mut self, runs: &[Run]) {
        self.store.clear();
        for &run in runs {
            self.store.push(run);
        }
        #[cfg(debug_assertions)]
        self.check_full_invariants();
    }

    /// Number of runs.
    #[inline]
    pub fn num_runs(&self) -> usize {
        self.store.len()
    }

    /// Capacity of the run buffer, in runs.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// Returns the run at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.num_runs()`.
    #[inline]
    pub fn run(&self, index: usize) -> Run {
        assert!(
            index < self.store.len(),
            "Run index {index} out of bounds (len: {})",
            self.store.len()
        );
        self.store.get(index)
    }

    /// Returns the runs in ascending order.
    pub fn runs(&self) -> impl DoubleEndedIterator<Item = Run> + ExactSizeIterator + '_ {
        self.store.iter()
    }

    /// Returns the runs as half-open `u32` spans in ascending order.
    pub fn spans(&self) -> RunSpans<'_> {
        RunSpans {
            starts: self.store.starts().iter(),
            lengths: self.store.lengths().iter(),
        }
    }

    /// Inserts `value`.
    ///
    /// # Arguments
    ///
    /// * `value` - The value to insert
    ///
    /// # Returns
    ///
    /// `true` if `value` was not present before the call.
    ///
    /// Extends a neighbouring run when `value` touches it, fuses the two runs around
    /// `value` when it closes the gap between them, and otherwise inserts a new
    /// single-value run.
    pub fn add(&mut self, value: u16) -> bool {
        // `next` is the index of the first run starting after `value`.
        let next = match unsigned_binary_search(self.store.starts(), value) {
            Ok(_) => return false,
            Err(insertion_point) => insertion_point,
        };
        let touches_next =
            next < self.store.len() && self.store.start(next) as u32 == value as u32 + 1;

        if let Some(prev) = next.checked_sub(1) {
            let offset = (value - self.store.start(prev)) as u32;
            let length = self.store.length(prev) as u32;
            if offset <= length {
                return false;
            }
            if offset == length + 1 {
                if touches_next {
                    // `value` closes the gap: `prev` absorbs it and the whole next run.
                    let fused_end = self.store.get(next).end();
                    self.store
                        .set_length(prev, fused_end - self.store.start(prev));
                    self.store.recover_room_at(next);
                } else {
                    self.store.increment_length(prev);
                }
                return true;
            }
        }

        if touches_next {
            self.store.set_start(next, value);
            self.store.increment_length(next);
            return true;
        }

        self.store.make_room_at(next);
        self.store.set(next, Run::point(value));
        true
    }

    /// Removes `value`.
    ///
    /// # Arguments
    ///
    /// * `value` - The value to remove
    ///
    /// # Returns
    ///
    /// `true` if `value` was present before the call.
    ///
    /// Shrinks the covering run from whichever end `value` sits on, drops it if it
    /// held only `value`, and splits it in two when `value` is interior.
    pub fn remove(&mut self, value: u16) -> bool {
        let prev = match unsigned_binary_search(self.store.starts(), value) {
            Ok(index) => {
                if self.store.length(index) == 0 {
                    self.store.recover_room_at(index);
                } else {
                    self.store.set_start(index, value + 1);
                    self.store.decrement_length(index);
                }
                return true;
            }
            Err(insertion_point) => match insertion_point.checked_sub(1) {
                Some(prev) => prev,
                None => return false,
            },
        };

        let offset = value - self.store.start(prev);
        let length = self.store.length(prev);
        if offset < length {
            // Interior value: `prev` keeps `[start, value)`, a new run takes
            // `(value, end]`.
            self.store.set_length(prev, offset - 1);
            self.store.make_room_at(prev + 1);
            self.store
                .set(prev + 1, Run::new(value + 1, length - offset - 1));
            true
        } else if offset == length {
            self.store.decrement_length(prev);
            true
        } else {
            false
        }
    }

    /// Tests whether `value` is in the container.
    ///
    /// Finds the last run starting at or before `value` and checks that `value`
    /// lies within its length. O(log r) in the number of runs.
    #[inline]
    pub fn contains(&self, value: u16) -> bool {
        match preceding_index(self.store.starts(), value) {
            Some(index) => value - self.store.start(index) <= self.store.length(index),
            None => false,
        }
    }

    /// Number of values in the container.
    pub fn cardinality(&self) -> usize {
        self.store.len()
            + self
                .store
                .lengths()
                .iter()
                .map(|&length| length as usize)
                .sum::<usize>()
    }

    /// Returns `true` if the container holds no runs.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Smallest value: the start of the first run.
    #[inline]
    pub fn first(&self) -> Option<u16> {
        self.store.starts().first().copied()
    }

    /// Largest value: the end of the last run.
    #[inline]
    pub fn last(&self) -> Option<u16> {
        self.store.iter().next_back().map(|run| run.end())
    }

    /// Number of values `<= value`.
    ///
    /// Sums the lengths of the runs ending before `value`, plus the part of the run
    /// containing it. Runs starting after `value` end the scan.
    pub fn rank(&self, value: u16) -> usize {
        let mut rank = 0usize;
        for run in self.store.iter() {
            if value < run.start {
                break;
            }
            if value <= run.end() {
                return rank + (value - run.start) as usize + 1;
            }
            rank += run.len();
        }
        rank
    }

    /// Returns the value at ascending rank `index` (0-based).
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `index >= self.cardinality()`.
    pub fn select(&self, index: usize) -> Result<u16> {
        let mut seen = 0usize;
        for run in self.store.iter() {
            let len = run.len();
            if index < seen + len {
                return Ok(run.start + (index - seen) as u16);
            }
            seen += len;
        }
        Err(Error::index_out_of_range(index, seen))
    }

    /// Returns a container holding the smallest `count` values, splitting the run
    /// that straddles the boundary.
    pub fn limit(&self, count: usize) -> RunContainer {
        let mut runs = Vec::new();
        let mut remaining = count;
        for run in self.store.iter() {
            if remaining == 0 {
                break;
            }
            if run.len() <= remaining {
                runs.push(run);
                remaining -= run.len();
            } else {
                runs.push(Run::new(run.start, (remaining - 1) as u16));
                remaining = 0;
            }
        }
        RunContainer::from_store(RunStore::from_runs(&runs))
    }

    /// Ascending iterator over the values.
    pub fn iter(&self) -> RunIter<'_> {
        RunIter {
            store: &self.store,
            run_index: 0,
            offset: 0,
        }
    }

    /// Descending iterator over the values.
    pub fn rev_iter(&self) -> RevRunIter<'_> {
        RevRunIter {
            store: &self.store,
            runs_left: self.store.len(),
            offset: 0,
        }
    }

    /// Writes `(high_bits << 16) | value` for every value, in ascending order, into
    /// the front of `out`. Returns the number of entries written.
    ///
    /// # Panics
    ///
    /// Panics if `out` is shorter than [`Self::cardinality`].
    pub fn fill_least_significant_16bits(&self, out: &mut [u32], high_bits: u16) -> usize {
        let cardinality = self.cardinality();
        assert!(
            out.len() >= cardinality,
            "Output slice too short: {} < {cardinality}",
            out.len()
        );
        let high = (high_bits as u32) << 16;
        let mut pos = 0;
        for span in self.spans() {
            for value in span {
                out[pos] = high | value;
                pos += 1;
            }
        }
        pos
    }

    /// Drops all runs, keeping the allocated buffer.
    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Shrinks the run buffer to exactly the live runs.
    pub fn trim(&mut self) {
        self.store.trim();
    }

    /// Expands the runs into a sorted value list.
    pub fn to_array(&self) -> ArrayContainer {
        ArrayContainer::from_spans(self.spans(), self.cardinality())
    }

    /// Sets the bits of every run in a fresh bitmap, one word range per run.
    pub fn to_bitmap(&self) -> BitmapContainer {
        BitmapContainer::from_spans(self.spans())
    }

    /// Logical size: a four-byte header plus four bytes per run.
    pub fn size_in_bytes(&self) -> usize {
        4 + 4 * self.store.len()
    }

    /// Returns the number of heap-allocated bytes used by the run buffer.
    pub fn heap_size_bytes(&self) -> usize {
        self.store.heap_size_bytes()
    }

    pub(crate) fn store(&self) -> &RunStore {
        &self.store
    }

    /// Validates the run invariants.
    ///
    /// # Panics
    ///
    /// Panics if a run exceeds the `u16` domain, or two runs overlap, touch or are
    /// out of order.
    pub fn check_full_invariants(&self) {
        let mut prev: Option<Run> = None;
        for run in self.store.iter() {
            assert!(
                run.start as u32 + run.length as u32 <= u16::MAX as u32,
                "Run ({}, {}) exceeds u16 domain",
                run.start,
                run.length
            );
            if let Some(p) = prev {
                assert!(
                    p.end() as u32 + 1 < run.start as u32,
                    "Runs must be sorted, disjoint and non-adjacent: prev={p:?}, next={run:?}"
                );
            }
            prev = Some(run);
        }
    }
}

impl PartialEq for RunContainer {
    /// Structural equality: same number of runs and the same `(start, length)`
    /// pairs in order. Spare capacity is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.store.starts() == other.store.starts() && self.store.lengths() == other.store.lengths()
    }
}

impl Eq for RunContainer {}

impl std::fmt::Debug for RunContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.store.iter().map(|run| run.as_inclusive()))
            .finish()
    }
}

/// Iterator over the runs of a [`RunContainer`] as half-open `u32` spans.
#[derive(Clone)]
pub struct RunSpans<'a> {
    starts: std::slice::Iter<'a, u16>,
    lengths: std::slice::Iter<'a, u16>,
}

impl<'a> Iterator for RunSpans<'a> {
    type Item = Range<u32>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let start = *self.starts.next()? as u32;
        let length = *self.lengths.next()? as u32;
        Some(start..start + length + 1)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.starts.size_hint()
    }
}

impl<'a> DoubleEndedIterator for RunSpans<'a> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        let start = *self.starts.next_back()? as u32;
        let length = *self.lengths.next_back()? as u32;
        Some(start..start + length + 1)
    }
}

impl<'a> ExactSizeIterator for RunSpans<'a> {}

impl<'a> std::iter::FusedIterator for RunSpans<'a> {}

/// Ascending cursor over the values of a [`RunContainer`]: the current run and the
/// offset of the next value inside it.
///
/// The cursor borrows the container, so the container cannot be mutated while the
/// iterator is alive.
#[derive(Clone)]
pub struct RunIter<'a> {
    store: &'a RunStore,
    run_index: usize,
    offset: u32,
}

impl<'a> Iterator for RunIter<'a> {
    type Item = u16;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.run_index >= self.store.len() {
            return None;
        }
        let run = self.store.get(self.run_index);
        let value = run.start + self.offset as u16;
        self.offset += 1;
        if self.offset > run.length as u32 {
            self.run_index += 1;
            self.offset = 0;
        }
        Some(value)
    }
}

impl<'a> std::iter::FusedIterator for RunIter<'a> {}

/// Descending cursor over the values of a [`RunContainer`].
#[derive(Clone)]
pub struct RevRunIter<'a> {
    store: &'a RunStore,
    /// Runs not yet exhausted; the cursor reads run `runs_left - 1`.
    runs_left: usize,
    offset: u32,
}

impl<'a> Iterator for RevRunIter<'a> {
    type Item = u16;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let index = self.runs_left.checked_sub(1)?;
        let run = self.store.get(index);
        let value = run.end() - self.offset as u16;
        self.offset += 1;
        if self.offset > run.length as u32 {
            self.runs_left = index;
            self.offset = 0;
        }
        Some(value)
    }
}

impl<'a> std::iter::FusedIterator for RevRunIter<'a> {}
