//! Dense container storing one bit per value of the chunk.

use std::ops::Range;

use crate::{array::ArrayContainer, run_container::RunContainer};

/// Number of `u64` words covering the 65536-value chunk.
pub const BITMAP_WORDS: usize = 1024;

/// A container storing one bit per value of the 16-bit domain.
///
/// The bits are stored in little-endian order within `u64` words: value `v` lives in
/// bit `v % 64` of word `v / 64`. The cardinality is cached and kept current by every
/// mutation, so [`BitmapContainer::cardinality`] is O(1).
///
/// Performance
/// - Single value access: O(1)
/// - Bitwise operations, rank, run counting: O(1024) word operations
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BitmapContainer {
    words: Box<[u64; BITMAP_WORDS]>,
    cardinality: usize,
}

impl BitmapContainer {
    /// Fixed size of the bit storage in bytes.
    pub const SIZE_IN_BYTES: usize = BITMAP_WORDS * 8;

    /// Creates a bitmap with no values set.
    pub fn new() -> BitmapContainer {
        BitmapContainer {
            words: Box::new([0u64; BITMAP_WORDS]),
            cardinality: 0,
        }
    }

    /// Creates a bitmap with every value of the domain set.
    pub fn full() -> BitmapContainer {
        BitmapContainer {
            words: Box::new([u64::MAX; BITMAP_WORDS]),
            cardinality: u16::MAX as usize + 1,
        }
    }

    /// Wraps existing words, recomputing the cardinality.
    pub fn from_words(words: Box<[u64; BITMAP_WORDS]>) -> BitmapContainer {
        let cardinality = popcount(words.as_slice());
        BitmapContainer { words, cardinality }
    }

    /// Creates a bitmap with the given values set.
    ///
    /// # Arguments
    ///
    /// * `values` - Values to set, in any order; duplicates are ignored
    pub fn from_values(values: impl Iterator<Item = u16>) -> BitmapContainer {
        let mut bitmap = BitmapContainer::new();
        for value in values {
            bitmap.add(value);
        }
        bitmap
    }

    /// Builds a bitmap from ascending, non-overlapping half-open spans within
    /// `[0, 65536)`.
    pub fn from_spans(spans: impl Iterator<Item = Range<u32>>) -> BitmapContainer {
        let mut bitmap = BitmapContainer::new();
        for span in spans {
            bitmap.set_range(span);
        }
        bitmap
    }

    /// Raw storage words; value `v` is bit `v % 64` of word `v / 64`.
    #[inline]
    pub fn words(&self) -> &[u64; BITMAP_WORDS] {
        &self.words
    }

    /// Sets `value`, returning `true` if it was not set before.
    #[inline]
    pub fn add(&mut self, value: u16) -> bool {
        let (word_index, mask) = Self::bit_position(value);
        let word = &mut self.words[word_index];
        let added = *word & mask == 0;
        *word |= mask;
        self.cardinality += added as usize;
        added
    }

    /// Clears `value`, returning `true` if it was set before.
    #[inline]
    pub fn remove(&mut self, value: u16) -> bool {
        let (word_index, mask) = Self::bit_position(value);
        let word = &mut self.words[word_index];
        let removed = *word & mask != 0;
        *word &= !mask;
        self.cardinality -= removed as usize;
        removed
    }

    /// Tests the bit of `value`.
    #[inline]
    pub fn contains(&self, value: u16) -> bool {
        let (word_index, mask) = Self::bit_position(value);
        self.words[word_index] & mask != 0
    }

    /// Number of set values, read from the cached count.
    #[inline]
    pub fn cardinality(&self) -> usize {
        self.cardinality
    }

    /// Returns `true` if no bit is set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cardinality == 0
    }

    /// Sets every value of the half-open `range`.
    pub fn set_range(&mut self, range: Range<u32>) {
        self.process_range(range, |word, mask| *word |= mask);
    }

    /// Clears every value of the half-open `range`.
    pub fn reset_range(&mut self, range: Range<u32>) {
        self.process_range(range, |word, mask| *word &= !mask);
    }

    /// Flips every value of the half-open `range`.
    pub fn flip_range(&mut self, range: Range<u32>) {
        self.process_range(range, |word, mask| *word ^= mask);
    }

    /// Applies `mask_fn` to every word overlapping `range`, with a mask selecting the
    /// bits of that word inside the range, then refreshes the cached cardinality of
    /// the touched words.
    fn process_range(&mut self, range: Range<u32>, mask_fn: impl Fn(&mut u64, u64)) {
        let (start, end) = (range.start as usize, range.end as usize);
        if start >= end {
            return;
        }
        assert!(
            end <= u16::MAX as usize + 1,
            "Range end {end} out of bounds (len: 65536)"
        );

        let (start_word, start_bit) = (start / 64, start % 64);
        let (end_word, end_bit) = ((end - 1) / 64, (end - 1) % 64);
        let touched = &mut self.words[start_word..=end_word];
        let before = popcount(touched);

        let last = touched.len() - 1;
        for (i, word) in touched.iter_mut().enumerate() {
            let low = if i == 0 { start_bit } else { 0 };
            let high = if i == last { end_bit } else { 63 };
            let mask = (u64::MAX >> (63 - high)) & (u64::MAX << low);
            mask_fn(word, mask);
        }

        let after = popcount(touched);
        self.cardinality = self.cardinality + after - before;
    }

    /// Ascending iterator over the set values; `.rev()` walks them descending.
    pub fn iter(&self) -> BitmapIter<'_> {
        BitmapIter {
            words: &self.words[..],
            front_index: 0,
            front_word: self.words[0],
            back_index: BITMAP_WORDS - 1,
            back_word: self.words[BITMAP_WORDS - 1],
        }
    }

    /// Iterator over the maximal runs of set values as half-open spans.
    pub fn spans(&self) -> BitmapSpans<'_> {
        BitmapSpans {
            words: &self.words[..],
            current_word: self.words[0],
            word_index: 0,
        }
    }

    /// Counts the number of runs (maximal contiguous sequences) of set values.
    pub fn count_runs(&self) -> usize {
        // A run starts at bit `i` if bit `i` is set and bit `i - 1` is not; the
        // previous word's top bit carries into bit 0.
        let mut runs = 0usize;
        let mut prev_word = 0u64;
        for &word in self.words.iter() {
            let shifted_prev = (word << 1) | (prev_word >> 63);
            runs += (word & !shifted_prev).count_ones() as usize;
            prev_word = word;
        }
        runs
    }

    /// Number of set values `<= value`.
    ///
    /// # Arguments
    ///
    /// * `value` - Inclusive upper bound of the counted values
    ///
    /// # Returns
    ///
    /// The popcount of all words below `value`'s word, plus the bits of that word
    /// at or below `value`.
    pub fn rank(&self, value: u16) -> usize {
        let (word_index, bit) = (value as usize / 64, value as usize % 64);
        popcount(&self.words[..word_index])
            + (self.words[word_index] << (63 - bit)).count_ones() as usize
    }

    /// Value at ascending rank `index`, if any.
    ///
    /// Skips whole words by popcount, then clears the lowest set bits of the target
    /// word until the wanted one is lowest.
    pub fn select(&self, index: usize) -> Option<u16> {
        if index >= self.cardinality {
            return None;
        }
        let mut remaining = index as u32;
        for (word_index, &word) in self.words.iter().enumerate() {
            let ones = word.count_ones();
            if remaining < ones {
                let mut w = word;
                for _ in 0..remaining {
                    w &= w - 1;
                }
                return Some((word_index * 64) as u16 + w.trailing_zeros() as u16);
            }
            remaining -= ones;
        }
        None
    }

    /// Returns a bitmap holding the smallest `count` set values.
    pub fn limit(&self, count: usize) -> BitmapContainer {
        if count >= self.cardinality {
            return self.clone();
        }
        let mut words = Box::new([0u64; BITMAP_WORDS]);
        let mut remaining = count;
        for (dst, &src) in words.iter_mut().zip(self.words.iter()) {
            if remaining == 0 {
                break;
            }
            let ones = src.count_ones() as usize;
            if ones <= remaining {
                *dst = src;
                remaining -= ones;
            } else {
                let mut w = src;
                let mut kept = 0u64;
                for _ in 0..remaining {
                    let lowest = w & w.wrapping_neg();
                    kept |= lowest;
                    w &= w - 1;
                }
                *dst = kept;
                remaining = 0;
            }
        }
        BitmapContainer {
            words,
            cardinality: count,
        }
    }

    /// Smallest set value, if any.
    pub fn first(&self) -> Option<u16> {
        self.iter().next()
    }

    /// Largest set value, if any.
    pub fn last(&self) -> Option<u16> {
        self.iter().next_back()
    }

    /// Clears every bit.
    pub fn clear(&mut self) {
        self.words.fill(0);
        self.cardinality = 0;
    }

    /// Combines two bitmaps word by word.
    pub fn combine(&self, other: &BitmapContainer, f: impl Fn(u64, u64) -> u64) -> Self {
        let mut words = Box::new([0u64; BITMAP_WORDS]);
        for (dst, (&l, &r)) in words
            .iter_mut()
            .zip(self.words.iter().zip(other.words.iter()))
        {
            *dst = f(l, r);
        }
        BitmapContainer::from_words(words)
    }

    /// Collects the set values into a sorted value list.
    pub fn to_array(&self) -> ArrayContainer {
        let mut values = Vec::with_capacity(self.cardinality);
        values.extend(self.iter());
        ArrayContainer::from_sorted_vec(values)
    }

    /// Converts the maximal runs of set bits into a run container.
    pub fn to_run(&self) -> RunContainer {
        RunContainer::from_spans(self.spans())
    }

    /// Returns the number of heap-allocated bytes used by the word storage.
    pub fn heap_size_bytes(&self) -> usize {
        Self::SIZE_IN_BYTES
    }

    /// Validates the cached cardinality against the words.
    ///
    /// # Panics
    ///
    /// Panics if the cached count differs from the popcount of the words.
    pub fn check_full_invariants(&self) {
        assert_eq!(
            self.cardinality,
            popcount(self.words.as_slice()),
            "Cached cardinality out of sync"
        );
    }

    #[inline]
    fn bit_position(value: u16) -> (usize, u64) {
        (value as usize / 64, 1u64 << (value % 64))
    }
}

impl Default for BitmapContainer {
    fn default() -> Self {
        BitmapContainer::new()
    }
}

impl std::fmt::Debug for BitmapContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitmapContainer")
            .field("cardinality", &self.cardinality)
            .field("runs", &self.count_runs())
            .finish()
    }
}

#[inline]
fn popcount(words: &[u64]) -> usize {
    words.iter().map(|w| w.count_ones() as usize).sum()
}

/// Iterator over the set values of a [`BitmapContainer`], from both ends.
#[derive(Clone)]
pub struct BitmapIter<'a> {
    words: &'a [u64],
    /// Index of the word the front cursor reads; unconsumed bits in `front_word`.
    front_index: usize,
    front_word: u64,
    /// Index of the word the back cursor reads; unconsumed bits in `back_word`.
    back_index: usize,
    back_word: u64,
}

impl<'a> BitmapIter<'a> {
    /// Once both cursors sit on the same word, they share one set of unconsumed bits.
    #[inline]
    fn shared_word(&mut self) -> u64 {
        self.front_word & self.back_word
    }
}

impl<'a> Iterator for BitmapIter<'a> {
    type Item = u16;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.front_index > self.back_index {
                return None;
            }
            if self.front_index == self.back_index {
                let word = self.shared_word();
                if word == 0 {
                    self.front_index += 1;
                    return None;
                }
                let bit = word.trailing_zeros();
                self.front_word = word & (word - 1);
                self.back_word = self.front_word;
                return Some((self.front_index * 64) as u16 + bit as u16);
            }
            if self.front_word != 0 {
                let bit = self.front_word.trailing_zeros();
                self.front_word &= self.front_word - 1;
                return Some((self.front_index * 64) as u16 + bit as u16);
            }
            self.front_index += 1;
            self.front_word = self.words[self.front_index];
        }
    }
}

impl<'a> DoubleEndedIterator for BitmapIter<'a> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        loop {
            if self.front_index > self.back_index {
                return None;
            }
            if self.front_index == self.back_index {
                let word = self.shared_word();
                if word == 0 {
                    self.front_index += 1;
                    return None;
                }
                let bit = 63 - word.leading_zeros();
                self.back_word = word & !(1u64 << bit);
                self.front_word = self.back_word;
                return Some((self.back_index * 64) as u16 + bit as u16);
            }
            if self.back_word != 0 {
                let bit = 63 - self.back_word.leading_zeros();
                self.back_word &= !(1u64 << bit);
                return Some((self.back_index * 64) as u16 + bit as u16);
            }
            self.back_index -= 1;
            self.back_word = self.words[self.back_index];
        }
    }
}

impl<'a> std::iter::FusedIterator for BitmapIter<'a> {}

/// Iterator over the maximal runs of set values of a [`BitmapContainer`].
#[derive(Clone)]
pub struct BitmapSpans<'a> {
    words: &'a [u64],
    /// Unconsumed bits of the word at `word_index`.
    current_word: u64,
    word_index: usize,
}

impl<'a> BitmapSpans<'a> {
    #[inline]
    fn advance_word(&mut self) -> Option<u64> {
        self.word_index += 1;
        let word = *self.words.get(self.word_index)?;
        self.current_word = word;
        Some(word)
    }

    /// Extends a run that reached the end of the current word across the following
    /// words, returning its exclusive end.
    #[inline]
    fn extend_run(&mut self, mut end: u32) -> u32 {
        while let Some(word) = self.advance_word() {
            if word == u64::MAX {
                end += 64;
                self.current_word = 0;
                continue;
            }
            let ones = word.trailing_ones();
            end += ones;
            self.current_word = word & !((1u64 << ones) - 1);
            break;
        }
        end
    }
}

impl<'a> Iterator for BitmapSpans<'a> {
    type Item = Range<u32>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.current_word == 0 {
            self.advance_word()?;
        }
        let base = (self.word_index * 64) as u32;
        let tz = self.current_word.trailing_zeros();
        let start = base + tz;
        let ones = (self.current_word >> tz).trailing_ones();
        if tz + ones < 64 {
            let mask = ((1u64 << ones) - 1) << tz;
            self.current_word &= !mask;
            return Some(start..start + ones);
        }
        self.current_word = 0;
        let end = self.extend_run(base + 64);
        Some(start..end)
    }
}

impl<'a> std::iter::FusedIterator for BitmapSpans<'a> {}
