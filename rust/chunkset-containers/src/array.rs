//! Sparse container storing values as a sorted list.

use std::ops::Range;

use crate::{bitmap::BitmapContainer, run_container::RunContainer};

/// A container storing its values as a sorted, duplicate-free `Vec<u16>`.
///
/// Efficient for sparse chunks: each value costs two bytes. Past
/// [`ContainerPolicy::array_max_cardinality`](crate::policy::ContainerPolicy) values a
/// [`BitmapContainer`] is smaller, and [`Container`](crate::Container) switches over.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ArrayContainer {
    /// Strictly ascending values.
    values: Vec<u16>,
}

impl ArrayContainer {
    pub fn new() -> ArrayContainer {
        ArrayContainer { values: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> ArrayContainer {
        ArrayContainer {
            values: Vec::with_capacity(capacity),
        }
    }

    /// Wraps a strictly ascending vector of values.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if `values` is not strictly ascending.
    pub fn from_sorted_vec(values: Vec<u16>) -> ArrayContainer {
        let container = ArrayContainer { values };
        #[cfg(debug_assertions)]
        container.check_full_invariants();
        container
    }

    /// Builds a container from ascending, non-overlapping half-open spans within
    /// `[0, 65536)`.
    pub fn from_spans(spans: impl Iterator<Item = Range<u32>>, cardinality: usize) -> Self {
        let mut values = Vec::with_capacity(cardinality);
        values.extend(spans.flatten().map(|v| v as u16));
        ArrayContainer::from_sorted_vec(values)
    }

    /// Inserts `value`, returning `true` if it was not present.
    pub fn add(&mut self, value: u16) -> bool {
        // Appending in order is the common case.
        match self.values.last() {
            None => {
                self.values.push(value);
                return true;
            }
            Some(&last) if last < value => {
                self.values.push(value);
                return true;
            }
            _ => (),
        }
        match self.values.binary_search(&value) {
            Ok(_) => false,
            Err(index) => {
                self.values.insert(index, value);
                true
            }
        }
    }

    /// Removes `value`, returning `true` if it was present.
    pub fn remove(&mut self, value: u16) -> bool {
        match self.values.binary_search(&value) {
            Ok(index) => {
                self.values.remove(index);
                true
            }
            Err(_) => false,
        }
    }

    #[inline]
    pub fn contains(&self, value: u16) -> bool {
        self.values.binary_search(&value).is_ok()
    }

    #[inline]
    pub fn cardinality(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn values(&self) -> &[u16] {
        &self.values
    }

    #[inline]
    pub fn first(&self) -> Option<u16> {
        self.values.first().copied()
    }

    #[inline]
    pub fn last(&self) -> Option<u16> {
        self.values.last().copied()
    }

    /// Ascending iterator over the values; `.rev()` walks them in descending order.
    #[inline]
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, u16>> {
        self.values.iter().copied()
    }

    /// Iterator over maximal stretches of consecutive values as half-open spans.
    pub fn spans(&self) -> ArraySpans<'_> {
        ArraySpans {
            values: &self.values,
        }
    }

    /// Number of maximal runs of consecutive values.
    pub fn count_runs(&self) -> usize {
        count_runs(&self.values)
    }

    /// Number of values `<= value`.
    pub fn rank(&self, value: u16) -> usize {
        self.values.partition_point(|&v| v <= value)
    }

    /// Value at ascending rank `index`, if any.
    pub fn select(&self, index: usize) -> Option<u16> {
        self.values.get(index).copied()
    }

    /// Returns a container holding the smallest `count` values.
    pub fn limit(&self, count: usize) -> ArrayContainer {
        let count = count.min(self.values.len());
        ArrayContainer {
            values: self.values[..count].to_vec(),
        }
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn trim(&mut self) {
        self.values.shrink_to_fit();
    }

    pub fn to_bitmap(&self) -> BitmapContainer {
        BitmapContainer::from_values(self.iter())
    }

    pub fn to_run(&self) -> RunContainer {
        RunContainer::from_spans(self.spans())
    }

    /// Logical size: a two-byte header plus two bytes per value.
    pub fn size_in_bytes(&self) -> usize {
        2 + 2 * self.values.len()
    }

    /// Returns the number of heap-allocated bytes used by the value list.
    pub fn heap_size_bytes(&self) -> usize {
        self.values.capacity() * std::mem::size_of::<u16>()
    }

    pub fn check_full_invariants(&self) {
        assert!(
            self.values.len() <= u16::MAX as usize + 1,
            "Too many values: {}",
            self.values.len()
        );
        for pair in self.values.windows(2) {
            assert!(
                pair[0] < pair[1],
                "Values must be strictly ascending: {} >= {}",
                pair[0],
                pair[1]
            );
        }
    }
}

impl std::fmt::Debug for ArrayContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ArrayContainer").field(&self.values).finish()
    }
}

/// Iterator over the maximal runs of an [`ArrayContainer`] as half-open `u32` spans.
#[derive(Clone)]
pub struct ArraySpans<'a> {
    values: &'a [u16],
}

impl<'a> Iterator for ArraySpans<'a> {
    type Item = Range<u32>;

    fn next(&mut self) -> Option<Self::Item> {
        let (&first, rest) = self.values.split_first()?;
        let mut end = first as u32 + 1;
        let mut taken = 1;
        for &v in rest {
            if v as u32 != end {
                break;
            }
            end += 1;
            taken += 1;
        }
        self.values = &self.values[taken..];
        Some(first as u32..end)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.values.len().min(1), Some(self.values.len()))
    }
}

impl<'a> std::iter::FusedIterator for ArraySpans<'a> {}

/// Counts maximal runs of consecutive values in a strictly ascending slice.
pub(crate) fn count_runs(values: &[u16]) -> usize {
    if values.is_empty() {
        return 0;
    }
    1 + values.windows(2).filter(|w| w[1] - w[0] > 1).count()
}
