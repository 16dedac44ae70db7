//! The closed set of container representations.

use std::ops::Range;

use chunkset_common::{Result, error::Error};

use crate::{
    array::{ArrayContainer, ArraySpans},
    bitmap::{BitmapContainer, BitmapIter, BitmapSpans},
    policy::ContainerPolicy,
    run::Run,
    run_container::{RevRunIter, RunContainer, RunIter, RunSpans},
    run_store::RunStore,
};

/// Representation tag of a [`Container`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// Sorted list of values.
    Array,
    /// One bit per value of the chunk.
    Bitmap,
    /// Sorted list of maximal runs.
    Run,
}

/// A subset of one 16-bit chunk, in one of three interchangeable representations.
///
/// All variants expose the same capabilities; binary operations accept any pair of
/// representations. `PartialEq` is structural (same representation and the same
/// encoded contents), while [`Container::is_equal_to`] compares the value sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Container {
    Array(ArrayContainer),
    Bitmap(BitmapContainer),
    Run(RunContainer),
}

impl Container {
    /// Creates an empty container (array form).
    pub fn new() -> Container {
        Container::Array(ArrayContainer::new())
    }

    /// Builds a container from ascending, non-overlapping half-open spans within
    /// `[0, 65536)`, in the representation `policy` picks for the result.
    pub fn from_spans(spans: impl Iterator<Item = Range<u32>>, policy: &ContainerPolicy) -> Self {
        let runs = RunContainer::from_spans(spans);
        Container::Run(runs).into_best(policy)
    }

    /// Builds a container from runs that are already sorted and maximal, in the
    /// requested representation.
    pub(crate) fn from_runs_as(kind: ContainerKind, runs: &[Run], cardinality: usize) -> Self {
        let spans = runs.iter().map(Run::as_range_u32);
        match kind {
            ContainerKind::Array => Container::Array(ArrayContainer::from_spans(spans, cardinality)),
            ContainerKind::Bitmap => Container::Bitmap(BitmapContainer::from_spans(spans)),
            ContainerKind::Run => Container::Run(RunContainer::from_store(RunStore::from_runs(runs))),
        }
    }

    #[inline]
    pub fn kind(&self) -> ContainerKind {
        match self {
            Container::Array(_) => ContainerKind::Array,
            Container::Bitmap(_) => ContainerKind::Bitmap,
            Container::Run(_) => ContainerKind::Run,
        }
    }

    /// Inserts `value`, returning `true` if it was not present.
    ///
    /// An array growing past the default policy's `array_max_cardinality` is
    /// promoted to a bitmap.
    pub fn add(&mut self, value: u16) -> bool {
        self.add_with_policy(value, &ContainerPolicy::DEFAULT)
    }

    /// Inserts `value`, promoting an array to a bitmap once its cardinality exceeds
    /// `policy.array_max_cardinality()`.
    pub fn add_with_policy(&mut self, value: u16, policy: &ContainerPolicy) -> bool {
        match self {
            Container::Array(array) => {
                if !array.add(value) {
                    return false;
                }
                if array.cardinality() > policy.array_max_cardinality() {
                    log::trace!(
                        "promoting array of {} values to bitmap",
                        array.cardinality()
                    );
                    *self = Container::Bitmap(array.to_bitmap());
                }
                true
            }
            Container::Bitmap(bitmap) => bitmap.add(value),
            Container::Run(run) => run.add(value),
        }
    }

    /// Removes `value`, returning `true` if it was present.
    ///
    /// A bitmap shrinking to the default policy's `array_max_cardinality` is
    /// demoted to an array.
    pub fn remove(&mut self, value: u16) -> bool {
        self.remove_with_policy(value, &ContainerPolicy::DEFAULT)
    }

    /// Removes `value`, demoting a bitmap to an array once its cardinality drops to
    /// `policy.array_max_cardinality()`.
    pub fn remove_with_policy(&mut self, value: u16, policy: &ContainerPolicy) -> bool {
        match self {
            Container::Array(array) => array.remove(value),
            Container::Bitmap(bitmap) => {
                if !bitmap.remove(value) {
                    return false;
                }
                if bitmap.cardinality() <= policy.array_max_cardinality() {
                    log::trace!(
                        "demoting bitmap of {} values to array",
                        bitmap.cardinality()
                    );
                    *self = Container::Array(bitmap.to_array());
                }
                true
            }
            Container::Run(run) => run.remove(value),
        }
    }

    #[inline]
    pub fn contains(&self, value: u16) -> bool {
        match self {
            Container::Array(c) => c.contains(value),
            Container::Bitmap(c) => c.contains(value),
            Container::Run(c) => c.contains(value),
        }
    }

    pub fn cardinality(&self) -> usize {
        match self {
            Container::Array(c) => c.cardinality(),
            Container::Bitmap(c) => c.cardinality(),
            Container::Run(c) => c.cardinality(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Container::Array(c) => c.is_empty(),
            Container::Bitmap(c) => c.is_empty(),
            Container::Run(c) => c.is_empty(),
        }
    }

    pub fn first(&self) -> Option<u16> {
        match self {
            Container::Array(c) => c.first(),
            Container::Bitmap(c) => c.first(),
            Container::Run(c) => c.first(),
        }
    }

    pub fn last(&self) -> Option<u16> {
        match self {
            Container::Array(c) => c.last(),
            Container::Bitmap(c) => c.last(),
            Container::Run(c) => c.last(),
        }
    }

    /// Number of maximal runs of consecutive values.
    pub fn count_runs(&self) -> usize {
        match self {
            Container::Array(c) => c.count_runs(),
            Container::Bitmap(c) => c.count_runs(),
            Container::Run(c) => c.num_runs(),
        }
    }

    /// Number of values `<= value`.
    pub fn rank(&self, value: u16) -> usize {
        match self {
            Container::Array(c) => c.rank(value),
            Container::Bitmap(c) => c.rank(value),
            Container::Run(c) => c.rank(value),
        }
    }

    /// Returns the value at ascending rank `index` (0-based).
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `index >= self.cardinality()`.
    pub fn select(&self, index: usize) -> Result<u16> {
        match self {
            Container::Array(c) => c
                .select(index)
                .ok_or_else(|| Error::index_out_of_range(index, c.cardinality())),
            Container::Bitmap(c) => c
                .select(index)
                .ok_or_else(|| Error::index_out_of_range(index, c.cardinality())),
            Container::Run(c) => c.select(index),
        }
    }

    /// Returns a container of the same representation holding the smallest `count`
    /// values.
    pub fn limit(&self, count: usize) -> Container {
        match self {
            Container::Array(c) => Container::Array(c.limit(count)),
            Container::Bitmap(c) => Container::Bitmap(c.limit(count)),
            Container::Run(c) => Container::Run(c.limit(count)),
        }
    }

    /// Ascending iterator over the values.
    pub fn iter(&self) -> ContainerIter<'_> {
        match self {
            Container::Array(c) => ContainerIter::Array(c.iter()),
            Container::Bitmap(c) => ContainerIter::Bitmap(c.iter()),
            Container::Run(c) => ContainerIter::Run(c.iter()),
        }
    }

    /// Descending iterator over the values.
    pub fn rev_iter(&self) -> ContainerRevIter<'_> {
        match self {
            Container::Array(c) => ContainerRevIter::Array(c.iter().rev()),
            Container::Bitmap(c) => ContainerRevIter::Bitmap(c.iter().rev()),
            Container::Run(c) => ContainerRevIter::Run(c.rev_iter()),
        }
    }

    /// Maximal runs of values as ascending half-open spans.
    pub fn spans(&self) -> ContainerSpans<'_> {
        match self {
            Container::Array(c) => ContainerSpans::Array(c.spans()),
            Container::Bitmap(c) => ContainerSpans::Bitmap(c.spans()),
            Container::Run(c) => ContainerSpans::Run(c.spans()),
        }
    }

    /// Logical size of the representation in bytes.
    pub fn size_in_bytes(&self) -> usize {
        match self {
            Container::Array(c) => c.size_in_bytes(),
            Container::Bitmap(_) => BitmapContainer::SIZE_IN_BYTES,
            Container::Run(c) => c.size_in_bytes(),
        }
    }

    pub fn heap_size_bytes(&self) -> usize {
        match self {
            Container::Array(c) => c.heap_size_bytes(),
            Container::Bitmap(c) => c.heap_size_bytes(),
            Container::Run(c) => c.heap_size_bytes(),
        }
    }

    /// Releases spare capacity.
    pub fn trim(&mut self) {
        match self {
            Container::Array(c) => c.trim(),
            Container::Bitmap(_) => (),
            Container::Run(c) => c.trim(),
        }
    }

    pub fn clear(&mut self) {
        match self {
            Container::Array(c) => c.clear(),
            Container::Bitmap(c) => c.clear(),
            Container::Run(c) => c.clear(),
        }
    }

    pub fn to_array(&self) -> ArrayContainer {
        match self {
            Container::Array(c) => c.clone(),
            Container::Bitmap(c) => c.to_array(),
            Container::Run(c) => c.to_array(),
        }
    }

    pub fn to_bitmap(&self) -> BitmapContainer {
        match self {
            Container::Array(c) => c.to_bitmap(),
            Container::Bitmap(c) => c.clone(),
            Container::Run(c) => c.to_bitmap(),
        }
    }

    pub fn to_run(&self) -> RunContainer {
        match self {
            Container::Array(c) => c.to_run(),
            Container::Bitmap(c) => c.to_run(),
            Container::Run(c) => c.clone(),
        }
    }

    /// Converts into the representation `kind`; a no-op when already there.
    pub fn into_kind(self, kind: ContainerKind) -> Container {
        if self.kind() == kind {
            return self;
        }
        log::trace!(
            "converting {:?} container of {} values to {:?}",
            self.kind(),
            self.cardinality(),
            kind
        );
        match kind {
            ContainerKind::Array => Container::Array(self.to_array()),
            ContainerKind::Bitmap => Container::Bitmap(self.to_bitmap()),
            ContainerKind::Run => Container::Run(self.to_run()),
        }
    }

    /// Converts into the representation `policy` considers smallest.
    pub fn into_best(self, policy: &ContainerPolicy) -> Container {
        let kind = policy.choose_kind(self.cardinality(), self.count_runs());
        self.into_kind(kind)
    }

    /// Re-encodes the container in the representation the default policy considers
    /// smallest and returns the resulting kind.
    pub fn run_optimize(&mut self) -> ContainerKind {
        self.run_optimize_with_policy(&ContainerPolicy::DEFAULT)
    }

    pub fn run_optimize_with_policy(&mut self, policy: &ContainerPolicy) -> ContainerKind {
        let this = std::mem::take(self);
        *self = this.into_best(policy);
        if let Container::Run(run) = self {
            run.trim();
        }
        self.kind()
    }

    /// Returns `true` if both containers hold the same values, regardless of
    /// representation.
    pub fn is_equal_to(&self, other: &Container) -> bool {
        match (self, other) {
            (Container::Array(a), Container::Array(b)) => a == b,
            (Container::Bitmap(a), Container::Bitmap(b)) => a == b,
            (Container::Run(a), Container::Run(b)) => a == b,
            _ => self.cardinality() == other.cardinality() && self.spans().eq(other.spans()),
        }
    }

    /// Validates the invariants of the underlying representation.
    ///
    /// # Panics
    ///
    /// Panics if the representation is malformed.
    pub fn check_full_invariants(&self) {
        match self {
            Container::Array(c) => c.check_full_invariants(),
            Container::Bitmap(c) => c.check_full_invariants(),
            Container::Run(c) => c.check_full_invariants(),
        }
    }
}

impl Default for Container {
    fn default() -> Self {
        Container::new()
    }
}

impl From<ArrayContainer> for Container {
    fn from(c: ArrayContainer) -> Self {
        Container::Array(c)
    }
}

impl From<BitmapContainer> for Container {
    fn from(c: BitmapContainer) -> Self {
        Container::Bitmap(c)
    }
}

impl From<RunContainer> for Container {
    fn from(c: RunContainer) -> Self {
        Container::Run(c)
    }
}

/// Ascending iterator over the values of a [`Container`].
#[derive(Clone)]
pub enum ContainerIter<'a> {
    Array(std::iter::Copied<std::slice::Iter<'a, u16>>),
    Bitmap(BitmapIter<'a>),
    Run(RunIter<'a>),
}

impl<'a> Iterator for ContainerIter<'a> {
    type Item = u16;

    #[inline]
    fn next(&mut self) -> Option<u16> {
        match self {
            ContainerIter::Array(it) => it.next(),
            ContainerIter::Bitmap(it) => it.next(),
            ContainerIter::Run(it) => it.next(),
        }
    }
}

impl<'a> std::iter::FusedIterator for ContainerIter<'a> {}

/// Descending iterator over the values of a [`Container`].
#[derive(Clone)]
pub enum ContainerRevIter<'a> {
    Array(std::iter::Rev<std::iter::Copied<std::slice::Iter<'a, u16>>>),
    Bitmap(std::iter::Rev<BitmapIter<'a>>),
    Run(RevRunIter<'a>),
}

impl<'a> Iterator for ContainerRevIter<'a> {
    type Item = u16;

    #[inline]
    fn next(&mut self) -> Option<u16> {
        match self {
            ContainerRevIter::Array(it) => it.next(),
            ContainerRevIter::Bitmap(it) => it.next(),
            ContainerRevIter::Run(it) => it.next(),
        }
    }
}

impl<'a> std::iter::FusedIterator for ContainerRevIter<'a> {}

/// Maximal runs of a [`Container`] as ascending half-open `u32` spans.
#[derive(Clone)]
pub enum ContainerSpans<'a> {
    Array(ArraySpans<'a>),
    Bitmap(BitmapSpans<'a>),
    Run(RunSpans<'a>),
}

impl<'a> Iterator for ContainerSpans<'a> {
    type Item = Range<u32>;

    #[inline]
    fn next(&mut self) -> Option<Range<u32>> {
        match self {
            ContainerSpans::Array(it) => it.next(),
            ContainerSpans::Bitmap(it) => it.next(),
            ContainerSpans::Run(it) => it.next(),
        }
    }
}

impl<'a> std::iter::FusedIterator for ContainerSpans<'a> {}
