//! A single run of consecutive values.

use std::ops::{Range, RangeInclusive};

/// A span of consecutive values `[start, start + length]` (both inclusive).
///
/// `length` counts the values after `start`, so `length == 0` is a single value and
/// the run covers `length + 1` values in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Run {
    pub start: u16,
    pub length: u16,
}

impl Run {
    #[inline]
    pub fn new(start: u16, length: u16) -> Run {
        debug_assert!(
            start as u32 + length as u32 <= u16::MAX as u32,
            "Run ({start}, {length}) exceeds u16 domain"
        );
        Run { start, length }
    }

    #[inline]
    pub fn point(value: u16) -> Run {
        Run {
            start: value,
            length: 0,
        }
    }

    /// Inclusive last value of the run.
    #[inline]
    pub fn end(&self) -> u16 {
        self.start + self.length
    }

    /// Number of values covered by the run.
    #[inline]
    pub fn len(&self) -> usize {
        self.length as usize + 1
    }

    #[inline]
    pub fn contains(&self, value: u16) -> bool {
        value >= self.start && value <= self.end()
    }

    /// Half-open `u32` form `[start, end + 1)`; the end may be `65536`.
    #[inline]
    pub fn as_range_u32(&self) -> Range<u32> {
        self.start as u32..self.end() as u32 + 1
    }

    #[inline]
    pub fn as_inclusive(&self) -> RangeInclusive<u16> {
        self.start..=self.end()
    }

    /// Returns `true` if `next` starts right after this run ends.
    #[inline]
    pub fn is_adjacent(&self, next: Run) -> bool {
        self.end() as u32 + 1 == next.start as u32
    }

    /// Fuses `next` into this run if the two overlap or touch.
    #[inline]
    pub fn coalesce(&self, next: Run) -> Result<Run, (Run, Run)> {
        if self.start <= next.start && next.start as u32 <= self.end() as u32 + 1 {
            let end = self.end().max(next.end());
            Ok(Run {
                start: self.start,
                length: end - self.start,
            })
        } else {
            Err((*self, next))
        }
    }
}

impl From<Range<u32>> for Run {
    #[inline]
    fn from(r: Range<u32>) -> Self {
        debug_assert!(r.start < r.end);
        debug_assert!(r.end <= u16::MAX as u32 + 1);
        Run {
            start: r.start as u16,
            length: (r.end - r.start - 1) as u16,
        }
    }
}

impl From<RangeInclusive<u16>> for Run {
    #[inline]
    fn from(r: RangeInclusive<u16>) -> Self {
        debug_assert!(r.start() <= r.end());
        Run {
            start: *r.start(),
            length: r.end() - r.start(),
        }
    }
}

impl From<Run> for Range<u32> {
    #[inline]
    fn from(run: Run) -> Self {
        run.as_range_u32()
    }
}
