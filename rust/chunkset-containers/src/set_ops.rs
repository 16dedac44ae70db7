//! Streaming boolean algebra over ascending sequences of disjoint spans.
//!
//! Every container exposes its contents as half-open `Range<u32>` spans inside
//! `[0, 65536)`: runs map directly, a sparse array yields its maximal stretches of
//! consecutive values, and a bitmap yields its runs of set bits. [`SpanMerge`] walks
//! two such sequences with one cursor each, cuts them into elementary pieces at every
//! boundary of either side, and keeps the pieces selected by the [`SetOp`].

use std::ops::Range;

/// Boolean operation applied by [`SpanMerge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetOp {
    /// Values present in both inputs.
    And,
    /// Values present in either input.
    Or,
    /// Values present in exactly one input.
    Xor,
    /// Values present in the left input only.
    AndNot,
}

impl SetOp {
    #[inline]
    pub fn keep(self, in_left: bool, in_right: bool) -> bool {
        match self {
            SetOp::And => in_left && in_right,
            SetOp::Or => in_left || in_right,
            SetOp::Xor => in_left != in_right,
            SetOp::AndNot => in_left && !in_right,
        }
    }
}

/// Merges two ascending, non-overlapping span sequences under `op`.
///
/// Inputs may contain adjacent spans; empty spans are skipped. The output is
/// ascending, never overlapping, and adjacent output pieces are fused, so every
/// yielded span is maximal.
///
/// Complexity: O(len(left) + len(right)), constant extra memory.
pub fn merge_spans<L, R>(op: SetOp, left: L, right: R) -> SpanMerge<L::IntoIter, R::IntoIter>
where
    L: IntoIterator<Item = Range<u32>>,
    R: IntoIterator<Item = Range<u32>>,
{
    SpanMerge::new(op, left.into_iter(), right.into_iter())
}

/// Flips every value of `range` relative to `spans`: values of `spans` inside
/// `range` are dropped, gaps inside `range` are added, everything outside `range`
/// passes through unchanged.
pub fn flip_range<I>(
    spans: I,
    range: Range<u32>,
) -> SpanMerge<I::IntoIter, std::iter::Once<Range<u32>>>
where
    I: IntoIterator<Item = Range<u32>>,
{
    merge_spans(SetOp::Xor, spans, std::iter::once(range))
}

/// Iterator adapter implementing [`merge_spans`].
pub struct SpanMerge<I, J>
where
    I: Iterator<Item = Range<u32>>,
    J: Iterator<Item = Range<u32>>,
{
    op: SetOp,
    left: I,
    right: J,
    cur_left: Option<Range<u32>>,
    cur_right: Option<Range<u32>>,
    pending: Option<Range<u32>>,
}

impl<I, J> SpanMerge<I, J>
where
    I: Iterator<Item = Range<u32>>,
    J: Iterator<Item = Range<u32>>,
{
    pub fn new(op: SetOp, mut left: I, mut right: J) -> Self {
        let cur_left = next_non_empty(&mut left);
        let cur_right = next_non_empty(&mut right);
        SpanMerge {
            op,
            left,
            right,
            cur_left,
            cur_right,
            pending: None,
        }
    }

    /// Cuts the next elementary piece off the front of the two cursors and reports
    /// which inputs cover it.
    fn next_piece(&mut self) -> Option<(Range<u32>, bool, bool)> {
        let left_done = self.cur_left.is_none();
        let right_done = self.cur_right.is_none();
        match self.op {
            SetOp::And if left_done || right_done => return None,
            SetOp::AndNot if left_done => return None,
            _ => (),
        }

        match (self.cur_left.clone(), self.cur_right.clone()) {
            (None, None) => None,
            (Some(l), None) => {
                self.cur_left = next_non_empty(&mut self.left);
                Some((l, true, false))
            }
            (None, Some(r)) => {
                self.cur_right = next_non_empty(&mut self.right);
                Some((r, false, true))
            }
            (Some(l), Some(r)) => {
                if l.start < r.start {
                    let end = l.end.min(r.start);
                    self.advance_left(end);
                    Some((l.start..end, true, false))
                } else if r.start < l.start {
                    let end = r.end.min(l.start);
                    self.advance_right(end);
                    Some((r.start..end, false, true))
                } else {
                    let end = l.end.min(r.end);
                    self.advance_left(end);
                    self.advance_right(end);
                    Some((l.start..end, true, true))
                }
            }
        }
    }

    #[inline]
    fn advance_left(&mut self, to: u32) {
        if let Some(cur) = &mut self.cur_left {
            cur.start = to;
            if cur.start >= cur.end {
                self.cur_left = next_non_empty(&mut self.left);
            }
        }
    }

    #[inline]
    fn advance_right(&mut self, to: u32) {
        if let Some(cur) = &mut self.cur_right {
            cur.start = to;
            if cur.start >= cur.end {
                self.cur_right = next_non_empty(&mut self.right);
            }
        }
    }
}

impl<I, J> Iterator for SpanMerge<I, J>
where
    I: Iterator<Item = Range<u32>>,
    J: Iterator<Item = Range<u32>>,
{
    type Item = Range<u32>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some((piece, in_left, in_right)) = self.next_piece() else {
                return self.pending.take();
            };
            if !self.op.keep(in_left, in_right) {
                continue;
            }
            if let Some(pending) = &mut self.pending {
                if pending.end == piece.start {
                    pending.end = piece.end;
                    continue;
                }
                return self.pending.replace(piece);
            }
            self.pending = Some(piece);
        }
    }
}

impl<I, J> std::iter::FusedIterator for SpanMerge<I, J>
where
    I: std::iter::FusedIterator<Item = Range<u32>>,
    J: std::iter::FusedIterator<Item = Range<u32>>,
{
}

#[inline]
fn next_non_empty<I: Iterator<Item = Range<u32>>>(it: &mut I) -> Option<Range<u32>> {
    it.find(|r| r.start < r.end)
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeSet, ops::Range};

    use super::{SetOp, flip_range, merge_spans};

    fn collect(op: SetOp, a: Vec<Range<u32>>, b: Vec<Range<u32>>) -> Vec<Range<u32>> {
        merge_spans(op, a, b).collect()
    }

    fn to_set(spans: &[Range<u32>]) -> BTreeSet<u32> {
        spans.iter().cloned().flatten().collect()
    }

    fn random_spans(rng: &mut fastrand::Rng, limit: u32) -> Vec<Range<u32>> {
        let mut spans = Vec::new();
        let mut pos = rng.u32(0..16);
        while pos < limit {
            let end = (pos + rng.u32(1..12)).min(limit);
            spans.push(pos..end);
            // Gaps of zero keep adjacent input spans in the mix.
            pos = end + rng.u32(0..10);
        }
        spans
    }

    #[test]
    fn empty_inputs() {
        for op in [SetOp::And, SetOp::Or, SetOp::Xor, SetOp::AndNot] {
            assert!(collect(op, vec![], vec![]).is_empty());
        }
        assert_eq!(collect(SetOp::Or, vec![0..5], vec![]), vec![0..5]);
        assert!(collect(SetOp::And, vec![0..5], vec![]).is_empty());
        assert_eq!(collect(SetOp::AndNot, vec![0..5], vec![]), vec![0..5]);
        assert!(collect(SetOp::AndNot, vec![], vec![0..5]).is_empty());
        assert_eq!(collect(SetOp::Xor, vec![], vec![0..5]), vec![0..5]);
    }

    #[test]
    fn intersection_overlap_complex() {
        let a = vec![100..105, 107..112, 115..118];
        let b = vec![102..108, 110..116];
        assert_eq!(
            collect(SetOp::And, a, b),
            vec![102..105, 107..108, 110..112, 115..116]
        );
    }

    #[test]
    fn union_fuses_adjacent_across_sides() {
        let a = vec![100..105, 108..110];
        let b = vec![102..103, 105..108, 110..115];
        assert_eq!(collect(SetOp::Or, a, b), vec![100..115]);
    }

    #[test]
    fn xor_and_difference() {
        let a = vec![0..10, 20..30];
        let b = vec![5..25];
        assert_eq!(
            collect(SetOp::Xor, a.clone(), b.clone()),
            vec![0..5, 10..20, 25..30]
        );
        assert_eq!(
            collect(SetOp::AndNot, a.clone(), b.clone()),
            vec![0..5, 25..30]
        );
        assert_eq!(collect(SetOp::AndNot, b, a), vec![10..20]);
    }

    #[test]
    fn xor_of_identical_inputs_is_empty() {
        let a = vec![0..1, 3..9, 65000..65536];
        assert!(collect(SetOp::Xor, a.clone(), a).is_empty());
    }

    #[test]
    fn adjacent_inputs_within_one_side_are_fused() {
        assert_eq!(collect(SetOp::Or, vec![0..5, 5..10], vec![]), vec![0..10]);
        assert_eq!(
            collect(SetOp::Xor, vec![0..5, 5..10], vec![20..21]),
            vec![0..10, 20..21]
        );
    }

    #[test]
    fn flip_range_touches_only_the_range() {
        let spans = vec![0..4, 10..20, 30..40];
        assert_eq!(
            flip_range(spans, 2..35).collect::<Vec<_>>(),
            vec![0..2, 4..10, 20..30, 35..40]
        );
        assert_eq!(
            flip_range(vec![], 0..65536).collect::<Vec<_>>(),
            vec![0..65536]
        );
        assert_eq!(flip_range(vec![0..65536], 0..65536).count(), 0);
        assert_eq!(flip_range(vec![1..3], 5..5).collect::<Vec<_>>(), vec![1..3]);
    }

    #[test]
    fn randomized_against_sets() {
        let mut rng = fastrand::Rng::with_seed(42);
        for _ in 0..200 {
            let a = random_spans(&mut rng, 300);
            let b = random_spans(&mut rng, 300);
            let (sa, sb) = (to_set(&a), to_set(&b));
            let cases = [
                (SetOp::And, sa.intersection(&sb).copied().collect::<BTreeSet<_>>()),
                (SetOp::Or, sa.union(&sb).copied().collect()),
                (SetOp::Xor, sa.symmetric_difference(&sb).copied().collect()),
                (SetOp::AndNot, sa.difference(&sb).copied().collect()),
            ];
            for (op, expected) in cases {
                let out = collect(op, a.clone(), b.clone());
                assert_eq!(to_set(&out), expected, "{op:?} of {a:?} and {b:?}");
                for pair in out.windows(2) {
                    assert!(pair[0].end < pair[1].start, "{op:?} not maximal: {out:?}");
                }
            }
        }
    }
}
