//! Boolean set algebra between containers of any representation.
//!
//! Operands are read as ascending span sequences and merged with
//! [`merge_spans`](crate::set_ops::merge_spans); the result is materialized in the
//! representation the [`ContainerPolicy`] picks for its cardinality and run count.
//! Two bitmaps are combined word by word instead.

use std::ops::Range;

use crate::{
    bitmap::BitmapContainer,
    container::{Container, ContainerKind},
    policy::ContainerPolicy,
    run::Run,
    run_container::RunContainer,
    set_ops::{SetOp, flip_range, merge_spans},
};

impl Container {
    /// Combines `self` with `other` under `op`, leaving both inputs untouched.
    pub fn combine(&self, other: &Container, op: SetOp, policy: &ContainerPolicy) -> Container {
        match (self, other) {
            (Container::Bitmap(a), Container::Bitmap(b)) => combine_bitmaps(a, b, op, policy),
            (Container::Run(run), _) => run.combine(other, op, policy),
            _ => Container::from_spans(merge_spans(op, self.spans(), other.spans()), policy),
        }
    }

    pub fn and(&self, other: &Container) -> Container {
        self.combine(other, SetOp::And, &ContainerPolicy::DEFAULT)
    }

    pub fn or(&self, other: &Container) -> Container {
        self.combine(other, SetOp::Or, &ContainerPolicy::DEFAULT)
    }

    pub fn xor(&self, other: &Container) -> Container {
        self.combine(other, SetOp::Xor, &ContainerPolicy::DEFAULT)
    }

    pub fn and_not(&self, other: &Container) -> Container {
        self.combine(other, SetOp::AndNot, &ContainerPolicy::DEFAULT)
    }

    /// Replaces `self` with `self op other`.
    ///
    /// A run container whose result stays in run form is rewritten in its own
    /// buffer; any other result is computed in full and then swapped in, so `self`
    /// is never left half-updated.
    pub fn combine_in_place(&mut self, other: &Container, op: SetOp, policy: &ContainerPolicy) {
        let this = std::mem::take(self);
        *self = match this {
            Container::Run(run) => run.combine_into(other, op, policy),
            this => this.combine(other, op, policy),
        };
    }

    pub fn iand(&mut self, other: &Container) {
        self.combine_in_place(other, SetOp::And, &ContainerPolicy::DEFAULT);
    }

    pub fn ior(&mut self, other: &Container) {
        self.combine_in_place(other, SetOp::Or, &ContainerPolicy::DEFAULT);
    }

    pub fn ixor(&mut self, other: &Container) {
        self.combine_in_place(other, SetOp::Xor, &ContainerPolicy::DEFAULT);
    }

    pub fn iand_not(&mut self, other: &Container) {
        self.combine_in_place(other, SetOp::AndNot, &ContainerPolicy::DEFAULT);
    }

    /// Complements the values inside the half-open `range`; values outside it are
    /// kept as they are.
    ///
    /// # Panics
    ///
    /// Panics if `range` is reversed or ends past `65536`.
    pub fn not(&self, range: Range<u32>) -> Container {
        self.not_with_policy(range, &ContainerPolicy::DEFAULT)
    }

    pub fn not_with_policy(&self, range: Range<u32>, policy: &ContainerPolicy) -> Container {
        check_flip_range(&range);
        match self {
            Container::Bitmap(bitmap) => {
                let mut flipped = bitmap.clone();
                flipped.flip_range(range);
                Container::Bitmap(flipped).into_best(policy)
            }
            _ => Container::from_spans(flip_range(self.spans(), range), policy),
        }
    }

    /// Complements the values inside `range` in place.
    pub fn inot(&mut self, range: Range<u32>) {
        check_flip_range(&range);
        let this = std::mem::take(self);
        *self = match this {
            Container::Run(run) => run.inot(range),
            Container::Bitmap(mut bitmap) => {
                bitmap.flip_range(range);
                Container::Bitmap(bitmap).into_best(&ContainerPolicy::DEFAULT)
            }
            this => this.not(range),
        };
    }
}

impl RunContainer {
    /// Combines this run container with a container of any representation.
    pub fn combine(&self, other: &Container, op: SetOp, policy: &ContainerPolicy) -> Container {
        Container::from_spans(merge_spans(op, self.spans(), other.spans()), policy)
    }

    pub fn and(&self, other: &Container) -> Container {
        self.combine(other, SetOp::And, &ContainerPolicy::DEFAULT)
    }

    pub fn or(&self, other: &Container) -> Container {
        self.combine(other, SetOp::Or, &ContainerPolicy::DEFAULT)
    }

    pub fn xor(&self, other: &Container) -> Container {
        self.combine(other, SetOp::Xor, &ContainerPolicy::DEFAULT)
    }

    pub fn and_not(&self, other: &Container) -> Container {
        self.combine(other, SetOp::AndNot, &ContainerPolicy::DEFAULT)
    }

    /// Consumes the container and returns `self op other`, reusing the run buffer
    /// when the result stays in run form.
    pub fn combine_into(
        self,
        other: &Container,
        op: SetOp,
        policy: &ContainerPolicy,
    ) -> Container {
        let runs = merge_spans(op, self.spans(), other.spans())
            .map(Run::from)
            .collect::<Vec<_>>();
        self.assign_result(runs, policy)
    }

    pub fn iand(self, other: &Container) -> Container {
        self.combine_into(other, SetOp::And, &ContainerPolicy::DEFAULT)
    }

    pub fn ior(self, other: &Container) -> Container {
        self.combine_into(other, SetOp::Or, &ContainerPolicy::DEFAULT)
    }

    pub fn ixor(self, other: &Container) -> Container {
        self.combine_into(other, SetOp::Xor, &ContainerPolicy::DEFAULT)
    }

    pub fn iand_not(self, other: &Container) -> Container {
        self.combine_into(other, SetOp::AndNot, &ContainerPolicy::DEFAULT)
    }

    /// Complements the values inside the half-open `range`.
    ///
    /// # Panics
    ///
    /// Panics if `range` is reversed or ends past `65536`.
    pub fn not(&self, range: Range<u32>) -> Container {
        check_flip_range(&range);
        Container::from_spans(flip_range(self.spans(), range), &ContainerPolicy::DEFAULT)
    }

    /// Consumes the container and complements the values inside `range`, reusing the
    /// run buffer when the result stays in run form.
    pub fn inot(self, range: Range<u32>) -> Container {
        check_flip_range(&range);
        let runs = flip_range(self.spans(), range)
            .map(Run::from)
            .collect::<Vec<_>>();
        self.assign_result(runs, &ContainerPolicy::DEFAULT)
    }

    fn assign_result(mut self, runs: Vec<Run>, policy: &ContainerPolicy) -> Container {
        let cardinality = runs.iter().map(Run::len).sum::<usize>();
        match policy.choose_kind(cardinality, runs.len()) {
            ContainerKind::Run => {
                self.assign_runs(&runs);
                Container::Run(self)
            }
            kind => {
                log::trace!(
                    "run container result of {cardinality} values in {} runs stored as {kind:?}",
                    runs.len()
                );
                Container::from_runs_as(kind, &runs, cardinality)
            }
        }
    }
}

fn combine_bitmaps(
    a: &BitmapContainer,
    b: &BitmapContainer,
    op: SetOp,
    policy: &ContainerPolicy,
) -> Container {
    let f: fn(u64, u64) -> u64 = match op {
        SetOp::And => |l, r| l & r,
        SetOp::Or => |l, r| l | r,
        SetOp::Xor => |l, r| l ^ r,
        SetOp::AndNot => |l, r| l & !r,
    };
    Container::Bitmap(a.combine(b, f)).into_best(policy)
}

#[inline]
fn check_flip_range(range: &Range<u32>) {
    assert!(
        range.start <= range.end && range.end <= u16::MAX as u32 + 1,
        "Invalid flip range {range:?}"
    );
}

impl std::ops::BitAnd for &Container {
    type Output = Container;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl std::ops::BitOr for &Container {
    type Output = Container;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

impl std::ops::BitXor for &Container {
    type Output = Container;

    fn bitxor(self, rhs: Self) -> Self::Output {
        self.xor(rhs)
    }
}

impl std::ops::Sub for &Container {
    type Output = Container;

    fn sub(self, rhs: Self) -> Self::Output {
        self.and_not(rhs)
    }
}

impl std::ops::Not for &Container {
    type Output = Container;

    /// Complement over the whole chunk.
    fn not(self) -> Self::Output {
        Container::not(self, 0..u16::MAX as u32 + 1)
    }
}
