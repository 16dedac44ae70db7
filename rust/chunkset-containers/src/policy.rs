//! Representation selection for container results.

use chunkset_common::{Result, verify_arg};

use crate::container::ContainerKind;

/// Thresholds deciding which representation a container result takes.
///
/// Sizes compared, in bytes: a run container costs `2 + 4 * runs`, an array
/// `2 + 2 * cardinality` and a bitmap a fixed 8192.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerPolicy {
    array_max_cardinality: usize,
    prefer_runs: bool,
}

impl ContainerPolicy {
    /// Default largest cardinality kept in array form.
    pub const DEFAULT_ARRAY_MAX_CARDINALITY: usize = 4096;

    /// Upper bound for `array_max_cardinality`: past it an array would be larger
    /// than a bitmap several times over.
    pub const MAX_ARRAY_MAX_CARDINALITY: usize = 32768;

    pub const DEFAULT: ContainerPolicy = ContainerPolicy {
        array_max_cardinality: Self::DEFAULT_ARRAY_MAX_CARDINALITY,
        prefer_runs: true,
    };

    /// Creates a policy.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `array_max_cardinality` is zero or exceeds
    /// [`Self::MAX_ARRAY_MAX_CARDINALITY`].
    pub fn new(array_max_cardinality: usize, prefer_runs: bool) -> Result<ContainerPolicy> {
        verify_arg!(array_max_cardinality, array_max_cardinality > 0);
        verify_arg!(
            array_max_cardinality,
            array_max_cardinality <= Self::MAX_ARRAY_MAX_CARDINALITY
        );
        Ok(ContainerPolicy {
            array_max_cardinality,
            prefer_runs,
        })
    }

    /// Largest cardinality kept in array form.
    pub fn array_max_cardinality(&self) -> usize {
        self.array_max_cardinality
    }

    /// Whether run form may be chosen at all.
    pub fn prefer_runs(&self) -> bool {
        self.prefer_runs
    }

    /// Picks the representation for a set of `cardinality` values forming
    /// `run_count` maximal runs.
    ///
    /// Run form wins when allowed and strictly smallest; otherwise the set is an
    /// array up to `array_max_cardinality` values and a bitmap beyond. An empty set
    /// is always an array.
    pub fn choose_kind(&self, cardinality: usize, run_count: usize) -> ContainerKind {
        if cardinality == 0 {
            return ContainerKind::Array;
        }
        let array_or_bitmap = if cardinality <= self.array_max_cardinality {
            ContainerKind::Array
        } else {
            ContainerKind::Bitmap
        };
        if self.prefer_runs {
            let run_size = run_size_in_bytes(run_count);
            let other_size = match array_or_bitmap {
                ContainerKind::Array => array_size_in_bytes(cardinality),
                _ => BITMAP_SIZE_IN_BYTES,
            };
            if run_size < other_size {
                return ContainerKind::Run;
            }
        }
        array_or_bitmap
    }
}

impl Default for ContainerPolicy {
    fn default() -> Self {
        ContainerPolicy::DEFAULT
    }
}

const BITMAP_SIZE_IN_BYTES: usize = 8192;

#[inline]
fn run_size_in_bytes(run_count: usize) -> usize {
    2 + 4 * run_count
}

#[inline]
fn array_size_in_bytes(cardinality: usize) -> usize {
    2 + 2 * cardinality
}

#[cfg(test)]
mod tests {
    use super::ContainerPolicy;
    use crate::container::ContainerKind;

    #[test]
    fn rejects_out_of_range_thresholds() {
        assert!(ContainerPolicy::new(0, true).is_err());
        assert!(ContainerPolicy::new(32769, true).is_err());
        let policy = ContainerPolicy::new(100, false).unwrap();
        assert_eq!(policy.array_max_cardinality(), 100);
        assert!(!policy.prefer_runs());
        assert_eq!(ContainerPolicy::default(), ContainerPolicy::DEFAULT);
    }

    #[test]
    fn choose_kind_by_size() {
        let policy = ContainerPolicy::DEFAULT;
        assert_eq!(policy.choose_kind(0, 0), ContainerKind::Array);
        // One long run beats everything.
        assert_eq!(policy.choose_kind(1000, 1), ContainerKind::Run);
        assert_eq!(policy.choose_kind(60000, 1), ContainerKind::Run);
        // Scattered values: run form costs twice the array form.
        assert_eq!(policy.choose_kind(100, 100), ContainerKind::Array);
        assert_eq!(policy.choose_kind(10000, 10000), ContainerKind::Bitmap);
        // Ties go to the non-run form: 2 + 4 * 2 == 2 + 2 * 4.
        assert_eq!(policy.choose_kind(4, 2), ContainerKind::Array);
        // Array/bitmap boundary.
        assert_eq!(policy.choose_kind(4096, 4096), ContainerKind::Array);
        assert_eq!(policy.choose_kind(4097, 4097), ContainerKind::Bitmap);
    }

    #[test]
    fn runs_disabled() {
        let policy = ContainerPolicy::new(4096, false).unwrap();
        assert_eq!(policy.choose_kind(1000, 1), ContainerKind::Array);
        assert_eq!(policy.choose_kind(60000, 1), ContainerKind::Bitmap);
    }
}
