//! Binary search over sorted `u16` slices.
//!
//! Values are native `u16`, so the ordering is the unsigned one (0 is the smallest
//! value, 65535 the largest) and no separate comparison helper is needed.

/// Below this many remaining candidates the search finishes with a linear scan.
const LINEAR_SCAN_THRESHOLD: usize = 16;

/// Searches `values` (strictly ascending) for `key`.
///
/// Returns `Ok(index)` on an exact hit, or `Err(insertion_point)` where
/// `insertion_point` is the index at which `key` would have to be inserted to keep
/// the slice sorted. Semantics match `<[u16]>::binary_search` for unique inputs.
#[inline]
pub fn unsigned_binary_search(values: &[u16], key: u16) -> Result<usize, usize> {
    let mut low = 0usize;
    let mut high = values.len();
    while high - low > LINEAR_SCAN_THRESHOLD {
        let mid = low + (high - low) / 2;
        let value = values[mid];
        if value < key {
            low = mid + 1;
        } else if value > key {
            high = mid;
        } else {
            return Ok(mid);
        }
    }
    for (i, &value) in values[low..high].iter().enumerate() {
        if value >= key {
            return if value == key {
                Ok(low + i)
            } else {
                Err(low + i)
            };
        }
    }
    Err(high)
}

/// Returns the index of the last element `<= key`, or `None` when every element is
/// greater than `key` (or the slice is empty).
#[inline]
pub fn preceding_index(values: &[u16], key: u16) -> Option<usize> {
    match unsigned_binary_search(values, key) {
        Ok(index) => Some(index),
        Err(insertion_point) => insertion_point.checked_sub(1),
    }
}

#[cfg(test)]
mod tests {
    use super::{preceding_index, unsigned_binary_search};

    #[test]
    fn matches_std_binary_search() {
        let mut rng = fastrand::Rng::with_seed(7);
        for len in [0usize, 1, 2, 15, 16, 17, 100, 1000] {
            let mut values: Vec<u16> = (0..len).map(|_| rng.u16(..)).collect();
            values.sort_unstable();
            values.dedup();
            for _ in 0..200 {
                let key = rng.u16(..);
                assert_eq!(
                    unsigned_binary_search(&values, key),
                    values.binary_search(&key),
                    "key {key} in {values:?}"
                );
            }
            for &key in &values {
                assert_eq!(
                    unsigned_binary_search(&values, key),
                    values.binary_search(&key)
                );
            }
        }
    }

    #[test]
    fn upper_half_values_order_after_lower_half() {
        // 0x8000 and above must sort after small values.
        let values = [1u16, 0x7fff, 0x8000, 0xfffe, u16::MAX];
        assert_eq!(unsigned_binary_search(&values, 0x8000), Ok(2));
        assert_eq!(unsigned_binary_search(&values, 0x8001), Err(3));
        assert_eq!(unsigned_binary_search(&values, 0), Err(0));
        assert_eq!(unsigned_binary_search(&values, u16::MAX), Ok(4));
    }

    #[test]
    fn preceding_index_cases() {
        let values = [10u16, 20, 30];
        assert_eq!(preceding_index(&values, 5), None);
        assert_eq!(preceding_index(&values, 10), Some(0));
        assert_eq!(preceding_index(&values, 25), Some(1));
        assert_eq!(preceding_index(&values, u16::MAX), Some(2));
        assert_eq!(preceding_index(&[], 1), None);
    }
}
