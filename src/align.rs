//! Request-size rounding and size-class (bucket) lookup.

use crate::block::D;

/// Number of segregated free-list buckets.
pub(crate) const NUM_BUCKETS: usize = 13;

/// Upper bound, in bytes, of each bucket's size class except the last,
/// which is unbounded. Sizes 1-3 are powers of two; sizes 4-11 add the
/// 8-byte header/footer overhead to each doubling.
const BUCKET_LIMITS: [u32; NUM_BUCKETS - 1] = [
    8, 16, 32, 72, 136, 264, 520, 1032, 2056, 4104, 8200, 16392,
];

/// Rounds a user request, in bytes, up to an internal block size.
///
/// ```rust,ignore
/// assert_eq!(align(1), 16);    // minimum block: room for two link words
/// assert_eq!(align(16), 24);   // one D above the D..=2D boundary
/// ```
///
/// The `2 * D` floor guarantees every allocated block has room for the
/// two free-list link words once it is eventually freed.
pub(crate) fn align(user_size: u32) -> u32 {
    if user_size <= D {
        2 * D
    } else {
        D * ((user_size + D + (D - 1)) / D)
    }
}

/// Returns the bucket index `0..NUM_BUCKETS` a block of `size` bytes
/// belongs to.
pub(crate) fn bucket_of(size: u32) -> usize {
    BUCKET_LIMITS
        .iter()
        .position(|&limit| size <= limit)
        .unwrap_or(NUM_BUCKETS - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_floors_small_requests() {
        assert_eq!(align(0), 16);
        assert_eq!(align(1), 16);
        assert_eq!(align(8), 16);
    }

    #[test]
    fn align_rounds_up_and_adds_overhead() {
        assert_eq!(align(9), 24);
        assert_eq!(align(16), 24);
        assert_eq!(align(17), 32);
        assert_eq!(align(24), 32);
    }

    #[test]
    fn align_result_is_always_a_multiple_of_d() {
        for n in 0u32..512 {
            assert_eq!(align(n) % D, 0);
            assert!(align(n) >= 2 * D);
        }
    }

    #[test]
    fn bucket_boundaries_match_the_table() {
        assert_eq!(bucket_of(8), 0);
        assert_eq!(bucket_of(9), 1);
        assert_eq!(bucket_of(16), 1);
        assert_eq!(bucket_of(17), 2);
        assert_eq!(bucket_of(16392), 11);
        assert_eq!(bucket_of(16393), 12);
        assert_eq!(bucket_of(1_000_000), 12);
    }

    #[test]
    fn buckets_are_monotonic_in_size() {
        let mut last = 0;
        for n in (8..20000u32).step_by(7) {
            let b = bucket_of(n);
            assert!(b >= last);
            last = b;
        }
    }
}
