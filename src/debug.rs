//! Internal heap-consistency checks.
//!
//! Not part of the public surface — there is deliberately no public
//! heap-check operation. `check_invariants` runs after every completed
//! `Allocator` call unconditionally (see `Allocator::self_check`);
//! `print_heap_stats` is the one piece gated behind the `debug_checks`
//! feature, since it is purely for human inspection.

use crate::align::{bucket_of, NUM_BUCKETS};
use crate::block::{Heap, D};

/// Walks every block from `first_bp` to the zero-size epilogue,
/// checking each block's size and allocation invariants, then walks
/// every bucket checking free-list membership and ordering.
///
/// Panics with a descriptive message on the first violation found; this
/// is a debugging aid, not a recoverable `Result`, in keeping with the
/// "no public heap-check operation" rule above.
pub(crate) fn check_invariants(heap: &Heap, first_bp: u32) {
    unsafe {
        let mut bp = first_bp;
        let mut total = 0u32;
        let mut free_count = 0usize;
        let mut prev_was_free = false;

        loop {
            let size = heap.size(bp);
            if size == 0 {
                break; // epilogue
            }
            assert_eq!(size % D, 0, "block at +{bp} has a non-D-aligned size {size}");
            assert!(size >= 2 * D, "block at +{bp} is smaller than 2D: {size}");

            let allocated = heap.allocated(bp);
            if !allocated {
                assert!(
                    !prev_was_free,
                    "two physically adjacent free blocks at/before +{bp}"
                );
                free_count += 1;
            }
            prev_was_free = !allocated;

            total += size;
            bp = heap.next_block(bp);
        }

        let mut seen_in_buckets = 0usize;
        for bucket in 0..NUM_BUCKETS {
            let mut cursor = heap.bucket_head(bucket);
            let mut last_size = 0u32;
            while cursor != 0 {
                let size = heap.size(cursor);
                assert_eq!(
                    bucket_of(size),
                    bucket,
                    "block at +{cursor} (size {size}) is in bucket {bucket} but belongs in {}",
                    bucket_of(size)
                );
                assert!(
                    size >= last_size,
                    "bucket {bucket} is not sorted ascending at +{cursor}"
                );
                last_size = size;
                seen_in_buckets += 1;
                cursor = heap.next_link(cursor);
            }
        }
        assert_eq!(
            seen_in_buckets, free_count,
            "free block count disagrees between the block walk and the bucket walk"
        );

        let _ = total; // left for a caller that wants to compare against the break
    }
}

/// Prints per-bucket occupancy and the current break, scoped to the
/// whole heap rather than a single allocation.
#[cfg(feature = "debug_checks")]
pub(crate) fn print_heap_stats(heap: &Heap) {
    for bucket in 0..NUM_BUCKETS {
        let mut count = 0usize;
        let mut cursor = unsafe { heap.bucket_head(bucket) };
        while cursor != 0 {
            count += 1;
            cursor = unsafe { heap.next_link(cursor) };
        }
        if count > 0 {
            println!("bucket {bucket}: {count} free block(s)");
        }
    }
    println!("program break = {:?}", crate::substrate::current_break());
}
