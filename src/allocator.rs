//! The allocator itself: initialisation, allocation policy, freeing,
//! and in-place reallocation.
//!
//! ```text
//!   malloc(n)
//!     │
//!     ▼
//!   align(n) ──► find_fit(asize) ──hit──► place(bp, asize, exist=true)
//!     │                │
//!     │               miss
//!     │                ▼
//!     │          extend_heap(asize/W) ──► place(bp, asize, exist=true)
//!     ▼
//!   payload pointer
//! ```
//!
//! `extend_heap` and `free` both route their new/freed block through
//! `coalesce::coalesce` in [`coalesce::Mode::Free`], which also does
//! the free-list insertion — callers never call `freelist::insert`
//! directly for those two paths.

use std::ptr;

use crate::align::{self, NUM_BUCKETS};
use crate::block::{Heap, D, W};
use crate::coalesce::{self, Mode};
use crate::debug;
use crate::error::Error;
use crate::freelist;
use crate::substrate;

/// Bytes reserved by [`Allocator::init`] before the first real block:
/// 13 bucket heads, one alignment pad word, a prologue header and
/// footer, and an epilogue header — `17 * W`.
const RESERVED_BYTES: u32 = (NUM_BUCKETS as u32 + 4) * W;
/// `bp` of the prologue sentinel (header at `PAD_END`, size `D`).
const PROLOGUE_BP: u32 = (NUM_BUCKETS as u32 + 2) * W;
/// `bp` of the epilogue sentinel — also the offset of the first byte
/// the allocator will ever hand to [`substrate::grow_heap`] again.
const EPILOGUE_BP: u32 = RESERVED_BYTES;
/// Initial heap extension, matching the 4096-byte chunk size used
/// throughout the component design.
const INITIAL_CHUNK_BYTES: u32 = 4096;

/// A segregated-fit, boundary-tag allocator managing one contiguous,
/// break-grown heap.
///
/// Not thread-safe and not reentrant. Every public method other than
/// [`Allocator::init`] assumes `init` has already succeeded; calling
/// them first is undefined behaviour, matching the "idempotent only if
/// not yet initialised" contract of `init` itself.
pub struct Allocator {
    heap: Option<Heap>,
}

impl Allocator {
    /// Creates an allocator that has not yet reserved any heap memory.
    pub const fn new() -> Self {
        Self { heap: None }
    }

    /// Returns the heap handle by value — `Heap` is just a `Copy`
    /// wrapper around a base pointer, so this decouples every caller
    /// from holding a borrow of `self` while it mutates the heap's
    /// backing memory through raw writes.
    fn heap(&self) -> Heap {
        *self
            .heap
            .as_ref()
            .expect("Allocator::init must succeed before use")
    }

    /// Reserves the 68-byte bucket-head/sentinel prefix and performs
    /// the initial 4096-byte heap extension.
    ///
    /// Idempotent only if the allocator has not yet been initialised;
    /// calling it twice is undefined behaviour.
    pub fn init(&mut self) -> Result<(), Error> {
        let base = substrate::grow_heap(RESERVED_BYTES).ok_or(Error::InitFailed)?;
        let heap = Heap::new(base);
        unsafe {
            for bucket in 0..NUM_BUCKETS {
                heap.set_bucket_head(bucket, 0);
            }
            heap.set_pad(NUM_BUCKETS as u32 * W);
            heap.set_tags(PROLOGUE_BP, D, true);
            heap.set_header_only(EPILOGUE_BP, 0, true);
        }
        self.heap = Some(heap);

        self.extend_heap(INITIAL_CHUNK_BYTES / W)
            .map_err(|_| Error::InitFailed)?;
        Ok(())
    }

    /// Allocates `size` bytes, or returns null if `size` is zero or the
    /// heap cannot grow any further.
    pub fn malloc(&mut self, size: u32) -> *mut u8 {
        if size == 0 {
            return ptr::null_mut();
        }
        let asize = align::align(size);

        let bp = match self.find_fit(asize) {
            Some(bp) => bp,
            None => match self.extend_heap(asize / W) {
                Ok(bp) => bp,
                Err(_) => return ptr::null_mut(),
            },
        };
        self.place(bp, asize, true);
        let ptr = self.heap().payload_ptr(bp);
        self.self_check();
        ptr
    }

    /// Frees a pointer previously returned by `malloc`/`realloc`. `ptr`
    /// must not already be free; double-free is undefined behaviour.
    ///
    /// # Safety
    /// `ptr` must be null or a live allocation from this allocator.
    pub unsafe fn free(&mut self, ptr: *mut u8) {
        if ptr.is_null() {
            return;
        }
        let heap = self.heap();
        unsafe {
            let bp = heap.offset_of(ptr);
            let size = heap.size(bp);
            heap.set_tags(bp, size, false);
            heap.clear_links(bp);
            coalesce::coalesce(&heap, bp, Mode::Free);
        }
        self.self_check();
    }

    /// Resizes a live allocation: shrinks in place, grows in place when
    /// a free physical neighbour reaches the new size, or relocates via
    /// a fresh allocation and copy otherwise.
    ///
    /// # Safety
    /// `ptr` must be null or a live allocation from this allocator.
    pub unsafe fn realloc(&mut self, ptr: *mut u8, size: u32) -> *mut u8 {
        if ptr.is_null() {
            return self.malloc(size);
        }
        if size == 0 {
            unsafe { self.free(ptr) };
            return ptr::null_mut();
        }

        let heap = self.heap();
        let bp = heap.offset_of(ptr);
        let old_size = unsafe { heap.size(bp) };
        let asize = align::align(size);

        if asize == old_size {
            return ptr;
        }

        if asize < old_size {
            self.place(bp, asize, false);
            self.self_check();
            return ptr;
        }

        let merged_bp = coalesce::coalesce(&heap, bp, Mode::Realloc { target: asize });
        let merged_size = unsafe { heap.size(merged_bp) };

        let result = if merged_size >= asize {
            if merged_bp != bp {
                let dst = heap.payload_ptr(merged_bp);
                // A left-merge can make the new block overlap the old
                // payload, so this must tolerate overlap.
                unsafe { ptr::copy(ptr, dst, size as usize) };
                self.place(merged_bp, asize, false);
                dst
            } else {
                self.place(merged_bp, asize, false);
                ptr
            }
        } else {
            let new_ptr = self.malloc(size);
            if new_ptr.is_null() {
                return ptr::null_mut();
            }
            unsafe { ptr::copy_nonoverlapping(ptr, new_ptr, size as usize) };
            unsafe { self.free(ptr) };
            new_ptr
        };
        self.self_check();
        result
    }

    /// First-sufficient search: scans bucket `bucket_of(asize)` upward,
    /// returning the first block whose size is at least `asize`.
    fn find_fit(&self, asize: u32) -> Option<u32> {
        let heap = self.heap();
        unsafe {
            for bucket in align::bucket_of(asize)..NUM_BUCKETS {
                let mut cursor = heap.bucket_head(bucket);
                while cursor != 0 {
                    if heap.size(cursor) >= asize {
                        return Some(cursor);
                    }
                    cursor = heap.next_link(cursor);
                }
            }
        }
        None
    }

    /// Installs an allocation of `asize` bytes inside the free block at
    /// `bp`, splitting off and freeing the tail when it is large enough
    /// to hold a minimal block on its own.
    ///
    /// `existing` must be `true` whenever `bp` is currently on a free
    /// list (the usual case); `realloc`'s shrink-in-place path passes
    /// `false` because its block was never re-inserted after growth.
    fn place(&self, bp: u32, asize: u32, existing: bool) {
        let heap = self.heap();
        unsafe {
            let csize = heap.size(bp);
            if existing {
                freelist::remove(&heap, bp);
            }

            if csize - asize >= 2 * D {
                heap.set_tags(bp, asize, true);
                let remainder_bp = heap.next_block(bp);
                heap.set_tags(remainder_bp, csize - asize, false);
                heap.clear_links(remainder_bp);
                coalesce::coalesce(&heap, remainder_bp, Mode::Free);
            } else {
                heap.set_tags(bp, csize, true);
            }
        }
    }

    /// Extends the heap by exactly `words` words (the advanced
    /// allocator never over-allocates to a fixed chunk size the way a
    /// naive design would), installs a fresh free block there, writes a
    /// new epilogue past it, and coalesces with any trailing free
    /// block.
    fn extend_heap(&self, words: u32) -> Result<u32, Error> {
        let heap = self.heap();
        let size = words * W;
        let raw = substrate::grow_heap(size).ok_or(Error::OutOfMemory)?;
        let bp = heap.offset_of(raw);
        unsafe {
            heap.set_tags(bp, size, false);
            heap.clear_links(bp);
            let new_epilogue = heap.next_block(bp);
            heap.set_header_only(new_epilogue, 0, true);
        }
        Ok(coalesce::coalesce(&heap, bp, Mode::Free))
    }

    /// Walks the whole heap and every bucket chain, asserting spec.md
    /// §8's invariants. Always compiled in — the `debug_checks` feature
    /// only gates [`debug::print_heap_stats`], not this check.
    fn self_check(&self) {
        debug::check_invariants(&self.heap(), PROLOGUE_BP + D);
    }
}

impl Default for Allocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() -> Allocator {
        let mut a = Allocator::new();
        a.init().expect("init should succeed against the real process break");
        a
    }

    #[test]
    fn malloc_zero_returns_null_without_touching_the_heap() {
        let mut a = init();
        assert!(a.malloc(0).is_null());
    }

    #[test]
    fn allocation_is_d_aligned_and_usable() {
        let mut a = init();
        let p = a.malloc(1);
        assert!(!p.is_null());
        assert_eq!((p as usize) % (D as usize), 0);
        unsafe {
            (p as *mut u8).write(0xAB);
            assert_eq!(p.read(), 0xAB);
            a.free(p);
        }
    }

    #[test]
    fn freed_same_class_slot_is_reused_first_fit() {
        let mut a = init();
        let x = a.malloc(24);
        let y = a.malloc(24);
        unsafe { a.free(x) };
        let z = a.malloc(24);
        assert_eq!(z, x);
        unsafe {
            a.free(y);
            a.free(z);
        }
    }

    #[test]
    fn adjacent_frees_coalesce_into_one_larger_block() {
        let mut a = init();
        let x = a.malloc(16);
        let y = a.malloc(16);
        unsafe {
            a.free(x);
            a.free(y);
        }
        // The freed pair must now be reachable as a single block big
        // enough for both originals combined: a fresh request sized
        // to need more than either original slice alone should land in
        // that merged block rather than extending the heap again.
        let merged_home = a.malloc(align::align(16) as u32 + align::align(16) as u32 - (2 * D));
        assert!(!merged_home.is_null());
        unsafe { a.free(merged_home) };
    }

    #[test]
    fn shrink_in_place_keeps_the_same_address() {
        let mut a = init();
        let p = a.malloc(64);
        let q = unsafe { a.realloc(p, 16) };
        assert_eq!(q, p);
        unsafe { a.free(q) };
    }

    #[test]
    fn left_coalesce_growth_relocates_and_preserves_contents() {
        let mut a = init();
        let x = a.malloc(16);
        let y = a.malloc(16);
        unsafe {
            (y as *mut u32).write(0xCAFEF00D);
            a.free(x);
        }
        let grown = unsafe { a.realloc(y, 48) };
        assert_eq!(unsafe { (grown as *mut u32).read() }, 0xCAFEF00D);
        unsafe { a.free(grown) };
    }

    #[test]
    fn realloc_null_behaves_as_malloc() {
        let mut a = init();
        let p = unsafe { a.realloc(ptr::null_mut(), 32) };
        assert!(!p.is_null());
        unsafe { a.free(p) };
    }

    #[test]
    fn realloc_to_zero_frees_and_returns_null() {
        let mut a = init();
        let p = a.malloc(32);
        let q = unsafe { a.realloc(p, 0) };
        assert!(q.is_null());
    }

    #[test]
    fn many_random_alloc_free_cycles_preserve_invariants() {
        let mut a = init();
        let mut live: Vec<*mut u8> = Vec::new();
        let mut state: u32 = 0x1234_5678;
        let mut next_rand = move || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state
        };

        for _ in 0..1000 {
            if live.is_empty() || next_rand() % 2 == 0 {
                let size = 1 + next_rand() % 4096;
                let p = a.malloc(size);
                if !p.is_null() {
                    live.push(p);
                }
            } else {
                let idx = next_rand() as usize % live.len();
                let p = live.swap_remove(idx);
                unsafe { a.free(p) };
            }
        }
        for p in live {
            unsafe { a.free(p) };
        }
    }
}
