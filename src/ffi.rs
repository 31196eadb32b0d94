//! C-ABI surface for embedding the allocator outside a Rust binary.
//!
//! Exposes a four-function contract: `init` returns `0`/`-1`,
//! `malloc`/`realloc` return an address or a null pointer, `free`
//! returns nothing. There is exactly one allocator instance behind this
//! surface, single-threaded and single-arena, held in a `static mut` the
//! way a freestanding C caller expects a single hidden global heap.
//!
//! # Safety
//! None of these functions synchronize; calling any of them from more
//! than one thread, or calling `umalloc_free`/`umalloc_realloc` with a
//! pointer that did not come from `umalloc_malloc`/`umalloc_realloc` on
//! this same instance, is undefined behaviour.

use std::ptr;

use crate::allocator::Allocator;

static mut ALLOCATOR: Allocator = Allocator::new();

/// Reserves the heap prefix and performs the first chunk extension.
/// Returns `0` on success, `-1` if the substrate refused to grow the
/// heap.
#[unsafe(no_mangle)]
pub extern "C" fn umalloc_init() -> i32 {
    let allocator = unsafe { &mut *ptr::addr_of_mut!(ALLOCATOR) };
    match allocator.init() {
        Ok(()) => 0,
        Err(_) => -1,
    }
}

/// Allocates `size` bytes, or returns a null pointer if `size` is zero
/// or the heap cannot grow further.
#[unsafe(no_mangle)]
pub extern "C" fn umalloc_malloc(size: u32) -> *mut u8 {
    let allocator = unsafe { &mut *ptr::addr_of_mut!(ALLOCATOR) };
    allocator.malloc(size)
}

/// Frees a pointer previously returned by `umalloc_malloc` or
/// `umalloc_realloc`. A null pointer is a no-op.
///
/// # Safety
/// `ptr` must be null or a live allocation from this same instance.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn umalloc_free(ptr: *mut u8) {
    let allocator = unsafe { &mut *core::ptr::addr_of_mut!(ALLOCATOR) };
    unsafe { allocator.free(ptr) };
}

/// Resizes a live allocation, shrinking, growing in place, or
/// relocating as needed.
///
/// # Safety
/// `ptr` must be null or a live allocation from this same instance.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn umalloc_realloc(ptr: *mut u8, size: u32) -> *mut u8 {
    let allocator = unsafe { &mut *core::ptr::addr_of_mut!(ALLOCATOR) };
    unsafe { allocator.realloc(ptr, size) }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These tests share the single static ALLOCATOR and the real
    // process break with every other test in the crate, so they only
    // assert relative behaviour, never absolute addresses.
    #[test]
    fn round_trip_through_the_c_abi() {
        assert_eq!(umalloc_init(), 0);
        let p = umalloc_malloc(64);
        assert!(!p.is_null());
        unsafe {
            p.write(7);
            let q = umalloc_realloc(p, 128);
            assert!(!q.is_null());
            assert_eq!(q.read(), 7);
            umalloc_free(q);
        }
    }

    #[test]
    fn malloc_zero_is_null_through_the_c_abi() {
        assert!(umalloc_malloc(0).is_null());
    }
}
