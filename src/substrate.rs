//! The break primitive the allocator is built on.
//!
//! `grow_heap` is the crate's single call site for extending the
//! process heap: it wraps `sbrk(2)`, checking for the POSIX `(void *)
//! -1` failure sentinel.

use libc::{c_void, intptr_t, sbrk};

/// Extends the process heap by exactly `n` bytes and returns the
/// address of the first new byte, or `None` if the kernel refused.
///
/// `n` is always a word-aligned size chosen by the caller (see
/// [`crate::align`]); this function does not itself round or validate
/// it.
pub(crate) fn grow_heap(n: u32) -> Option<*mut u8> {
    let addr = unsafe { sbrk(n as intptr_t) };
    if addr as *mut c_void == usize::MAX as *mut c_void {
        None
    } else {
        Some(addr as *mut u8)
    }
}

/// Current program break, for diagnostics only (see [`crate::debug`]).
pub(crate) fn current_break() -> *mut u8 {
    unsafe { sbrk(0) as *mut u8 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grow_heap_extends_the_break_monotonically() {
        let before = current_break();
        let got = grow_heap(64);
        assert!(got.is_some());
        let after = current_break();
        assert!((after as usize) >= (before as usize) + 64);
    }
}
