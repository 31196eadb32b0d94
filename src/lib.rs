//! # umalloc - A segregated-fit dynamic memory allocator
//!
//! A user-space `malloc`/`free`/`realloc` implementation built on a
//! single break-grown heap, in the style of an advanced systems-course
//! malloc lab: boundary-tagged blocks, segregated free lists, and
//! boundary-tag coalescing, rather than a bare bump pointer.
//!
//! ## Overview
//!
//! ```text
//!   Segregated-fit heap:
//!
//!   ┌───────────────────────────────────────────────────────────────────┐
//!   │                          HEAP MEMORY                              │
//!   │                                                                   │
//!   │  ┌────────────┬────┬──────┬──────┬──────┬───┬──────┬───────────┐  │
//!   │  │ 13 bucket  │pad │ prlg │ blk  │ blk  │...│ blk  │ epilogue  │  │
//!   │  │   heads    │    │      │      │      │   │      │ (size 0)  │  │
//!   │  └────────────┴────┴──────┴──────┴──────┴───┴──────┴───────────┘  │
//!   │   68 bytes reserved        ▲                              ▲       │
//!   │                            │                              │       │
//!   │                      first real block                 program    │
//!   │                                                          break    │
//!   └───────────────────────────────────────────────────────────────────┘
//!
//!   Each bucket head anchors an ascending-size-sorted chain of free
//!   blocks. `malloc` walks buckets from the requested size's class
//!   upward and takes the first block large enough; `free` merges a
//!   block with its physically adjacent neighbours before reinserting
//!   it.
//! ```
//!
//! ## Crate structure
//!
//! ```text
//!   umalloc
//!   ├── align      - request-size rounding and bucket classification
//!   ├── block      - boundary-tag layout, raw heap access
//!   ├── freelist   - segregated free-list insert/remove
//!   ├── coalesce   - boundary-tag merging (free and in-place-growth modes)
//!   ├── substrate  - the sbrk(2) break primitive
//!   ├── error      - the allocator's error taxonomy
//!   ├── debug      - internal invariant checks (stats gated by `debug_checks`)
//!   ├── allocator  - Allocator: init/malloc/free/realloc
//!   └── ffi        - the C-ABI surface (umalloc_init/malloc/free/realloc)
//! ```
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use umalloc::Allocator;
//!
//! let mut a = Allocator::new();
//! a.init().expect("heap reservation failed");
//!
//! unsafe {
//!     let p = a.malloc(64) as *mut u64;
//!     *p = 42;
//!     let p = a.realloc(p as *mut u8, 128) as *mut u64;
//!     a.free(p as *mut u8);
//! }
//! ```
//!
//! ## How it works
//!
//! Growth happens through `sbrk(2)`, same as a plain bump allocator:
//!
//! ```text
//!   Program Memory Layout:
//!
//!   High Address ┌─────────────────────┐
//!                │       Stack         │ ↓ grows down
//!                │         │           │
//!                │         ▼           │
//!                │                     │
//!                │         ▲           │
//!                │         │           │
//!                │       Heap          │ ↑ grows up (sbrk)
//!                ├─────────────────────┤ ← Program Break
//!                │   Uninitialized     │
//!                │       Data          │
//!                ├─────────────────────┤
//!                │   Initialized       │
//!                │       Data          │
//!                ├─────────────────────┤
//!                │       Text          │
//!   Low Address  └─────────────────────┘
//! ```
//!
//! The difference from a bump allocator is what happens on `free`:
//! every freed block is boundary-tag coalesced with its neighbours and
//! spliced into the segregated free list for its size class, so later
//! allocations can reuse any freed region, not just the heap's tail.
//!
//! ## Features
//!
//! - **First-fit segregated search**: scans size-class buckets from the
//!   request's own class upward.
//! - **Boundary-tag coalescing**: adjacent free blocks merge on both
//!   `free` and in-place `realloc` growth.
//! - **Directional in-place realloc**: grows into a free neighbour
//!   before ever relocating.
//! - **`debug_checks` feature**: opt-in heap-occupancy printing, on top
//!   of invariant checks the crate always runs in its own tests.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: no synchronization primitives; see
//!   [`Allocator`]'s own documentation.
//! - **One heap per process image** when used through [`ffi`]: the
//!   C-ABI surface holds a single static allocator instance.
//! - **Unix-only**: requires `libc` and `sbrk` (POSIX systems).
//!
//! ## Safety
//!
//! This crate manages raw memory directly. `free` and `realloc` require
//! `unsafe` blocks because passing a pointer that did not come from
//! this allocator, or freeing one twice, is undefined behaviour.

pub mod align;
mod allocator;
mod block;
mod coalesce;
mod debug;
pub mod error;
pub mod ffi;
mod freelist;
mod substrate;

pub use allocator::Allocator;
pub use error::Error;
