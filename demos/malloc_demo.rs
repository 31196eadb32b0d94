use std::io::Read;

use libc::sbrk;
use umalloc::Allocator;

/// Waits until the user presses ENTER.
/// Useful when you want to inspect memory state with tools like `pmap`, `htop`,
/// `gdb`, or just visually track how allocations change the program break.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

/// Prints the current program break using `sbrk(0)`.
/// The program break is the upper boundary of the heap managed via brk/sbrk.
unsafe fn print_program_break(label: &str) {
  println!(
    "[{}] PID = {}, program break (sbrk(0)) = {:?}",
    label,
    std::process::id(),
    unsafe { sbrk(0) },
  );
}

fn main() {
  // Our segregated-fit allocator. It holds nothing but the base address
  // of the heap it reserved; buckets, headers and footers all live in
  // that heap memory rather than in this struct.
  let mut allocator = Allocator::new();

  unsafe {
    print_program_break("start");
    allocator.init().expect("heap reservation failed");
    print_program_break("after init");
    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 1) Allocate 4 bytes, enough for a u32.
    // --------------------------------------------------------------------
    let first_block = allocator.malloc(4);
    println!("\n[1] Allocate 4 bytes -> {:?}", first_block);

    let first_ptr = first_block as *mut u32;
    first_ptr.write(0xDEADBEEF);
    println!("[1] Value written to first_block = 0x{:X}", first_ptr.read());

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 2) Allocate 12 bytes.
    //    Shows the allocator rounding an odd-sized request up to its
    //    double-word block size.
    // --------------------------------------------------------------------
    let second_block = allocator.malloc(12);
    println!("\n[2] Allocate 12 bytes -> {:?}", second_block);
    std::ptr::write_bytes(second_block, 0xAB, 12);
    println!("[2] Initialized second block with 0xAB");

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 3) Allocate 8 bytes, enough for a u64, and check alignment.
    // --------------------------------------------------------------------
    let third_block = allocator.malloc(8);
    println!("\n[3] Allocate 8 bytes -> {:?}", third_block);

    let third_ptr = third_block as *mut u64;
    third_ptr.write(0x1122334455667788);
    println!("[3] Value written = 0x{:X}", third_ptr.read());
    println!(
      "[3] Address = {:#X}, addr % 8 = {}",
      third_block as usize,
      third_block as usize % 8
    );

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 4) Allocate an array of 16 u16s (32 bytes).
    // --------------------------------------------------------------------
    let fourth_block = allocator.malloc(32);
    println!("\n[4] Allocate 32 bytes -> {:?}", fourth_block);

    let fourth_ptr = fourth_block as *mut u16;
    for i in 0..16 {
      fourth_ptr.add(i).write(i as u16);
    }
    println!("[4] Wrote 0..15 into the u16 array");

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 5) Free the first block.
    //
    //    Unlike a pure bump allocator, this coalesces the freed block
    //    with any free physical neighbour and splices the result into
    //    its segregated free list — it does not need to be the most
    //    recent allocation, and it is not lost until the heap's tail
    //    happens to reach it again.
    // --------------------------------------------------------------------
    allocator.free(first_block);
    println!("\n[5] Freed first_block at {:?}", first_block);
    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 6) Allocate a small block (2 bytes) to see if the allocator
    //    reuses the freed block's class.
    // --------------------------------------------------------------------
    let fifth_block = allocator.malloc(2);
    println!("\n[6] Allocate 2 bytes (check reuse of freed block) -> {:?}", fifth_block);
    println!(
      "[6] fifth_block == first_block? {}",
      if fifth_block == first_block {
        "Yes, it reused the freed block"
      } else {
        "No, it landed in a different block (expected once the block was split)"
      }
    );

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 7) Grow the fourth block in place to show realloc's directional
    //    coalescing, then allocate something the current heap can't
    //    satisfy to observe it extend the break.
    // --------------------------------------------------------------------
    print_program_break("before realloc");
    let grown = allocator.realloc(fourth_block, 256);
    println!("\n[7] realloc(fourth_block, 256) -> {:?}", grown);
    print_program_break("after realloc");

    print_program_break("before large alloc");
    let big_block = allocator.malloc(64 * 1024);
    println!("\n[7] Allocate large 64 KiB block -> {:?}", big_block);
    print_program_break("after large alloc");
    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 8) End of demo. Free what's left; the OS reclaims the rest of the
    //    heap when the process exits regardless.
    // --------------------------------------------------------------------
    allocator.free(second_block);
    allocator.free(third_block);
    allocator.free(grown);
    allocator.free(big_block);
    println!("\n[8] End of example. Process will exit and the OS will reclaim all memory.");
  }
}
