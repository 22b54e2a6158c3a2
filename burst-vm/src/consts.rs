//! VM parameters

use burst_asm::Word;

use core::mem;

/// Length of a word, in bytes
pub const WORD_SIZE: usize = mem::size_of::<Word>();

/// Number of general-purpose registers
pub const VM_REGISTER_COUNT: usize = 16;

/// Default size of the VM memory, in bytes
pub const MEM_SIZE: usize = 1024 * 1024;

/// First address the allocator may hand out; everything below is
/// reserved for program text and data loaded at address zero.
pub const HEAP_BASE: Word = 0x0001_0000;

/// Distance of the initial stack pointer from the end of memory
pub const STACK_TOP_OFFSET: usize = 8;

/// Initial stack pointer for a memory of `mem_size` bytes. The stack
/// grows downward from here.
pub const fn initial_sp(mem_size: usize) -> Word {
    (mem_size - STACK_TOP_OFFSET) as Word
}
