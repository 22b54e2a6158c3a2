//! Runtime error types for the interpreter.

use burst_asm::Word;

/// Fatal machine traps.
///
/// Every variant halts the VM: the error is recorded as the machine's
/// fault, `step`/`run` surface it to the caller, and only a reset
/// clears it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum VmError {
    /// Address out of range on a read or write.
    #[error("memory violation at 0x{addr:08x}")]
    MemoryViolation {
        /// Faulting address
        addr: Word,
    },

    /// A push moved `sp` below the bottom of memory.
    #[error("stack overflow")]
    StackOverflow,

    /// A pop read past the top of memory.
    #[error("stack underflow")]
    StackUnderflow,

    /// `div` or `mod` with a zero divisor.
    #[error("division by zero")]
    DivisionByZero,

    /// The fetched opcode byte is not in the instruction table.
    #[error("unknown opcode 0x{0:02x}")]
    UnknownOpcode(u8),
}
