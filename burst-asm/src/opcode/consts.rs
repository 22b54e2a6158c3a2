//! Opcode byte constants for the BURST instruction set.
//!
//! The top 8 bits of every instruction word hold one of these values.

/// Load word: `load rd, [rs1 + off]`
pub const OP_LOAD: u8 = 0x01;

/// Store word: `store rd, [rs1 + off]`
pub const OP_STORE: u8 = 0x02;

/// Push register onto the stack
pub const OP_PUSH: u8 = 0x03;

/// Pop the stack into a register
pub const OP_POP: u8 = 0x04;

/// Load byte, zero-extended
pub const OP_LOADB: u8 = 0x05;

/// Store low byte of a register
pub const OP_STOREB: u8 = 0x06;

/// Two's-complement addition
pub const OP_ADD: u8 = 0x10;

/// Two's-complement subtraction
pub const OP_SUB: u8 = 0x11;

/// Signed multiplication, low 32 bits
pub const OP_MUL: u8 = 0x12;

/// Signed truncated division
pub const OP_DIV: u8 = 0x13;

/// Signed remainder
pub const OP_MOD: u8 = 0x14;

/// Bitwise AND
pub const OP_AND: u8 = 0x15;

/// Bitwise OR
pub const OP_OR: u8 = 0x16;

/// Bitwise XOR
pub const OP_XOR: u8 = 0x17;

/// Bitwise complement
pub const OP_NOT: u8 = 0x18;

/// Logical shift left
pub const OP_SHL: u8 = 0x19;

/// Logical shift right
pub const OP_SHR: u8 = 0x1a;

/// Increment by one
pub const OP_INC: u8 = 0x1b;

/// Decrement by one
pub const OP_DEC: u8 = 0x1c;

/// Two's-complement negation
pub const OP_NEG: u8 = 0x1d;

/// Unconditional jump
pub const OP_JMP: u8 = 0x20;

/// Jump if zero
pub const OP_JZ: u8 = 0x21;

/// Jump if not zero
pub const OP_JNZ: u8 = 0x22;

/// Jump if equal
pub const OP_JEQ: u8 = 0x23;

/// Jump if not equal
pub const OP_JNE: u8 = 0x24;

/// Jump if signed less-than
pub const OP_JLT: u8 = 0x25;

/// Jump if signed greater-than
pub const OP_JGT: u8 = 0x26;

/// Call subroutine
pub const OP_CALL: u8 = 0x27;

/// Return from subroutine
pub const OP_RET: u8 = 0x28;

/// Jump if signed less-or-equal
pub const OP_JLE: u8 = 0x29;

/// Jump if signed greater-or-equal
pub const OP_JGE: u8 = 0x2a;

/// Register to register copy
pub const OP_MOV: u8 = 0x30;

/// Load sign-extended immediate
pub const OP_MOVI: u8 = 0x31;

/// Compare two registers
pub const OP_CMP: u8 = 0x32;

/// System call, number taken from `r0`
pub const OP_SYSCALL: u8 = 0x40;

/// Stop execution
pub const OP_HALT: u8 = 0x41;

/// No operation
pub const OP_NOP: u8 = 0x42;
