//! Primitive type aliases shared by the BURST tool stack.

/// Register ID type
///
/// Valid indices are `0..16`; the encoding stores them in 4-bit fields.
pub type RegisterId = usize;

/// Word representation of the virtual machine
pub type Word = u32;

/// 16-bit immediate operand, sign-extended by the executor
pub type Immediate16 = u16;

/// 12-bit unsigned memory offset
pub type Offset12 = u16;

/// 24-bit jump/call target
pub type Address24 = u32;

/// Raw, undecoded instruction word
pub type RawInstruction = u32;
