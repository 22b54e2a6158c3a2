//! Atomic types of the BURST virtual machine.
//!
//! This crate defines the instruction set encoding shared by the
//! interpreter, the assembler and the debugger: the opcode registry, the
//! operand-carrying [`Opcode`] enum with its exact `u32` conversions,
//! the raw-field [`Instruction`] view, the condition [`Flags`] and the
//! canonical disassembly text.
//!
//! Instruction words are 32 bits, stored little-endian: the top 8 bits
//! are the opcode and the low 24 bits the operand field.

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(unused_must_use)]

mod flags;
mod instruction;
mod opcode;
mod types;

#[cfg(feature = "std")]
mod disasm;

#[cfg(test)]
mod encoding_tests;

pub use flags::Flags;
pub use instruction::Instruction;
pub use opcode::{consts, InvalidOpcode, Opcode, OpcodeRepr};
pub use types::{Address24, Immediate16, Offset12, RawInstruction, RegisterId, Word};

#[cfg(feature = "std")]
pub use disasm::disassemble;
